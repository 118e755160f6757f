//! Key material for amiibo encryption.
//!
//! Amiibo dumps are protected by two *master keys*, each the seed of one
//! derived key set:
//!
//! * **Data key** (`unfixed infos`) - derives the AES-CTR key/IV that
//!   encrypts the settings and app-data region, plus the HMAC key of the
//!   data signature.
//! * **Tag key** (`locked secret`) - derives the HMAC key of the tag
//!   signature over the plaintext identity region.
//!
//! Master keys are never used directly; see [`crate::crypto::keygen`] for
//! the per-tag derivation.
//!
//! ## Key file format
//! `key_retail.bin` is 160 bytes: the data record followed by the tag record.
//! Each 80-byte record is laid out as:
//! ```text
//! [0x00] HMAC key        (16 bytes)
//! [0x10] Type string     (14 bytes, NUL-terminated)
//! [0x1E] Reserved        (1 byte)
//! [0x1F] Magic size      (1 byte, <= 16)
//! [0x20] Magic bytes     (16 bytes)
//! [0x30] XOR pad         (32 bytes)
//! ```
//! Some tools ship the two records as separate files (`unfixed-info.bin`
//! and `locked-secret.bin`); [`AmiiboKeys::from_separate`] accepts those.

use std::fmt;
use std::fs;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::utils::bytesa;
use crate::{Error, Result};

/// Size of one master-key record.
pub const MASTER_KEY_SIZE: usize = 80;

/// Size of a combined key file.
pub const KEY_FILE_SIZE: usize = 2 * MASTER_KEY_SIZE;

/// SHA-256 of the retail data master-key record.
const RETAIL_DATA_KEY_SHA256: &str =
    "868106135941cbcab3552bd14880a7a34304ef340958a6998b61a38ba3ce13d3";

/// SHA-256 of the retail tag master-key record.
const RETAIL_TAG_KEY_SHA256: &str =
    "b48727797cd2548200b99c665b20a78190470163ccb8e5682149f1b2f7a006cf";

/// One 80-byte master-key record.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey {
    pub(crate) hmac_key: [u8; 16],
    pub(crate) type_string: [u8; 14],
    pub(crate) magic_size: u8,
    pub(crate) magic_bytes: [u8; 16],
    pub(crate) xor_pad: [u8; 32],
}

impl MasterKey {
    /// Parse a master-key record.
    ///
    /// Returns [`Error::InvalidKeyFile`] if the record is not 80 bytes or the
    /// magic size exceeds 16.
    pub fn from_bytes(record: &[u8]) -> Result<Self> {
        if record.len() != MASTER_KEY_SIZE {
            return Err(Error::InvalidKeyFile("master key record must be 80 bytes"));
        }
        let magic_size = record[0x1F];
        if magic_size > 16 {
            return Err(Error::InvalidKeyFile("magic bytes too long"));
        }
        Ok(Self {
            hmac_key: bytesa(record, 0x00),
            type_string: bytesa(record, 0x10),
            magic_size,
            magic_bytes: bytesa(record, 0x20),
            xor_pad: bytesa(record, 0x30),
        })
    }

    /// Type string up to and including its NUL terminator.
    ///
    /// If the 14-byte field has no terminator the whole field is returned.
    pub fn type_string(&self) -> &[u8] {
        match self.type_string.iter().position(|&b| b == 0) {
            Some(nul) => &self.type_string[..=nul],
            None => &self.type_string,
        }
    }

    /// The significant magic bytes.
    pub fn magic_bytes(&self) -> &[u8] {
        &self.magic_bytes[..self.magic_size as usize]
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.type_string();
        let name = name.strip_suffix(&[0u8]).unwrap_or(name);
        f.debug_struct("MasterKey")
            .field("type_string", &String::from_utf8_lossy(name))
            .field("magic_size", &self.magic_size)
            .finish_non_exhaustive()
    }
}

/// The data and tag master keys needed to unpack and pack amiibo dumps.
///
/// Read-only after loading; a single instance can serve any number of tags.
#[derive(Clone, Debug)]
pub struct AmiiboKeys {
    pub(crate) data: MasterKey,
    pub(crate) tag: MasterKey,
    retail: bool,
}

impl AmiiboKeys {
    /// Parse a combined 160-byte key file.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != KEY_FILE_SIZE {
            return Err(Error::InvalidKeyFile("key file must be 160 bytes"));
        }
        let (data, tag) = bytes.split_at(MASTER_KEY_SIZE);
        Self::from_separate(data, tag)
    }

    /// Build a key set from separate data (`unfixed-info`) and tag
    /// (`locked-secret`) records.
    pub fn from_separate(data: &[u8], tag: &[u8]) -> Result<Self> {
        let retail = hex::encode(Sha256::digest(data)) == RETAIL_DATA_KEY_SHA256
            && hex::encode(Sha256::digest(tag)) == RETAIL_TAG_KEY_SHA256;
        let keys = Self {
            data: MasterKey::from_bytes(data)?,
            tag: MasterKey::from_bytes(tag)?,
            retail,
        };
        debug!(retail, data = ?keys.data, tag = ?keys.tag, "loaded amiibo master keys");
        Ok(keys)
    }

    /// Read a combined key file from `reader`.
    ///
    /// The reader must yield exactly 160 bytes. At most one byte past that
    /// is read, so oversized inputs are rejected without being consumed.
    pub fn load<R: Read>(reader: R) -> Result<Self> {
        let mut bytes = Vec::with_capacity(KEY_FILE_SIZE + 1);
        reader.take(KEY_FILE_SIZE as u64 + 1).read_to_end(&mut bytes)?;
        let keys = Self::from_bytes(&bytes);
        bytes.zeroize();
        keys
    }

    /// Read a combined key file from disk.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::load(fs::File::open(path)?)
    }

    /// The data (`unfixed infos`) master key.
    pub fn data(&self) -> &MasterKey {
        &self.data
    }

    /// The tag (`locked secret`) master key.
    pub fn tag(&self) -> &MasterKey {
        &self.tag
    }

    /// Whether both records hash to the known retail key digests.
    ///
    /// Informational only: any well-formed key file is accepted.
    pub fn matches_retail_digests(&self) -> bool {
        self.retail
    }
}
