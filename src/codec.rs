//! Unpack and pack complete amiibo dumps.
//!
//! ## Unpack
//! 1. Remap the raw dump into a canonical buffer.
//! 2. Derive the data and tag key sets (the seed bytes are never encrypted,
//!    so the raw buffer works).
//! 3. Decrypt the crypto buffer with the data keys.
//! 4. Recompute the tag HMAC over `0x1D4..0x208`, then the data HMAC over
//!    `0x029..0x208` (which now covers the fresh tag HMAC), and write both.
//! 5. Compare them with the HMACs stored in the dump.
//!
//! A failed comparison is not an error: the decrypted bytes are returned
//! with [`Unpacked::valid`] set to `false`, and the caller decides.
//!
//! ## Pack
//! The inverse: sign with both key sets, encrypt, remap to a 572-byte dump.

use tracing::{debug, trace, warn};

use crate::crypto::cipher::{cipher, cipher_in_place};
use crate::crypto::hmac_sha256;
use crate::crypto::keygen::DerivedKeys;
use crate::formats::ntag::{self, AMIIBO_SIZE, DumpKind, NTAG_SIZE_WITH_SIGNATURE};
use crate::keys::AmiiboKeys;
use crate::Result;

/// Canonical offset of the data HMAC.
pub const HMAC_POS_DATA: usize = 0x008;
/// Canonical offset of the tag HMAC.
pub const HMAC_POS_TAG: usize = 0x1B4;
const HMAC_LEN: usize = 0x20;

/// Start of the region signed by the data HMAC.
const DATA_SIGNED_START: usize = 0x029;
/// Start of the region signed by the tag HMAC.
const TAG_SIGNED_START: usize = 0x1D4;
/// End (exclusive) of both signed regions.
const SIGNED_END: usize = 0x208;

/// A decrypted canonical buffer and the outcome of its integrity check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unpacked {
    /// Decrypted canonical buffer with freshly computed HMACs.
    pub data: [u8; AMIIBO_SIZE],
    /// Whether both stored HMACs matched the recomputed ones.
    pub valid: bool,
}

/// Write the tag HMAC and then the data HMAC into `buf`.
fn sign(data_keys: &DerivedKeys, tag_keys: &DerivedKeys, buf: &mut [u8; AMIIBO_SIZE]) {
    let tag_hmac = hmac_sha256(&tag_keys.hmac_key, &[&buf[TAG_SIGNED_START..SIGNED_END]]);
    buf[HMAC_POS_TAG..HMAC_POS_TAG + HMAC_LEN].copy_from_slice(&tag_hmac);

    let data_hmac = hmac_sha256(&data_keys.hmac_key, &[&buf[DATA_SIGNED_START..SIGNED_END]]);
    buf[HMAC_POS_DATA..HMAC_POS_DATA + HMAC_LEN].copy_from_slice(&data_hmac);
}

fn hmac_field(buf: &[u8; AMIIBO_SIZE], pos: usize) -> &[u8] {
    &buf[pos..pos + HMAC_LEN]
}

/// Decrypt and verify an already remapped canonical buffer.
pub fn unpack_internal(keys: &AmiiboKeys, internal: &[u8; AMIIBO_SIZE]) -> Unpacked {
    let data_keys = keys.data.derive(internal);
    let tag_keys = keys.tag.derive(internal);

    let mut plain = [0u8; AMIIBO_SIZE];
    cipher(&data_keys, internal, &mut plain);
    sign(&data_keys, &tag_keys, &mut plain);

    let tag_ok = hmac_field(&plain, HMAC_POS_TAG) == hmac_field(internal, HMAC_POS_TAG);
    let data_ok = hmac_field(&plain, HMAC_POS_DATA) == hmac_field(internal, HMAC_POS_DATA);
    if !(tag_ok && data_ok) {
        warn!(tag_ok, data_ok, "amiibo HMAC mismatch");
    }
    Unpacked {
        data: plain,
        valid: tag_ok && data_ok,
    }
}

/// Decrypt and verify a raw 540- or 572-byte dump.
pub fn unpack(keys: &AmiiboKeys, tag: &[u8]) -> Result<Unpacked> {
    let internal = ntag::tag_to_internal(tag)?;
    let unpacked = unpack_internal(keys, &internal);
    debug!(len = tag.len(), valid = unpacked.valid, "unpacked amiibo");
    Ok(unpacked)
}

/// Sign and encrypt a decrypted canonical buffer, staying in canonical form.
pub fn pack_internal(keys: &AmiiboKeys, plain: &[u8; AMIIBO_SIZE]) -> [u8; AMIIBO_SIZE] {
    let data_keys = keys.data.derive(plain);
    let tag_keys = keys.tag.derive(plain);

    let mut buf = *plain;
    sign(&data_keys, &tag_keys, &mut buf);
    cipher_in_place(&data_keys, &mut buf);
    trace!(
        write_counter = u16::from_be_bytes([buf[0x029], buf[0x02A]]),
        "signed and encrypted amiibo"
    );
    buf
}

/// Sign and encrypt a decrypted canonical buffer into a 572-byte dump.
pub fn pack(keys: &AmiiboKeys, plain: &[u8; AMIIBO_SIZE]) -> [u8; NTAG_SIZE_WITH_SIGNATURE] {
    let internal = pack_internal(keys, plain);
    let mut tag = [0u8; NTAG_SIZE_WITH_SIGNATURE];
    ntag::write_tag(&internal, &mut tag, DumpKind::WithSignature);
    debug!(len = tag.len(), "packed amiibo");
    tag
}

/// Sign and encrypt into `tag`, whose length (540 or 572) selects the
/// dump kind.
pub fn pack_to_tag(keys: &AmiiboKeys, plain: &[u8; AMIIBO_SIZE], tag: &mut [u8]) -> Result<()> {
    let kind = DumpKind::from_len(tag.len())?;
    let internal = pack_internal(keys, plain);
    ntag::write_tag(&internal, tag, kind);
    debug!(len = tag.len(), "packed amiibo");
    Ok(())
}

impl AmiiboKeys {
    /// See [`unpack`].
    pub fn unpack(&self, tag: &[u8]) -> Result<Unpacked> {
        unpack(self, tag)
    }

    /// See [`pack`].
    pub fn pack(&self, plain: &[u8; AMIIBO_SIZE]) -> [u8; NTAG_SIZE_WITH_SIGNATURE] {
        pack(self, plain)
    }
}
