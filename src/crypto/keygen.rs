//! Per-tag key derivation.
//!
//! Each master key expands into a 48-byte [`DerivedKeys`] block through a
//! small HMAC-SHA-256 DRBG. The DRBG seed mixes the master key's constants
//! with bytes taken from the tag itself, so every tag (and every write of the
//! same tag, via the write counter) gets its own keys.
//!
//! ## Base seed (64 bytes, from the canonical buffer)
//! ```text
//! [0x00] write counter          buf[0x029..0x02B]
//! [0x02] zero                   (14 bytes)
//! [0x10] NTAG serial            buf[0x1D4..0x1DC]
//! [0x18] NTAG serial, again     buf[0x1D4..0x1DC]
//! [0x20] plaintext data         buf[0x1E8..0x208]
//! ```
//! None of these bytes are encrypted, so the seed is the same whether it is
//! taken from a raw or from a decrypted buffer.
//!
//! ## Prepared seed
//! ```text
//! type string (including NUL)
//! || base[0 .. 16 - magic_size]
//! || magic[0 .. magic_size]
//! || base[0x10..0x20]
//! || base[0x20..0x40] XOR xor_pad
//! ```
//!
//! ## DRBG
//! Output block `i` is `HMAC-SHA-256(hmac_key, be16(i) || prepared_seed)`,
//! starting at `i = 0`. Blocks are concatenated and truncated to 48 bytes.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::hmac_sha256;
use crate::formats::ntag::AMIIBO_SIZE;
use crate::keys::MasterKey;

/// Size of the per-tag base seed.
pub const KEYGEN_SEED_SIZE: usize = 64;

/// Size of a derived key block.
pub const DERIVED_KEYS_SIZE: usize = 48;

const DRBG_OUTPUT_SIZE: usize = 32;

/// AES key, AES-CTR IV and HMAC key derived for one tag and one purpose.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKeys {
    /// AES-128 key.
    pub aes_key: [u8; 16],
    /// Initial AES-CTR counter block.
    pub aes_iv: [u8; 16],
    /// HMAC-SHA-256 key for the signature this key set protects.
    pub hmac_key: [u8; 16],
}

impl DerivedKeys {
    /// Split a 48-byte DRBG output into its three keys.
    pub fn from_bytes(bytes: &[u8; DERIVED_KEYS_SIZE]) -> Self {
        let mut keys = Self {
            aes_key: [0; 16],
            aes_iv: [0; 16],
            hmac_key: [0; 16],
        };
        keys.aes_key.copy_from_slice(&bytes[0x00..0x10]);
        keys.aes_iv.copy_from_slice(&bytes[0x10..0x20]);
        keys.hmac_key.copy_from_slice(&bytes[0x20..0x30]);
        keys
    }

    /// Serialize as `aes_key || aes_iv || hmac_key`.
    pub fn to_bytes(&self) -> [u8; DERIVED_KEYS_SIZE] {
        let mut out = [0u8; DERIVED_KEYS_SIZE];
        out[0x00..0x10].copy_from_slice(&self.aes_key);
        out[0x10..0x20].copy_from_slice(&self.aes_iv);
        out[0x20..0x30].copy_from_slice(&self.hmac_key);
        out
    }
}

impl fmt::Debug for DerivedKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKeys { .. }")
    }
}

/// Build the 64-byte base seed from a canonical buffer.
pub fn calc_seed(internal: &[u8; AMIIBO_SIZE]) -> [u8; KEYGEN_SEED_SIZE] {
    let mut seed = [0u8; KEYGEN_SEED_SIZE];
    seed[0x00..0x02].copy_from_slice(&internal[0x029..0x02B]);
    seed[0x10..0x18].copy_from_slice(&internal[0x1D4..0x1DC]);
    seed[0x18..0x20].copy_from_slice(&internal[0x1D4..0x1DC]);
    seed[0x20..0x40].copy_from_slice(&internal[0x1E8..0x208]);
    seed
}

/// Mix a master key's constants into a base seed.
fn prepare_seed(key: &MasterKey, base: &[u8; KEYGEN_SEED_SIZE]) -> Zeroizing<Vec<u8>> {
    let magic = key.magic_bytes();
    let mut out = Zeroizing::new(Vec::with_capacity(14 + 16 + 16 + 32));
    out.extend_from_slice(key.type_string());
    out.extend_from_slice(&base[..16 - magic.len()]);
    out.extend_from_slice(magic);
    out.extend_from_slice(&base[0x10..0x20]);
    out.extend(base[0x20..0x40].iter().zip(&key.xor_pad).map(|(b, p)| b ^ p));
    out
}

/// Fill `out` from the HMAC-SHA-256 DRBG.
fn drbg_generate(hmac_key: &[u8], seed: &[u8], out: &mut [u8]) {
    for (iteration, chunk) in out.chunks_mut(DRBG_OUTPUT_SIZE).enumerate() {
        let counter = (iteration as u16).to_be_bytes();
        let mut block = hmac_sha256(hmac_key, &[&counter, seed]);
        chunk.copy_from_slice(&block[..chunk.len()]);
        block.zeroize();
    }
}

/// Derive the key set for `key` from an arbitrary base seed.
pub fn derive_from_seed(key: &MasterKey, base: &[u8; KEYGEN_SEED_SIZE]) -> DerivedKeys {
    let prepared = prepare_seed(key, base);
    let mut out = Zeroizing::new([0u8; DERIVED_KEYS_SIZE]);
    drbg_generate(&key.hmac_key, &prepared, out.as_mut_slice());
    DerivedKeys::from_bytes(&out)
}

/// Derive the key set for `key` and the tag held in `internal`.
pub fn derive_keys(key: &MasterKey, internal: &[u8; AMIIBO_SIZE]) -> DerivedKeys {
    derive_from_seed(key, &calc_seed(internal))
}

impl MasterKey {
    /// Derive this master key's key set for the tag held in `internal`.
    pub fn derive(&self, internal: &[u8; AMIIBO_SIZE]) -> DerivedKeys {
        derive_keys(self, internal)
    }
}
