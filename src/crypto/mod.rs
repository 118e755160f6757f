//! Cryptographic operations for amiibo dumps.
//!
//! All functions accept already-loaded key material; key-file parsing is
//! handled by [`crate::keys::AmiiboKeys`].
//!
//! ## Submodules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`keygen`] | HMAC-SHA-256 DRBG expanding a master key + tag bytes into AES key, IV and HMAC key |
//! | [`cipher`] | AES-128-CTR over the 0x188-byte crypto buffer |
//! | [`ecdsa`]  | secp128r1 verification of the NTAG originality signature |
//!
//! ## Key hierarchy (brief)
//!
//! ```text
//! key_retail.bin
//!   ├── data master key ("unfixed infos")
//!   │     └── keygen(tag seed) → aes_key, aes_iv ─→ AES-CTR crypto buffer
//!   │                          → hmac_key ───────→ data HMAC (0x029-0x208)
//!   └── tag master key ("locked secret")
//!         └── keygen(tag seed) → hmac_key ───────→ tag HMAC (0x1D4-0x208)
//! ```

pub mod cipher;
#[cfg(feature = "originality")]
pub mod ecdsa;
pub mod keygen;

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA-256 over the concatenation of `parts`.
pub(crate) fn hmac_sha256(key: &[u8], parts: &[&[u8]]) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    for part in parts {
        mac.update(part);
    }
    mac.finalize().into_bytes().into()
}
