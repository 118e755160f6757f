//! AES-128-CTR over the amiibo crypto buffer.
//!
//! Only canonical `0x02C..0x1B4` is enciphered, with a full 128-bit
//! big-endian counter starting at the derived IV. CTR is its own inverse, so
//! the same transform encrypts and decrypts.

use aes::Aes128;
use ctr::cipher::{KeyIvInit, StreamCipher};

use super::keygen::DerivedKeys;
use crate::formats::ntag::AMIIBO_SIZE;

type Aes128Ctr = ctr::Ctr128BE<Aes128>;

/// Canonical offset of the crypto buffer.
pub const CRYPTO_OFFSET: usize = 0x02C;
/// Length of the crypto buffer.
pub const CRYPTO_LEN: usize = 0x188;

/// Regions copied unchanged by [`cipher`]: lock bytes/CC, crypto-init
/// sequence, and everything from the NTAG serial onward.
const PASSTHROUGH: [(usize, usize); 3] = [(0x000, 0x008), (0x028, 0x02C), (0x1D4, AMIIBO_SIZE)];

/// Apply the keystream to `window` in place.
pub fn apply_keystream(keys: &DerivedKeys, window: &mut [u8]) {
    let mut ctr = Aes128Ctr::new(&keys.aes_key.into(), &keys.aes_iv.into());
    ctr.apply_keystream(window);
}

/// Encipher (or decipher) the crypto buffer of `buf` in place.
pub fn cipher_in_place(keys: &DerivedKeys, buf: &mut [u8; AMIIBO_SIZE]) {
    apply_keystream(keys, &mut buf[CRYPTO_OFFSET..CRYPTO_OFFSET + CRYPTO_LEN]);
}

/// Encipher (or decipher) `input` into `output`.
///
/// The crypto buffer is transformed, the passthrough regions are copied
/// verbatim. The two HMAC fields (0x008 and 0x1B4) are left as they are in
/// `output`; callers write them separately.
pub fn cipher(keys: &DerivedKeys, input: &[u8; AMIIBO_SIZE], output: &mut [u8; AMIIBO_SIZE]) {
    let window = CRYPTO_OFFSET..CRYPTO_OFFSET + CRYPTO_LEN;
    output[window.clone()].copy_from_slice(&input[window.clone()]);
    apply_keystream(keys, &mut output[window]);
    for (start, end) in PASSTHROUGH {
        output[start..end].copy_from_slice(&input[start..end]);
    }
}
