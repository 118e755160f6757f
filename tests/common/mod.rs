//! Common test utilities shared by the integration tests.
//!
//! The key file built here is synthetic: it has the retail layout but
//! none of the retail secrets, so the known-answer values below only hold
//! for this exact pattern.

use amiikit::formats::ntag::AMIIBO_SIZE;
use amiikit::keys::{AmiiboKeys, KEY_FILE_SIZE, MASTER_KEY_SIZE};

/// SHA-256 of [`key_file`].
#[allow(dead_code)]
pub const KEY_FILE_SHA256: &str =
    "27223da3582618403ebf50ab8d17a7fbd9cdc65ecf1ccce2b57082293785809b";

/// One synthetic master-key record. `index` 0 is data, 1 is tag.
fn master_key_record(index: usize) -> [u8; MASTER_KEY_SIZE] {
    let (type_string, magic_size): (&[u8; 14], usize) = match index {
        0 => (b"unfixed infos\0", 14),
        _ => (b"locked secret\0", 16),
    };
    let mut record = [0u8; MASTER_KEY_SIZE];
    for (i, b) in record[..0x10].iter_mut().enumerate() {
        *b = ((0x10 * index + i) ^ 0xA5) as u8;
    }
    record[0x10..0x1E].copy_from_slice(type_string);
    record[0x1F] = magic_size as u8;
    for (i, b) in record[0x20..0x20 + magic_size].iter_mut().enumerate() {
        *b = (0xF0 - i - 0x20 * index) as u8;
    }
    for (i, b) in record[0x30..].iter_mut().enumerate() {
        *b = ((i * 13 + 7 + 0x40 * index) & 0xFF) as u8;
    }
    record
}

/// A well-formed 160-byte key file.
#[allow(dead_code)]
pub fn key_file() -> Vec<u8> {
    let mut file = Vec::with_capacity(KEY_FILE_SIZE);
    file.extend_from_slice(&master_key_record(0));
    file.extend_from_slice(&master_key_record(1));
    file
}

#[allow(dead_code)]
pub fn keys() -> AmiiboKeys {
    AmiiboKeys::from_bytes(&key_file()).unwrap()
}

/// A decrypted canonical buffer with a recognizable byte pattern.
#[allow(dead_code)]
pub fn sample_plain() -> [u8; AMIIBO_SIZE] {
    let mut buf = [0u8; AMIIBO_SIZE];
    for (i, b) in buf.iter_mut().enumerate() {
        *b = ((i * 31 + 17) & 0xFF) as u8;
    }
    buf
}

/// Write `bytes` to a fresh file under the system temp directory.
#[allow(dead_code)]
pub fn temp_file(name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("amiikit-tests-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}
