//! Library-wide error and result types.

use std::io;

use thiserror::Error;

/// Result alias used throughout amiikit.
pub type Result<T> = std::result::Result<T, Error>;

/// All errors the library can produce.
///
/// Only structural and setup problems are errors. A failed HMAC check during
/// unpacking is reported through [`crate::codec::Unpacked::valid`], and UID or
/// originality-signature checks return plain booleans.
#[derive(Debug, Error)]
pub enum Error {
    /// A raw tag dump was neither 540 nor 572 bytes long.
    #[error("unsupported tag dump size: {0} bytes")]
    InvalidDumpSize(usize),
    /// A canonical buffer was not exactly 552 bytes long.
    #[error("unsupported internal buffer size: {0} bytes")]
    InvalidInternalSize(usize),
    /// A buffer handed to a field view is shorter than the fields it covers.
    #[error("view buffer too short: need {needed} bytes, got {got}")]
    BufferTooShort { needed: usize, got: usize },
    /// Pack or unpack was attempted without a loaded key set.
    #[error("no amiibo key set loaded")]
    MissingKeys,
    /// The key file is malformed (message describes which part).
    #[error("invalid key file: {0}")]
    InvalidKeyFile(&'static str),
    /// The data or tag HMAC of a dump did not match after decryption.
    #[error("tag integrity check failed")]
    IntegrityCheckFailed,
    /// The operation needs a decrypted tag.
    #[error("tag is not decrypted")]
    NotDecrypted,
    /// A date cannot be represented in the packed 16-bit tag format.
    #[error("date out of range")]
    DateOutOfRange,
    /// A game handler precondition was violated.
    #[error("game data error: {0}")]
    Game(&'static str),
    /// An underlying I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
