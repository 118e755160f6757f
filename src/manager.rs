//! High-level entry point tying keys, codec and tags together.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::codec;
use crate::formats::ntag::NTAG_SIZE_WITH_SIGNATURE;
use crate::games::GameRegistry;
use crate::keys::AmiiboKeys;
use crate::tag::AmiiboTag;
use crate::{Error, Result};

/// Construction-time settings for [`AmiiboManager`].
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Combined 160-byte key file to load on construction.
    pub key_file: Option<PathBuf>,
}

/// Decrypts, encrypts and wraps amiibo dumps.
///
/// Keys are loaded once and only read afterwards. Reloading keys needs
/// `&mut self`, so it cannot race with in-flight operations on the same
/// manager.
#[derive(Debug, Default)]
pub struct AmiiboManager {
    keys: Option<AmiiboKeys>,
    games: GameRegistry,
}

impl AmiiboManager {
    /// A manager with no keys and no games.
    pub fn new() -> Self {
        Self::default()
    }

    /// A manager using an already loaded key set.
    pub fn with_keys(keys: AmiiboKeys) -> Self {
        Self {
            keys: Some(keys),
            games: GameRegistry::new(),
        }
    }

    /// Build a manager from `config`, loading the key file if one is set.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut manager = Self::new();
        if let Some(path) = &config.key_file {
            manager.load_key_file(path)?;
        }
        Ok(manager)
    }

    /// Use `games` to resolve app data on tags from this manager.
    pub fn with_games(mut self, games: GameRegistry) -> Self {
        self.games = games;
        self
    }

    /// Load (or replace) the key set from a combined key file.
    pub fn load_key_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let keys = AmiiboKeys::load_file(path)?;
        debug!(path = %path.display(), retail = keys.matches_retail_digests(), "loaded key file");
        self.keys = Some(keys);
        Ok(())
    }

    /// Whether a key set is loaded.
    pub fn has_keys(&self) -> bool {
        self.keys.is_some()
    }

    /// The loaded key set, if any.
    pub fn keys(&self) -> Option<&AmiiboKeys> {
        self.keys.as_ref()
    }

    /// Game handlers available to tags from this manager.
    pub fn games(&self) -> &GameRegistry {
        &self.games
    }

    fn require_keys(&self) -> Result<&AmiiboKeys> {
        self.keys.as_ref().ok_or(Error::MissingKeys)
    }

    /// Decrypt a raw dump.
    ///
    /// Fails with [`Error::IntegrityCheckFailed`] if either HMAC does not
    /// match; use [`codec::unpack`] to inspect such dumps anyway.
    pub fn decrypt_tag(&self, raw: &[u8]) -> Result<AmiiboTag> {
        let unpacked = codec::unpack(self.require_keys()?, raw)?;
        if !unpacked.valid {
            warn!("refusing tag with bad HMAC");
            return Err(Error::IntegrityCheckFailed);
        }
        Ok(AmiiboTag::from_unpacked(unpacked))
    }

    /// Encrypt a decrypted tag into a 572-byte dump.
    pub fn encrypt_tag(&self, tag: &AmiiboTag) -> Result<Vec<u8>> {
        let keys = self.require_keys()?;
        if !tag.is_decrypted() {
            return Err(Error::NotDecrypted);
        }
        let raw: [u8; NTAG_SIZE_WITH_SIGNATURE] = codec::pack(keys, tag.data());
        Ok(raw.to_vec())
    }

    /// Wrap a raw dump without decrypting it; no keys needed.
    pub fn read_encrypted_tag(&self, raw: &[u8]) -> Result<AmiiboTag> {
        AmiiboTag::from_encrypted_dump(raw)
    }
}
