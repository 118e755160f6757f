//! App-data header and payload.
//!
//! The header fields (init title ID, AppID) live in the settings block; the
//! 0xD8-byte payload at crypto offset 0xB0 (canonical 0x0DC) belongs to
//! whichever game the AppID names. Its layout is up to that game's
//! [`Game`] handler.

use tracing::trace;

use super::title::TitleId;
use crate::games::{Game, GameRegistry};
use crate::Result;
use crate::crypto::cipher::CRYPTO_LEN;
use crate::utils::{be_u32, be_u64, check_len, set_be_u32, set_be_u64};

/// Offset of the payload within the crypto buffer.
pub const APP_DATA_OFFSET: usize = 0xB0;
/// Size of the payload.
pub const APP_DATA_SIZE: usize = 0xD8;

const INIT_TITLE_ID: usize = 0x80;
const APP_ID: usize = 0x8A;

/// A view over the app-data header and payload in the crypto buffer.
#[derive(Debug)]
pub struct AppData<B> {
    buf: B,
}

impl<B: AsRef<[u8]>> AppData<B> {
    /// Wrap a crypto-buffer window.
    ///
    /// Fails with [`crate::Error::BufferTooShort`] if `buf` is shorter than
    /// the 0x188-byte crypto buffer.
    pub fn new(buf: B) -> Result<Self> {
        check_len(buf.as_ref(), CRYPTO_LEN)?;
        Ok(Self { buf })
    }

    pub(crate) fn wrap(buf: B) -> Self {
        Self { buf }
    }

    /// Title that initialized the app data.
    pub fn initialization_title_id(&self) -> TitleId {
        TitleId(be_u64(self.buf.as_ref(), INIT_TITLE_ID))
    }

    /// AppID of the game that owns the payload.
    pub fn app_id(&self) -> u32 {
        be_u32(self.buf.as_ref(), APP_ID)
    }

    /// The game-owned payload.
    pub fn payload(&self) -> &[u8] {
        &self.buf.as_ref()[APP_DATA_OFFSET..APP_DATA_OFFSET + APP_DATA_SIZE]
    }

    /// Instantiate the handler registered for this AppID, if any.
    pub fn resolve_game(&self, registry: &GameRegistry) -> Option<Box<dyn Game>> {
        let app_id = self.app_id();
        let game = registry.resolve(app_id);
        trace!(app_id, found = game.is_some(), "resolved game handler");
        game
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> AppData<B> {
    /// Record the title that initialized the app data.
    pub fn set_initialization_title_id(&mut self, title: TitleId) {
        set_be_u64(self.buf.as_mut(), INIT_TITLE_ID, title.0);
    }

    /// Hand the payload over to another game; the payload itself is kept.
    pub fn set_app_id(&mut self, app_id: u32) {
        set_be_u32(self.buf.as_mut(), APP_ID, app_id);
    }

    /// The game-owned payload, writable.
    pub fn payload_mut(&mut self) -> &mut [u8] {
        &mut self.buf.as_mut()[APP_DATA_OFFSET..APP_DATA_OFFSET + APP_DATA_SIZE]
    }
}
