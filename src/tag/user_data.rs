//! Owner-facing settings: nickname, setup date, owner Mii.
//!
//! Shares the crypto-buffer window with [`super::Settings`]; offsets are the
//! same as in the settings layout table.

use chrono::NaiveDate;

use super::mii::{MII_SIZE, Mii};
use crate::Result;
use crate::utils::{
    be_u16, check_len, pack_date, set_be_u16, set_utf16_name, unpack_date, utf16_name,
};

const SETTINGS_MASK: u8 = 0x0F;
const NICKNAME: usize = 0x0C;
const NICKNAME_LEN: usize = 0x14;
const OWNER_MII: usize = 0x20;
/// Bytes covered by the user-data fields.
pub const USER_DATA_LEN: usize = OWNER_MII + MII_SIZE;

/// A view over the user-data fields of the crypto buffer.
#[derive(Debug)]
pub struct UserData<B> {
    buf: B,
}

impl<B: AsRef<[u8]>> UserData<B> {
    /// Wrap a crypto-buffer window.
    ///
    /// Fails with [`crate::Error::BufferTooShort`] if `buf` ends before the
    /// owner Mii does (0x80 bytes).
    pub fn new(buf: B) -> Result<Self> {
        check_len(buf.as_ref(), USER_DATA_LEN)?;
        Ok(Self { buf })
    }

    pub(crate) fn wrap(buf: B) -> Self {
        Self { buf }
    }

    /// The low nibble of the flag byte and the country code byte.
    pub fn amiibo_settings_bytes(&self) -> [u8; 2] {
        let buf = self.buf.as_ref();
        [buf[0] & SETTINGS_MASK, buf[1]]
    }

    /// Owner's country code.
    pub fn country_code(&self) -> u8 {
        self.buf.as_ref()[1]
    }

    /// Raw packed setup date.
    pub fn setup_date_value(&self) -> u16 {
        be_u16(self.buf.as_ref(), 0x04)
    }

    /// Date the amiibo was registered, or [`None`] if not a date.
    pub fn setup_date(&self) -> Option<NaiveDate> {
        unpack_date(self.setup_date_value())
    }

    /// Amiibo nickname, without padding or control characters.
    pub fn nickname(&self) -> String {
        utf16_name(self.buf.as_ref(), NICKNAME, NICKNAME_LEN, false)
    }

    /// The owner's Mii.
    pub fn owner_mii(&self) -> Mii<&[u8]> {
        Mii::wrap(&self.buf.as_ref()[OWNER_MII..OWNER_MII + MII_SIZE])
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> UserData<B> {
    /// Write the settings nibble and country code; the status bits of the
    /// flag byte are preserved.
    pub fn set_amiibo_settings_bytes(&mut self, v: [u8; 2]) {
        let buf = self.buf.as_mut();
        buf[0] = (buf[0] & !SETTINGS_MASK) | (v[0] & SETTINGS_MASK);
        buf[1] = v[1];
    }

    pub fn set_country_code(&mut self, v: u8) {
        self.buf.as_mut()[1] = v;
    }

    pub fn set_setup_date_value(&mut self, v: u16) {
        set_be_u16(self.buf.as_mut(), 0x04, v);
    }

    pub fn set_setup_date(&mut self, date: NaiveDate) -> Result<()> {
        self.set_setup_date_value(pack_date(date)?);
        Ok(())
    }

    /// Set the nickname, truncated to 10 UTF-16 units.
    pub fn set_nickname(&mut self, name: &str) {
        set_utf16_name(self.buf.as_mut(), NICKNAME, NICKNAME_LEN, name, false);
    }

    /// The owner's Mii, writable.
    pub fn owner_mii_mut(&mut self) -> Mii<&mut [u8]> {
        Mii::wrap(&mut self.buf.as_mut()[OWNER_MII..OWNER_MII + MII_SIZE])
    }
}
