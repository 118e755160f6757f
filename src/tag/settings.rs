//! Amiibo settings, stored at the start of the crypto buffer.
//!
//! ## Layout (offsets relative to canonical 0x02C)
//! ```text
//! [0x00] Flags: bits 4-5 status, bits 0-3 user settings
//! [0x01] Country code
//! [0x02] CRC update counter     (u16)
//! [0x04] Setup date             (packed u16)
//! [0x06] Last modified date     (packed u16)
//! [0x08] CRC32                  (u32)
//! [0x0C] Nickname               (UTF-16BE, 10 units)
//! [0x20] Owner Mii              (0x60 bytes)
//! [0x80] Init title ID          (u64)
//! [0x88] Write counter          (u16)
//! [0x8A] AppID                  (u32)
//! [0x8E] Unknown                (2 bytes)
//! [0x90] Signature              (0x20 bytes)
//! [0xB0] App data               (0xD8 bytes)
//! ```
//! Everything here is ciphertext until the tag has been unpacked.

use bitflags::bitflags;
use chrono::NaiveDate;

use super::app_data::AppData;
use super::user_data::UserData;
use crate::Result;
use crate::crypto::cipher::CRYPTO_LEN;
use crate::utils::{
    be_u16, be_u32, check_len, pack_date, set_be_u16, set_be_u32, unpack_date,
};

const STATUS_MASK: u8 = 0x30;

bitflags! {
    /// Initialization state of a tag.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Status: u8 {
        const USER_DATA_INITIALIZED = 0x10;
        const APP_DATA_INITIALIZED = 0x20;
    }
}

/// A view over the crypto buffer.
#[derive(Debug)]
pub struct Settings<B> {
    buf: B,
}

impl<B: AsRef<[u8]>> Settings<B> {
    /// Wrap a crypto-buffer window.
    ///
    /// Fails with [`crate::Error::BufferTooShort`] if `buf` is shorter than
    /// the 0x188-byte crypto buffer.
    pub fn new(buf: B) -> Result<Self> {
        check_len(buf.as_ref(), CRYPTO_LEN)?;
        Ok(Self { buf })
    }

    /// Wrap a window already known to span the crypto buffer.
    pub(crate) fn wrap(buf: B) -> Self {
        Self { buf }
    }

    /// Initialization status bits.
    pub fn status(&self) -> Status {
        Status::from_bits_truncate(self.buf.as_ref()[0] & STATUS_MASK)
    }

    /// Times the settings CRC has been updated.
    pub fn crc_update_counter(&self) -> u16 {
        be_u16(self.buf.as_ref(), 0x02)
    }

    /// Raw packed last-modified date.
    pub fn last_modified_date_value(&self) -> u16 {
        be_u16(self.buf.as_ref(), 0x06)
    }

    /// Last-modified date, or [`None`] if the stored value is not a date.
    pub fn last_modified_date(&self) -> Option<NaiveDate> {
        unpack_date(self.last_modified_date_value())
    }

    /// CRC32 stored by the console; not checked here.
    pub fn crc32(&self) -> u32 {
        be_u32(self.buf.as_ref(), 0x08)
    }

    /// Settings write counter, distinct from the tag write counter.
    pub fn write_counter(&self) -> u16 {
        be_u16(self.buf.as_ref(), 0x88)
    }

    /// Two bytes after the AppID with no known meaning.
    pub fn unknown_8e(&self) -> &[u8] {
        &self.buf.as_ref()[0x8E..0x90]
    }

    /// 0x20-byte settings signature.
    pub fn signature(&self) -> &[u8] {
        &self.buf.as_ref()[0x90..0xB0]
    }

    /// Owner-facing fields.
    pub fn user_data(&self) -> UserData<&[u8]> {
        UserData::wrap(self.buf.as_ref())
    }

    /// App-data header and payload.
    pub fn app_data(&self) -> AppData<&[u8]> {
        AppData::wrap(self.buf.as_ref())
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> Settings<B> {
    /// Replace the status bits, leaving the other bits of the flag byte alone.
    pub fn set_status(&mut self, status: Status) {
        let flags = &mut self.buf.as_mut()[0];
        *flags = (*flags & !STATUS_MASK) | (status.bits() & STATUS_MASK);
    }

    pub fn set_crc_update_counter(&mut self, v: u16) {
        set_be_u16(self.buf.as_mut(), 0x02, v);
    }

    pub fn set_last_modified_date_value(&mut self, v: u16) {
        set_be_u16(self.buf.as_mut(), 0x06, v);
    }

    pub fn set_last_modified_date(&mut self, date: NaiveDate) -> Result<()> {
        self.set_last_modified_date_value(pack_date(date)?);
        Ok(())
    }

    pub fn set_crc32(&mut self, v: u32) {
        set_be_u32(self.buf.as_mut(), 0x08, v);
    }

    pub fn set_write_counter(&mut self, v: u16) {
        set_be_u16(self.buf.as_mut(), 0x88, v);
    }

    pub fn set_unknown_8e(&mut self, v: [u8; 2]) {
        self.buf.as_mut()[0x8E..0x90].copy_from_slice(&v);
    }

    pub fn signature_mut(&mut self) -> &mut [u8] {
        &mut self.buf.as_mut()[0x90..0xB0]
    }

    pub fn user_data_mut(&mut self) -> UserData<&mut [u8]> {
        UserData::wrap(self.buf.as_mut())
    }

    pub fn app_data_mut(&mut self) -> AppData<&mut [u8]> {
        AppData::wrap(self.buf.as_mut())
    }
}
