//! Owner Mii record (0x60 bytes inside the user data).
//!
//! ## Layout
//! ```text
//! [0x00] Mii ID                         (u32)
//! [0x04] System ID                      (u64)
//! [0x0C] Specialness + creation date    (u32)
//! [0x10] Creator MAC                    (6 bytes)
//! [0x16] Padding                        (2 bytes)
//! [0x18] Birthday / sex / shirt / fav.  (u16)
//! [0x1A] Nickname                       (UTF-16LE, 10 units)
//! [0x2E] Width and height               (u16)
//! [0x30] Sharing / face shape / skin    (u8)
//! [0x31] Wrinkles / makeup              (u8)
//! [0x32] Hairstyle                      (u8)
//! [0x33] Hair color / flip hair         (u8)
//! [0x34] Unknown                        (4 bytes)
//! [0x38] Eyebrow style + color          (u8)
//! [0x39] Eyebrow scale                  (u8)
//! [0x3A] Eyebrow rotation + X spacing   (u8)
//! [0x3B] Eyebrow Y position             (u8)
//! [0x3C] Unknown                        (4 bytes)
//! [0x40] Allow copying                  (u8)
//! [0x41] Unknown                        (7 bytes)
//! [0x48] Author nickname                (UTF-16LE, 10 units)
//! ```
//! Integer fields are read big-endian, like the rest of the tag.

use crate::Result;
use crate::utils::{
    be_u16, be_u32, be_u64, check_len, set_be_u16, set_be_u32, set_be_u64, set_utf16_name,
    utf16_name,
};

/// Size of a Mii record.
pub const MII_SIZE: usize = 0x60;

const NICKNAME: usize = 0x1A;
const AUTHOR_NICKNAME: usize = 0x48;
const NAME_LEN: usize = 0x14;

/// A view over a 0x60-byte Mii record.
#[derive(Debug)]
pub struct Mii<B> {
    buf: B,
}

macro_rules! byte_fields {
    ($($get:ident, $set:ident, $off:expr;)*) => {
        impl<B: AsRef<[u8]>> Mii<B> {
            $(
                #[doc = concat!("Raw byte at offset ", stringify!($off), ".")]
                pub fn $get(&self) -> u8 {
                    self.buf.as_ref()[$off]
                }
            )*
        }

        impl<B: AsRef<[u8]> + AsMut<[u8]>> Mii<B> {
            $(
                pub fn $set(&mut self, v: u8) {
                    self.buf.as_mut()[$off] = v;
                }
            )*
        }
    };
}

byte_fields! {
    sharing_faceshape_skincolor, set_sharing_faceshape_skincolor, 0x30;
    wrinkles_makeup, set_wrinkles_makeup, 0x31;
    hairstyle, set_hairstyle, 0x32;
    haircolor_fliphair, set_haircolor_fliphair, 0x33;
    eyebrow_style_and_color, set_eyebrow_style_and_color, 0x38;
    eyebrow_scale, set_eyebrow_scale, 0x39;
    eyebrow_rotation_and_x_spacing, set_eyebrow_rotation_and_x_spacing, 0x3A;
    eyebrow_y_position, set_eyebrow_y_position, 0x3B;
    allow_copying, set_allow_copying, 0x40;
}

impl<B: AsRef<[u8]>> Mii<B> {
    /// Wrap a Mii record.
    ///
    /// Fails with [`crate::Error::BufferTooShort`] if `buf` is shorter than
    /// [`MII_SIZE`].
    pub fn new(buf: B) -> Result<Self> {
        check_len(buf.as_ref(), MII_SIZE)?;
        Ok(Self { buf })
    }

    pub(crate) fn wrap(buf: B) -> Self {
        Self { buf }
    }

    /// The raw 0x60-byte record.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf.as_ref()[..MII_SIZE]
    }

    /// Mii ID; the top bit marks a special Mii.
    pub fn mii_id(&self) -> u32 {
        be_u32(self.buf.as_ref(), 0x00)
    }

    /// ID of the console that created the Mii.
    pub fn system_id(&self) -> u64 {
        be_u64(self.buf.as_ref(), 0x04)
    }

    /// Special flag and creation timestamp, packed.
    pub fn specialness_and_date_of_creation(&self) -> u32 {
        be_u32(self.buf.as_ref(), 0x0C)
    }

    /// MAC address of the creating console.
    pub fn creators_mac(&self) -> &[u8] {
        &self.buf.as_ref()[0x10..0x16]
    }

    /// Packed birthday, sex, shirt color and favorite flag.
    pub fn birthday_sex_shirt_favorite(&self) -> u16 {
        be_u16(self.buf.as_ref(), 0x18)
    }

    /// Mii name, without padding or control characters.
    pub fn nickname(&self) -> String {
        utf16_name(self.buf.as_ref(), NICKNAME, NAME_LEN, true)
    }

    /// Packed body width and height.
    pub fn width_and_height(&self) -> u16 {
        be_u16(self.buf.as_ref(), 0x2E)
    }

    pub fn unknown_34(&self) -> &[u8] {
        &self.buf.as_ref()[0x34..0x38]
    }

    pub fn unknown_3c(&self) -> &[u8] {
        &self.buf.as_ref()[0x3C..0x40]
    }

    pub fn unknown_41(&self) -> &[u8] {
        &self.buf.as_ref()[0x41..0x48]
    }

    /// Name of the Mii's author.
    pub fn author_nickname(&self) -> String {
        utf16_name(self.buf.as_ref(), AUTHOR_NICKNAME, NAME_LEN, true)
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> Mii<B> {
    pub fn set_mii_id(&mut self, v: u32) {
        set_be_u32(self.buf.as_mut(), 0x00, v);
    }

    pub fn set_system_id(&mut self, v: u64) {
        set_be_u64(self.buf.as_mut(), 0x04, v);
    }

    pub fn set_specialness_and_date_of_creation(&mut self, v: u32) {
        set_be_u32(self.buf.as_mut(), 0x0C, v);
    }

    pub fn set_creators_mac(&mut self, mac: [u8; 6]) {
        self.buf.as_mut()[0x10..0x16].copy_from_slice(&mac);
    }

    pub fn set_birthday_sex_shirt_favorite(&mut self, v: u16) {
        set_be_u16(self.buf.as_mut(), 0x18, v);
    }

    /// Set the nickname, truncated to 10 UTF-16 units.
    pub fn set_nickname(&mut self, name: &str) {
        set_utf16_name(self.buf.as_mut(), NICKNAME, NAME_LEN, name, true);
    }

    pub fn set_width_and_height(&mut self, v: u16) {
        set_be_u16(self.buf.as_mut(), 0x2E, v);
    }

    /// Set the author nickname, truncated to 10 UTF-16 units.
    pub fn set_author_nickname(&mut self, name: &str) {
        set_utf16_name(self.buf.as_mut(), AUTHOR_NICKNAME, NAME_LEN, name, true);
    }
}
