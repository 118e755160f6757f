//! Console title identifiers.
//!
//! ## Layout (8 bytes, big-endian)
//! ```text
//! [0x00] Platform     (u16)
//! [0x02] Category     (u16)
//! [0x04] Unique ID    (24 bits)
//! [0x07] Variation    (u8)
//! ```
//! The category / unique ID / variation split is only meaningful for 3DS and
//! Wii U titles; Switch title IDs use the full 64 bits differently.

use std::fmt;
use std::str::FromStr;

use crate::utils::{be_u16, be_u24};

/// Platform half-word of a title ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// `0x0004`
    Nintendo3ds,
    /// `0x0005`
    WiiU,
    /// `0x0100`
    Switch,
    /// Any other value.
    Unknown(u16),
}

impl From<u16> for Platform {
    fn from(v: u16) -> Self {
        match v {
            0x0004 => Self::Nintendo3ds,
            0x0005 => Self::WiiU,
            0x0100 => Self::Switch,
            other => Self::Unknown(other),
        }
    }
}

/// A 64-bit console title ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TitleId(pub u64);

impl TitleId {
    /// Read from 8 big-endian bytes.
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(u64::from_be_bytes(bytes))
    }

    /// The big-endian byte form stored on tags.
    pub fn to_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    /// Console family, from the top 16 bits.
    pub fn platform(self) -> Platform {
        Platform::from(be_u16(&self.to_bytes(), 0))
    }

    /// Title category (application, DLC, update, ...).
    pub fn category(self) -> u16 {
        be_u16(&self.to_bytes(), 2)
    }

    /// 24-bit unique ID shared by all variations of a title.
    pub fn unique_id(self) -> u32 {
        be_u24(&self.to_bytes(), 4)
    }

    /// Low byte; distinguishes regional variants.
    pub fn variation(self) -> u8 {
        self.0 as u8
    }
}

impl From<u64> for TitleId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

impl fmt::Display for TitleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016X}", self.0)
    }
}

impl FromStr for TitleId {
    type Err = hex::FromHexError;

    /// Parse 16 hex digits, e.g. `"0004000000152600"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 8];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self::from_bytes(bytes))
    }
}
