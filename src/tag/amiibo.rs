//! Amiibo identity (the 8-byte statue ID at canonical 0x1DC).
//!
//! ## Layout
//! ```text
//! [0x00] Game series ID     (top 12 bits)
//! [0x00] Character ID       (top 16 bits, includes the series)
//! [0x02] Character variant  (u8)
//! [0x03] Figure type        (u8)
//! [0x04] Amiibo number      (u16 BE)
//! [0x06] Amiibo set         (u8)
//! [0x07] Reserved, always 0x02
//! ```
//!
//! Human-readable names come from an [`AmiiboInfo`] provider; the library
//! ships none.

use std::fmt;
use std::str::FromStr;

use crate::utils::{be_u16, be_u24};

/// Name lookups for the numeric parts of a statue ID.
///
/// Every method returns [`None`] when the ID is unknown.
pub trait AmiiboInfo {
    fn amiibo_name(&self, statue_id: u64) -> Option<String>;
    fn game_series_name(&self, game_series_id: u16) -> Option<String>;
    fn character_name(&self, character_id: u16) -> Option<String>;
    fn sub_character_name(&self, sub_character_id: u32) -> Option<String>;
    fn type_name(&self, type_id: u8) -> Option<String>;
    fn amiibo_set_name(&self, set_id: u8) -> Option<String>;
}

/// A statue ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Amiibo {
    statue_id: [u8; 8],
}

impl Amiibo {
    /// Wrap the 8 bytes stored at canonical 0x1DC.
    pub fn from_statue_id(statue_id: [u8; 8]) -> Self {
        Self { statue_id }
    }

    /// The raw statue ID.
    pub fn statue_id(&self) -> [u8; 8] {
        self.statue_id
    }

    /// The statue ID as one big-endian integer, the key used by name lists.
    pub fn statue_id_u64(&self) -> u64 {
        u64::from_be_bytes(self.statue_id)
    }

    /// Top 12 bits of the statue ID.
    pub fn game_series_id(&self) -> u16 {
        be_u16(&self.statue_id, 0) >> 4
    }

    /// Top 16 bits: game series plus character number.
    pub fn character_id(&self) -> u16 {
        be_u16(&self.statue_id, 0)
    }

    /// Position of the character within its game series (low nibble of the
    /// character ID).
    pub fn character_number_in_game_series(&self) -> u8 {
        self.statue_id[1] & 0x0F
    }

    /// Costume or pose variant; 0 is the regular figure.
    pub fn character_variant(&self) -> u8 {
        self.statue_id[2]
    }

    /// Character ID together with the variant (top 24 bits).
    pub fn sub_character_id(&self) -> u32 {
        be_u24(&self.statue_id, 0)
    }

    /// Figure, card, yarn or band.
    pub fn type_id(&self) -> u8 {
        self.statue_id[3]
    }

    /// Model number within the whole amiibo line.
    pub fn amiibo_no(&self) -> u16 {
        be_u16(&self.statue_id, 4)
    }

    /// Series (set) the figure was released in.
    pub fn amiibo_set_id(&self) -> u8 {
        self.statue_id[6]
    }

    /// Statue name, or `"Unknown <number>"`.
    pub fn statue_name(&self, info: &dyn AmiiboInfo) -> String {
        info.amiibo_name(self.statue_id_u64())
            .unwrap_or_else(|| format!("Unknown {}", self.amiibo_no()))
    }

    /// Sub-character name; the base variant is always `"Regular"`.
    pub fn sub_character_name(&self, info: &dyn AmiiboInfo) -> String {
        if self.character_variant() == 0 {
            return "Regular".to_owned();
        }
        info.sub_character_name(self.sub_character_id())
            .unwrap_or_else(|| format!("Unknown {}", self.sub_character_id()))
    }

    /// Whether `info` knows every part of this statue ID.
    pub fn is_data_complete(&self, info: &dyn AmiiboInfo) -> bool {
        info.amiibo_name(self.statue_id_u64()).is_some()
            && info.game_series_name(self.game_series_id()).is_some()
            && info.character_name(self.character_id()).is_some()
            && info.sub_character_name(self.sub_character_id()).is_some()
            && info.type_name(self.type_id()).is_some()
            && info.amiibo_set_name(self.amiibo_set_id()).is_some()
    }

    /// Display name for a figure.
    ///
    /// Uses the statue name when known (and either the figure has a number or
    /// it is character 0). Otherwise composes
    /// `"<character> (<series>[, <variant>])"` from whatever `info` knows.
    pub fn retail_name(&self, info: &dyn AmiiboInfo) -> String {
        if let Some(name) = info.amiibo_name(self.statue_id_u64())
            && (self.amiibo_no() != 0 || self.character_id() == 0)
        {
            return name;
        }

        let mut name = info
            .character_name(self.character_id())
            .unwrap_or_else(|| format!("Char#{}", self.character_number_in_game_series()));
        name.push_str(" (");
        match info.game_series_name(self.game_series_id()) {
            Some(series) => name.push_str(&series),
            None => name.push_str(&format!("series {}", self.game_series_id())),
        }
        if self.character_variant() > 0 {
            name.push_str(", ");
            match info.sub_character_name(self.sub_character_id()) {
                Some(sub) => name.push_str(&sub),
                None => name.push_str(&format!("variant {}", self.character_variant())),
            }
        }
        name.push(')');
        name
    }
}

impl fmt::Display for Amiibo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_upper(self.statue_id))
    }
}

impl FromStr for Amiibo {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut statue_id = [0u8; 8];
        hex::decode_to_slice(s.trim_start_matches("0x"), &mut statue_id)?;
        Ok(Self { statue_id })
    }
}
