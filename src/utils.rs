//! Low-level field primitives shared by the tag views.
//!
//! Every accessor works on a borrowed window of the canonical buffer and an
//! offset relative to that window. Offsets are compile-time constants in the
//! callers, so an out-of-range offset is a programming error and panics like
//! ordinary slice indexing.

use chrono::{Datelike, NaiveDate};

use crate::{Error, Result};

/// Fail with [`Error::BufferTooShort`] unless `buf` holds `needed` bytes.
pub(crate) fn check_len(buf: &[u8], needed: usize) -> Result<()> {
    if buf.len() < needed {
        return Err(Error::BufferTooShort {
            needed,
            got: buf.len(),
        });
    }
    Ok(())
}

/// Read a big-endian `u16`.
#[inline]
pub(crate) fn be_u16(buf: &[u8], off: usize) -> u16 {
    u16::from_be_bytes(bytesa(buf, off))
}

/// Write a big-endian `u16`.
#[inline]
pub(crate) fn set_be_u16(buf: &mut [u8], off: usize, v: u16) {
    buf[off..off + 2].copy_from_slice(&v.to_be_bytes());
}

/// Read a big-endian 24-bit value into the low bits of a `u32`.
#[inline]
pub(crate) fn be_u24(buf: &[u8], off: usize) -> u32 {
    let b: [u8; 3] = bytesa(buf, off);
    u32::from_be_bytes([0, b[0], b[1], b[2]])
}

/// Read a big-endian `u32`.
#[inline]
pub(crate) fn be_u32(buf: &[u8], off: usize) -> u32 {
    u32::from_be_bytes(bytesa(buf, off))
}

/// Write a big-endian `u32`.
#[inline]
pub(crate) fn set_be_u32(buf: &mut [u8], off: usize, v: u32) {
    buf[off..off + 4].copy_from_slice(&v.to_be_bytes());
}

/// Read a big-endian `u64`.
#[inline]
pub(crate) fn be_u64(buf: &[u8], off: usize) -> u64 {
    u64::from_be_bytes(bytesa(buf, off))
}

/// Write a big-endian `u64`.
#[inline]
pub(crate) fn set_be_u64(buf: &mut [u8], off: usize, v: u64) {
    buf[off..off + 8].copy_from_slice(&v.to_be_bytes());
}

/// Copy exactly `N` bytes starting at `off` into a fixed-size array.
#[inline]
pub(crate) fn bytesa<const N: usize>(buf: &[u8], off: usize) -> [u8; N] {
    let mut b = [0u8; N];
    b.copy_from_slice(&buf[off..off + N]);
    b
}

/// Decode a packed tag date.
///
/// Layout: bits 0-4 day, bits 5-8 month, bits 9-15 years since 2000.
/// Returns [`None`] for bit patterns that are not a calendar date (blank
/// tags store zero here).
pub(crate) fn unpack_date(v: u16) -> Option<NaiveDate> {
    let day = u32::from(v & 0x1F);
    let month = u32::from((v >> 5) & 0x0F);
    let year = 2000 + i32::from((v >> 9) & 0x7F);
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Encode a date into the packed 16-bit tag format.
///
/// Returns [`Error::DateOutOfRange`] for years outside 2000-2127.
pub(crate) fn pack_date(date: NaiveDate) -> Result<u16> {
    let year = date.year() - 2000;
    if !(0..=0x7F).contains(&year) {
        return Err(Error::DateOutOfRange);
    }
    Ok(((year as u16) << 9) | ((date.month() as u16) << 5) | date.day() as u16)
}

/// Decode a fixed-width UTF-16 name field, dropping control characters
/// (including the NUL padding).
pub(crate) fn utf16_name(buf: &[u8], off: usize, len: usize, le: bool) -> String {
    let units = buf[off..off + len].chunks_exact(2).map(|c| {
        let pair = [c[0], c[1]];
        if le {
            u16::from_le_bytes(pair)
        } else {
            u16::from_be_bytes(pair)
        }
    });
    char::decode_utf16(units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .filter(|c| !c.is_control())
        .collect()
}

/// Encode `name` into a fixed-width UTF-16 field of `len` bytes.
///
/// Control characters are dropped, the name is truncated to `len / 2` code
/// units (never splitting a surrogate pair) and the rest of the field is
/// zero-filled.
pub(crate) fn set_utf16_name(buf: &mut [u8], off: usize, len: usize, name: &str, le: bool) {
    let max_units = len / 2;
    let mut units: Vec<u16> = Vec::with_capacity(max_units);
    for c in name.chars().filter(|c| !c.is_control()) {
        let mut enc = [0u16; 2];
        let enc = c.encode_utf16(&mut enc);
        if units.len() + enc.len() > max_units {
            break;
        }
        units.extend_from_slice(enc);
    }

    let field = &mut buf[off..off + len];
    field.fill(0);
    for (dst, unit) in field.chunks_exact_mut(2).zip(units) {
        let bytes = if le {
            unit.to_le_bytes()
        } else {
            unit.to_be_bytes()
        };
        dst.copy_from_slice(&bytes);
    }
}
