//! NTAG215 physical dump <-> canonical amiibo layout.
//!
//! A raw dump is the page-ordered memory of the NFC chip. All crypto and
//! field access works on a 552-byte *canonical* buffer that groups the
//! signed and encrypted regions contiguously.
//!
//! ## Region map
//! ```text
//! canonical  len    physical  contents
//! [0x000]    0x008  [0x008]   BCC1, internal, static lock bytes, capability container
//! [0x008]    0x020  [0x080]   Data HMAC (signs canonical 0x029-0x208)
//! [0x028]    0x024  [0x010]   Crypto-init sequence (4 bytes) + start of encrypted section
//! [0x04C]    0x168  [0x0A0]   Encrypted section, continued
//! [0x1B4]    0x020  [0x034]   Tag HMAC (signs canonical 0x1D4-0x208)
//! [0x1D4]    0x008  [0x000]   NTAG serial (UID0-2, BCC0, UID3-6)
//! [0x1DC]    0x02C  [0x054]   Plaintext identity data
//! [0x208]    0x020  [0x21C]   NTAG originality ECDSA signature (572-byte dumps only)
//! ```
//!
//! Physical `0x208..0x214` holds the dynamic lock bytes and the CFG0/CFG1
//! pages; they are not part of the canonical buffer and are rewritten with
//! [`CONFIG_BYTES`] on conversion back. Physical `0x214..0x21C` (PWD/PACK)
//! is left zeroed.

use crate::{Error, Result};

/// Size of the canonical buffer.
pub const AMIIBO_SIZE: usize = 0x228;

/// Size of a plain NTAG215 dump.
pub const NTAG_SIZE: usize = 540;

/// Size of an NTAG215 dump with the trailing originality signature.
pub const NTAG_SIZE_WITH_SIGNATURE: usize = 572;

/// Dynamic lock bytes + RFUI, CFG0 and CFG1 written at physical 0x208.
pub const CONFIG_BYTES: [u8; 12] = [
    0x01, 0x00, 0x0F, 0xBD, // dynamic lock bytes + RFUI
    0x00, 0x00, 0x00, 0x04, // CFG0
    0x5F, 0x00, 0x00, 0x00, // CFG1
];

/// Canonical offset of the originality signature.
const ECDSA_INTERNAL: usize = 0x208;
/// Physical offset of the originality signature.
const ECDSA_PHYSICAL: usize = 0x21C;
/// Physical offset of [`CONFIG_BYTES`].
const CONFIG_PHYSICAL: usize = 0x208;
const ECDSA_LEN: usize = 0x20;

/// `(canonical offset, length, physical offset)` for every region shared by
/// both dump sizes.
const REGIONS: [(usize, usize, usize); 7] = [
    (0x000, 0x008, 0x008),
    (0x008, 0x020, 0x080),
    (0x028, 0x024, 0x010),
    (0x04C, 0x168, 0x0A0),
    (0x1B4, 0x020, 0x034),
    (0x1D4, 0x008, 0x000),
    (0x1DC, 0x02C, 0x054),
];

/// Recognized raw dump variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpKind {
    /// 540 bytes, no originality signature.
    Plain,
    /// 572 bytes, originality signature at physical 0x21C.
    WithSignature,
}

impl DumpKind {
    /// Classify a dump by its length.
    ///
    /// Returns [`Error::InvalidDumpSize`] for any other length.
    pub fn from_len(len: usize) -> Result<Self> {
        match len {
            NTAG_SIZE => Ok(Self::Plain),
            NTAG_SIZE_WITH_SIGNATURE => Ok(Self::WithSignature),
            _ => Err(Error::InvalidDumpSize(len)),
        }
    }

    /// Dump length in bytes.
    pub fn size(self) -> usize {
        match self {
            Self::Plain => NTAG_SIZE,
            Self::WithSignature => NTAG_SIZE_WITH_SIGNATURE,
        }
    }
}

/// Convert a raw dump into a new canonical buffer.
pub fn tag_to_internal(tag: &[u8]) -> Result<[u8; AMIIBO_SIZE]> {
    let mut internal = [0u8; AMIIBO_SIZE];
    tag_to_internal_into(tag, &mut internal)?;
    Ok(internal)
}

/// Convert a raw dump into `internal`.
///
/// For a 540-byte dump the signature region is filled with `0xFF`.
pub fn tag_to_internal_into(tag: &[u8], internal: &mut [u8; AMIIBO_SIZE]) -> Result<()> {
    let kind = DumpKind::from_len(tag.len())?;
    for (canonical, len, physical) in REGIONS {
        internal[canonical..canonical + len].copy_from_slice(&tag[physical..physical + len]);
    }
    let signature = &mut internal[ECDSA_INTERNAL..ECDSA_INTERNAL + ECDSA_LEN];
    match kind {
        DumpKind::WithSignature => {
            signature.copy_from_slice(&tag[ECDSA_PHYSICAL..ECDSA_PHYSICAL + ECDSA_LEN])
        }
        DumpKind::Plain => signature.fill(0xFF),
    }
    Ok(())
}

/// Convert a canonical buffer into a new raw dump of the given kind.
pub fn internal_to_tag(internal: &[u8], kind: DumpKind) -> Result<Vec<u8>> {
    let mut tag = vec![0u8; kind.size()];
    internal_to_tag_into(internal, &mut tag)?;
    Ok(tag)
}

/// Convert a canonical buffer into `tag`, whose length selects the dump kind.
///
/// Also writes [`CONFIG_BYTES`] at physical 0x208. The signature is only
/// written to 572-byte dumps.
pub fn internal_to_tag_into(internal: &[u8], tag: &mut [u8]) -> Result<()> {
    let internal: &[u8; AMIIBO_SIZE] = internal
        .try_into()
        .map_err(|_| Error::InvalidInternalSize(internal.len()))?;
    let kind = DumpKind::from_len(tag.len())?;
    write_tag(internal, tag, kind);
    Ok(())
}

/// Remap into a dump whose length is already known to match `kind`.
pub(crate) fn write_tag(internal: &[u8; AMIIBO_SIZE], tag: &mut [u8], kind: DumpKind) {
    for (canonical, len, physical) in REGIONS {
        tag[physical..physical + len].copy_from_slice(&internal[canonical..canonical + len]);
    }
    if kind == DumpKind::WithSignature {
        tag[ECDSA_PHYSICAL..ECDSA_PHYSICAL + ECDSA_LEN]
            .copy_from_slice(&internal[ECDSA_INTERNAL..ECDSA_INTERNAL + ECDSA_LEN]);
    }
    tag[CONFIG_PHYSICAL..CONFIG_PHYSICAL + CONFIG_BYTES.len()].copy_from_slice(&CONFIG_BYTES);
}
