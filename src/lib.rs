//! **amiikit** - read, verify, decrypt and re-encrypt amiibo NTAG215 dumps.
//!
//! # Pipeline
//! ```text
//! raw dump (540/572) ─ formats::ntag ─▶ canonical (552) ─ codec::unpack ─▶ decrypted
//!                                                                     │
//!                       raw dump (572) ◀─ codec::pack ◀─ tag views ◀──┘
//! ```
//!
//! # Modules
//! | Module | Purpose |
//! |--------|---------|
//! | [`formats::ntag`] | Physical dump ↔ canonical buffer remapping |
//! | [`keys`]          | `key_retail.bin` master keys |
//! | [`crypto`]        | Key derivation, AES-CTR, originality ECDSA |
//! | [`codec`]         | Unpack / pack with HMAC verification |
//! | [`tag`]           | [`tag::AmiiboTag`] plus settings, Mii, identity and app-data views |
//! | [`games`]         | AppID → game handler registry |
//! | [`manager`]       | [`manager::AmiiboManager`] convenience service |
//!
//! # Features
//! * `originality` (default) - NTAG originality signature check
//!   ([`tag::AmiiboTag::is_ntag_signature_valid`]).
//!
//! The library logs through [`tracing`] and never installs a subscriber.

pub mod codec;
pub mod crypto;
pub mod error;
pub mod formats;
pub mod games;
pub mod keys;
pub mod manager;
pub mod tag;
mod utils;

pub use error::{Error, Result};
