//! Raw dump formats.
//!
//! Everything above this module works on the canonical 552-byte buffer;
//! the submodules here translate between that buffer and what an NFC
//! reader actually produces.
//!
//! ## Format overview
//!
//! | Module   | Format         | Description |
//! |----------|----------------|-------------|
//! | [`ntag`] | NTAG215 dump   | 540-byte page dump, or 572 bytes with the originality signature appended |

pub mod ntag;
