//! # OxiNote Core
//!
//! Core components for the OxiNote encrypted-note toolkit.
//!
//! This crate provides the fundamental building blocks every other layer
//! depends on:
//!
//! - [`bitarray`]: Length-tagged bit strings packed into 32-bit words
//! - [`codec`]: UTF-8, hex, base64 and byte conversions
//! - [`crc`]: CRC-32 checksum
//! - [`traits`]: Block cipher and digest traits
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! OxiNote is designed as a layered stack:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L4: Command line                                        │
//! │     oxinote decrypt / encrypt / inspect / hash          │
//! ├─────────────────────────────────────────────────────────┤
//! │ L3: Container                                           │
//! │     Envelope, ENC0, legacy RC2 notes, dispatcher        │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Primitives                                          │
//! │     AES, RC2, SHA-2, MD5, HMAC, PBKDF2, modes, PRNG     │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Bits (this crate)                                   │
//! │     BitArray, codecs, CRC-32                            │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use oxinote_core::codec::{base64, hex, utf8};
//! use oxinote_core::crc::Crc32;
//!
//! let bits = utf8::to_bits("abc");
//! assert_eq!(hex::from_bits(&bits), "616263");
//! assert_eq!(base64::encode(&bits), "YWJj");
//!
//! assert_eq!(Crc32::compute(b"Hello, World!"), 0xEC4AC3D0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![forbid(unsafe_code)]

pub mod bitarray;
pub mod codec;
pub mod crc;
pub mod error;
pub mod traits;

// Re-exports for convenience
pub use bitarray::BitArray;
pub use codec::Base64;
pub use crc::Crc32;
pub use error::{OxiNoteError, Result};
pub use traits::{Block, BlockCipher, Digest};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bitarray::BitArray;
    pub use crate::codec::{Base64, base64, bytes, hex, utf8};
    pub use crate::error::{OxiNoteError, Result};
    pub use crate::traits::{Block, BlockCipher, Digest};
}
