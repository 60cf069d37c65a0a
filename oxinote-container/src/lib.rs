//! # OxiNote Container
//!
//! Encrypted note formats built on the OxiNote primitives.
//!
//! | Format | Tag | Key | Integrity |
//! |--------|-----|-----|-----------|
//! | [`current`] (`ENC0`) | `AES` | PBKDF2-SHA256, 50 000 rounds | HMAC-SHA256 |
//! | [`legacy`] | `RC2` | MD5 of the passphrase | truncated CRC-32 |
//! | [`envelope`] | n/a | PBKDF2-SHA256 or raw key | CCM / OCB2 / GCM tag |
//!
//! [`dispatch`] routes a tagged note to the right decoder and reports every
//! integrity failure as [`OxiNoteError::BadPassword`].
//!
//! ## Example
//!
//! ```rust
//! use oxinote_container::{OxiNoteError, dispatch};
//!
//! let note = "WZ4q5r8oALWluehnJ9nxhQ==";
//! assert_eq!(dispatch::decrypt("RC2", Some(64), "secret", note).unwrap(), "Hello");
//! assert_eq!(
//!     dispatch::decrypt("RC2", Some(64), "guess", note),
//!     Err(OxiNoteError::BadPassword)
//! );
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod config;
pub mod current;
pub mod dispatch;
pub mod envelope;
pub mod legacy;

pub use config::{CurrentFormatConfig, EnvelopeDefaults, LegacyFormatConfig};
pub use current::Enc0Blob;
pub use dispatch::{CipherTag, Inspection, inspect};
pub use envelope::{EnvelopeCipher, Params, Secret};
pub use oxinote_core::{OxiNoteError, Result};
