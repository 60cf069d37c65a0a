//! # OxiNote Hash
//!
//! Pure Rust hash functions and key derivation over [`BitArray`]s.
//!
//! - [`Sha256`] / [`Sha512`]: streaming SHA-2 (FIPS 180-4)
//! - [`Md5`]: byte-oriented MD5 (RFC 1321), used only for legacy keys
//! - [`Hmac`]: HMAC over any [`Digest`]
//! - [`pbkdf2`] / [`Pbkdf2Step`]: PBKDF2, one-shot or resumable
//!
//! ## Example
//!
//! ```rust
//! use oxinote_core::codec::{hex, utf8};
//! use oxinote_core::Digest;
//! use oxinote_hash::{Sha256, pbkdf2_sha256};
//!
//! let digest = Sha256::hash(&utf8::to_bits("abc"));
//! assert!(hex::from_bits(&digest).starts_with("ba7816bf"));
//!
//! let key = pbkdf2_sha256("password", &utf8::to_bits("salt"), 1, 256).unwrap();
//! assert!(hex::from_bits(&key).starts_with("120fb6cf"));
//! ```
//!
//! [`BitArray`]: oxinote_core::BitArray
//! [`Digest`]: oxinote_core::Digest

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod hmac;
pub mod md5;
pub mod pbkdf2;
pub mod sha256;
pub mod sha512;

pub use hmac::Hmac;
pub use md5::Md5;
pub use pbkdf2::{Pbkdf2Step, pbkdf2, pbkdf2_sha256};
pub use sha256::{Sha256, sha256};
pub use sha512::Sha512;

/// HMAC keyed with SHA-256, the PRF used by both note formats.
pub type HmacSha256 = Hmac<Sha256>;
