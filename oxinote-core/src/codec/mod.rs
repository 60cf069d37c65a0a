//! Conversions between [`BitArray`](crate::BitArray) and external representations.
//!
//! - [`utf8`]: UTF-8 text
//! - [`hex`]: lowercase hexadecimal
//! - [`base64`]: standard and URL-safe alphabets, padded or not
//! - [`bytes`]: raw byte vectors
//!
//! For well-formed, byte-aligned input every codec satisfies
//! `to_bits(from_bits(x)) == x`.

pub mod base64;
pub mod bytes;
pub mod hex;
pub mod utf8;

pub use base64::Base64;
