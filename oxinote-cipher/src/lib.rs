//! # OxiNote Cipher
//!
//! Pure Rust block ciphers and chaining modes over [`BitArray`]s.
//!
//! - [`Aes`]: AES-128/192/256 with compile-time tables
//! - [`Rc2`]: RC2 with a configurable effective key length, for legacy notes
//! - [`mode`]: CBC, CCM, GCM and OCB2, generic over [`BlockCipher`]
//!
//! ## Example
//!
//! ```rust
//! use oxinote_core::codec::{bytes, utf8};
//! use oxinote_core::BitArray;
//! use oxinote_cipher::{Aes, Mode};
//!
//! let aes = Aes::new(&BitArray::from_words(vec![0x2b7e1516, 0x28aed2a6, 0xabf71588, 0x09cf4f3c])).unwrap();
//! let iv = bytes::to_bits(&[7u8; 16]);
//! let adata = utf8::to_bits("note-id:42");
//!
//! let ct = Mode::Gcm.encrypt(&aes, &utf8::to_bits("hello"), &iv, &adata, 128).unwrap();
//! let pt = Mode::Gcm.decrypt(&aes, &ct, &iv, &adata, 128).unwrap();
//! assert_eq!(utf8::from_bits(&pt).unwrap(), "hello");
//! ```
//!
//! [`BitArray`]: oxinote_core::BitArray
//! [`BlockCipher`]: oxinote_core::BlockCipher

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod aes;
pub mod mode;
pub mod rc2;

pub use aes::Aes;
pub use mode::{Cipher, KeyedCipher, Mode};
pub use rc2::Rc2;
