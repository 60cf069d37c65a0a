//! Base64 codec (RFC 4648) over bit arrays.
//!
//! Four engines are provided as constants, covering the standard and
//! URL-safe alphabets with and without `=` padding. Decoding ignores
//! whitespace and `=` wherever they appear and keeps only whole bytes.
//!
//! ## Example
//!
//! ```
//! use oxinote_core::codec::{Base64, utf8};
//!
//! let bits = utf8::to_bits("hi?>");
//! assert_eq!(Base64::STANDARD.encode(&bits), "aGk/Pg==");
//! assert_eq!(Base64::URL_SAFE_NO_PAD.encode(&bits), "aGk_Pg");
//! ```

use crate::bitarray::BitArray;
use crate::error::{OxiNoteError, Result};

const STANDARD_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
const URL_SAFE_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// A base64 alphabet plus padding policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Base64 {
    alphabet: &'static [u8; 64],
    pad: bool,
}

impl Base64 {
    /// Standard alphabet with `=` padding.
    pub const STANDARD: Self = Self {
        alphabet: STANDARD_ALPHABET,
        pad: true,
    };

    /// Standard alphabet without padding.
    pub const STANDARD_NO_PAD: Self = Self {
        alphabet: STANDARD_ALPHABET,
        pad: false,
    };

    /// URL-safe alphabet (`-`, `_`) with `=` padding.
    pub const URL_SAFE: Self = Self {
        alphabet: URL_SAFE_ALPHABET,
        pad: true,
    };

    /// URL-safe alphabet without padding.
    pub const URL_SAFE_NO_PAD: Self = Self {
        alphabet: URL_SAFE_ALPHABET,
        pad: false,
    };

    /// Whether `c` belongs to this engine's alphabet.
    pub fn is_alphabet_char(&self, c: char) -> bool {
        c.is_ascii() && self.alphabet.contains(&(c as u8))
    }

    /// Encode every bit, zero-filling the final sextet.
    pub fn encode(&self, bits: &BitArray) -> String {
        let len = bits.bit_length();
        let mut out = String::with_capacity(len.div_ceil(6) + 3);
        let mut pos = 0;
        while pos < len {
            let sextet = bits.extract(pos, 6) as usize;
            out.push(self.alphabet[sextet] as char);
            pos += 6;
        }
        if self.pad {
            while out.len() % 4 != 0 {
                out.push('=');
            }
        }
        out
    }

    /// Decode text into whole bytes.
    pub fn decode(&self, text: &str) -> Result<BitArray> {
        let mut out = BitArray::new();
        for (i, c) in text.chars().enumerate() {
            if c.is_whitespace() || c == '=' {
                continue;
            }
            let index = self.index_of(c).ok_or_else(|| {
                OxiNoteError::invalid_encoding(format!(
                    "invalid base64 character {c:?} at position {i}"
                ))
            })?;
            out.push_bits(index << 26, 6);
        }
        let whole = out.bit_length() / 8 * 8;
        out.clamp(whole);
        Ok(out)
    }

    fn index_of(&self, c: char) -> Option<u32> {
        if !c.is_ascii() {
            return None;
        }
        self.alphabet
            .iter()
            .position(|&a| a == c as u8)
            .map(|i| i as u32)
    }
}

/// Encode with [`Base64::STANDARD`].
pub fn encode(bits: &BitArray) -> String {
    Base64::STANDARD.encode(bits)
}

/// Decode with [`Base64::STANDARD`].
pub fn decode(text: &str) -> Result<BitArray> {
    Base64::STANDARD.decode(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{bytes, utf8};
    use proptest::prelude::*;

    #[test]
    fn test_rfc4648_vectors() {
        let cases = [
            ("", ""),
            ("f", "Zg=="),
            ("fo", "Zm8="),
            ("foo", "Zm9v"),
            ("foob", "Zm9vYg=="),
            ("fooba", "Zm9vYmE="),
            ("foobar", "Zm9vYmFy"),
        ];
        for (plain, encoded) in cases {
            assert_eq!(encode(&utf8::to_bits(plain)), encoded);
            assert_eq!(utf8::from_bits(&decode(encoded).unwrap()).unwrap(), plain);
        }
    }

    #[test]
    fn test_unpadded_and_url() {
        let bits = bytes::to_bits(&[0xFB, 0xFF]);
        assert_eq!(Base64::STANDARD.encode(&bits), "+/8=");
        assert_eq!(Base64::STANDARD_NO_PAD.encode(&bits), "+/8");
        assert_eq!(Base64::URL_SAFE.encode(&bits), "-_8=");
        assert_eq!(Base64::URL_SAFE_NO_PAD.encode(&bits), "-_8");
        assert_eq!(Base64::URL_SAFE.decode("-_8").unwrap(), bits);
    }

    #[test]
    fn test_decode_ignores_whitespace() {
        let bits = decode("Zm9v\nYmFy\r\n").unwrap();
        assert_eq!(bytes::from_bits(&bits), b"foobar");
    }

    #[test]
    fn test_decode_rejects_foreign_alphabet() {
        assert!(matches!(
            Base64::URL_SAFE.decode("+/8="),
            Err(OxiNoteError::InvalidEncoding { .. })
        ));
        assert!(decode("Zm9v!").is_err());
    }

    proptest! {
        #[test]
        fn bytes_survive_every_engine(data in proptest::collection::vec(any::<u8>(), 0..64)) {
            let bits = bytes::to_bits(&data);
            for engine in [
                Base64::STANDARD,
                Base64::STANDARD_NO_PAD,
                Base64::URL_SAFE,
                Base64::URL_SAFE_NO_PAD,
            ] {
                prop_assert_eq!(engine.decode(&engine.encode(&bits)).unwrap(), bits.clone());
            }
        }
    }
}
