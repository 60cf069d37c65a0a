//! Hexadecimal codec.

use crate::bitarray::BitArray;
use crate::error::{OxiNoteError, Result};

/// Encode as lowercase hex, one digit per whole nibble.
pub fn from_bits(bits: &BitArray) -> String {
    let digits = bits.bit_length() / 4;
    let mut out = String::with_capacity(digits);
    for word in bits.words() {
        out.push_str(&format!("{word:08x}"));
    }
    out.truncate(digits);
    out
}

/// Decode hex digits, four bits each.
///
/// Whitespace and `0x` prefixes are ignored. An odd digit count yields a
/// bit array whose length is not a whole number of bytes.
pub fn to_bits(text: &str) -> Result<BitArray> {
    let cleaned: String = text
        .replace("0x", "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    let mut out = BitArray::new();
    for (i, c) in cleaned.chars().enumerate() {
        let nibble = c.to_digit(16).ok_or_else(|| {
            OxiNoteError::invalid_encoding(format!("invalid hex digit {c:?} at position {i}"))
        })?;
        out.push_bits(nibble << 28, 4);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_encode() {
        let bits = BitArray::from_words(vec![0x0011_AAFF, 0x1000_0000]).clamped(40);
        assert_eq!(from_bits(&bits), "0011aaff10");
    }

    #[test]
    fn test_hex_decode() {
        let bits = to_bits("0x00 11 AA ff").unwrap();
        assert_eq!(bits.bit_length(), 32);
        assert_eq!(bits.words(), &[0x0011_AAFF]);

        let odd = to_bits("abc").unwrap();
        assert_eq!(odd.bit_length(), 12);
        assert_eq!(from_bits(&odd), "abc");
    }

    #[test]
    fn test_hex_rejects_garbage() {
        assert!(matches!(
            to_bits("12zz"),
            Err(OxiNoteError::InvalidEncoding { .. })
        ));
    }
}
