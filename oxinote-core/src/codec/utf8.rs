//! UTF-8 string codec.

use crate::bitarray::BitArray;
use crate::codec::bytes;
use crate::error::{OxiNoteError, Result};

/// Encode a string as its UTF-8 bytes.
pub fn to_bits(text: &str) -> BitArray {
    bytes::to_bits(text.as_bytes())
}

/// Decode whole bytes as UTF-8.
///
/// Fails with [`OxiNoteError::InvalidEncoding`] on malformed sequences.
pub fn from_bits(bits: &BitArray) -> Result<String> {
    String::from_utf8(bytes::from_bits(bits))
        .map_err(|e| OxiNoteError::invalid_encoding(format!("invalid UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_roundtrip() {
        let text = "note: caf\u{e9} \u{1F512}";
        let bits = to_bits(text);
        assert_eq!(bits.bit_length(), text.len() * 8);
        assert_eq!(from_bits(&bits).unwrap(), text);
    }

    #[test]
    fn test_utf8_rejects_invalid() {
        let bits = bytes::to_bits(&[0x66, 0xC3]);
        assert!(matches!(
            from_bits(&bits),
            Err(OxiNoteError::InvalidEncoding { .. })
        ));
    }
}
