//! Raw byte codec.

use crate::bitarray::BitArray;

/// Pack bytes big-endian into a bit array of `8 * bytes.len()` bits.
pub fn to_bits(bytes: &[u8]) -> BitArray {
    let mut words = Vec::with_capacity(bytes.len().div_ceil(4));
    for chunk in bytes.chunks(4) {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        words.push(u32::from_be_bytes(word));
    }
    BitArray::with_bit_length(words, bytes.len() * 8)
}

/// Unpack whole bytes; a trailing fragment shorter than 8 bits is dropped.
pub fn from_bits(bits: &BitArray) -> Vec<u8> {
    let len = bits.bit_length() / 8;
    let mut out = Vec::with_capacity(len + 3);
    for word in bits.words() {
        out.extend_from_slice(&word.to_be_bytes());
    }
    out.truncate(len);
    out
}
