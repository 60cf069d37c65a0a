//! Length-tagged bit strings packed into big-endian 32-bit words.
//!
//! [`BitArray`] is the currency every primitive in OxiNote accepts and
//! returns. Bits are packed most-significant first; the final word may be
//! partial, in which case only its high [`BitArray::partial_bits`] bits are
//! significant and the remaining low bits are always zero.
//!
//! ## Example
//!
//! ```
//! use oxinote_core::BitArray;
//!
//! let a = BitArray::from_words(vec![0xDEAD_BEEF]);
//! let b = a.bit_slice(4, 20);
//! assert_eq!(b.bit_length(), 16);
//! assert_eq!(b.extract(0, 16), 0xEADB);
//! ```

use std::fmt;
use zeroize::Zeroize;

/// Mask keeping the high `n` bits of a word.
#[inline]
const fn high_mask(n: usize) -> u32 {
    if n >= 32 {
        u32::MAX
    } else if n == 0 {
        0
    } else {
        !(u32::MAX >> n)
    }
}

/// An arbitrary-length bit string stored as big-endian 32-bit words.
#[derive(Clone, Default)]
pub struct BitArray {
    words: Vec<u32>,
    bits: usize,
}

impl BitArray {
    /// Create an empty bit array.
    pub const fn new() -> Self {
        Self {
            words: Vec::new(),
            bits: 0,
        }
    }

    /// Create a bit array of whole words.
    pub fn from_words(words: Vec<u32>) -> Self {
        let bits = words.len() * 32;
        Self { words, bits }
    }

    /// Create a bit array from words, keeping only the first `bits` bits.
    ///
    /// If `bits` exceeds the capacity of `words` the whole word vector is kept.
    pub fn with_bit_length(words: Vec<u32>, bits: usize) -> Self {
        let mut out = Self::from_words(words);
        out.clamp(bits);
        out
    }

    /// Pack the low `bits` bits of `value` into a single partial word.
    ///
    /// `bits` is clamped to 32; zero yields an empty array.
    pub fn partial(bits: usize, value: u32) -> Self {
        let bits = bits.min(32);
        if bits == 0 {
            return Self::new();
        }
        let word = ((value as u64) << (32 - bits)) as u32;
        Self {
            words: vec![word],
            bits,
        }
    }

    /// Number of significant bits in the final word (0 for an empty array).
    pub fn partial_bits(&self) -> usize {
        match self.bits % 32 {
            0 if self.bits == 0 => 0,
            0 => 32,
            r => r,
        }
    }

    /// Total length in bits.
    #[inline]
    pub fn bit_length(&self) -> usize {
        self.bits
    }

    /// Whether the array holds no bits.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// The backing words; a partial last word has its unused bits zeroed.
    #[inline]
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Number of backing words, counting a partial last word.
    #[inline]
    pub fn word_len(&self) -> usize {
        self.words.len()
    }

    /// Consume the array, returning its words.
    pub fn into_words(self) -> Vec<u32> {
        self.words
    }

    /// Word at `index`, or zero past the end.
    #[inline]
    pub fn word(&self, index: usize) -> u32 {
        self.words.get(index).copied().unwrap_or(0)
    }

    /// Read `len` (at most 32) bits starting at bit `start` as an unsigned value.
    ///
    /// Bits past the end of the array read as zero.
    pub fn extract(&self, start: usize, len: usize) -> u32 {
        let len = len.min(32);
        if len == 0 {
            return 0;
        }
        let index = start / 32;
        let offset = start % 32;
        let joined = ((self.word(index) as u64) << 32) | self.word(index + 1) as u64;
        ((joined << offset) >> (64 - len)) as u32
    }

    /// Bits `[start, end)`; both bounds are clamped to the array length.
    pub fn bit_slice(&self, start: usize, end: usize) -> Self {
        let end = end.min(self.bits);
        if start >= end {
            return Self::new();
        }

        let mut out = Self {
            words: Vec::with_capacity((end - start).div_ceil(32)),
            bits: 0,
        };
        if start % 32 == 0 {
            let first = start / 32;
            let last = end.div_ceil(32);
            out.words.extend_from_slice(&self.words[first..last]);
            out.bits = out.words.len() * 32;
            out.clamp(end - start);
            return out;
        }

        let mut pos = start;
        while pos < end {
            let n = (end - pos).min(32);
            let value = self.extract(pos, n);
            out.push_bits(((value as u64) << (32 - n)) as u32, n);
            pos += n;
        }
        out
    }

    /// Bits from `start` to the end.
    pub fn tail(&self, start: usize) -> Self {
        self.bit_slice(start, self.bits)
    }

    /// Append the high `n` bits of `word`.
    pub fn push_bits(&mut self, word: u32, n: usize) {
        let n = n.min(32);
        if n == 0 {
            return;
        }
        let word = word & high_mask(n);
        let offset = self.bits % 32;
        if offset == 0 {
            self.words.push(word);
        } else {
            if let Some(last) = self.words.last_mut() {
                *last |= word >> offset;
            }
            if n > 32 - offset {
                self.words.push(word << (32 - offset));
            }
        }
        self.bits += n;
    }

    /// Append a whole word.
    #[inline]
    pub fn push_word(&mut self, word: u32) {
        self.push_bits(word, 32);
    }

    /// Append all bits of `other`.
    pub fn append(&mut self, other: &BitArray) {
        if self.bits % 32 == 0 {
            self.words.extend_from_slice(&other.words);
            self.bits += other.bits;
            return;
        }
        let mut remaining = other.bits;
        for &word in &other.words {
            let n = remaining.min(32);
            self.push_bits(word, n);
            remaining -= n;
        }
    }

    /// Concatenate two bit arrays into a new one.
    pub fn concat(&self, other: &BitArray) -> Self {
        let mut out = self.clone();
        out.append(other);
        out
    }

    /// Truncate to `len` bits, zeroing the dropped low bits of the last word.
    pub fn clamp(&mut self, len: usize) {
        if len >= self.bits {
            return;
        }
        self.words.truncate(len.div_ceil(32));
        let rem = len % 32;
        if rem != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= high_mask(rem);
            }
        }
        self.bits = len;
    }

    /// Truncated copy; see [`BitArray::clamp`].
    pub fn clamped(mut self, len: usize) -> Self {
        self.clamp(len);
        self
    }

    /// Drop the first `count` whole words.
    ///
    /// Used by streaming hashes to discard consumed blocks.
    pub fn drain_words(&mut self, count: usize) {
        let count = count.min(self.words.len());
        self.words.drain(..count);
        self.bits = self.bits.saturating_sub(count * 32);
    }

    /// Compare two bit arrays in time independent of where they differ.
    ///
    /// Arrays of different bit length are never equal.
    pub fn equal(&self, other: &BitArray) -> bool {
        if self.bits != other.bits {
            return false;
        }
        let diff = self
            .words
            .iter()
            .zip(&other.words)
            .fold(0u32, |acc, (a, b)| acc | (a ^ b));
        std::hint::black_box(diff) == 0
    }
}

impl PartialEq for BitArray {
    fn eq(&self, other: &Self) -> bool {
        self.equal(other)
    }
}

impl Eq for BitArray {}

impl fmt::Debug for BitArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitArray({} bits: ", self.bits)?;
        for word in &self.words {
            write!(f, "{word:08x}")?;
        }
        write!(f, ")")
    }
}

impl Zeroize for BitArray {
    fn zeroize(&mut self) {
        self.words.zeroize();
        self.bits = 0;
    }
}

impl From<Vec<u32>> for BitArray {
    fn from(words: Vec<u32>) -> Self {
        Self::from_words(words)
    }
}

impl From<&[u32]> for BitArray {
    fn from(words: &[u32]) -> Self {
        Self::from_words(words.to_vec())
    }
}

impl<const N: usize> From<[u32; N]> for BitArray {
    fn from(words: [u32; N]) -> Self {
        Self::from_words(words.to_vec())
    }
}
