//! Core traits for block ciphers and hash functions.
//!
//! The chaining modes are generic over [`BlockCipher`] and HMAC/PBKDF2 are
//! generic over [`Digest`], so every higher layer is written once against
//! these seams.

use crate::bitarray::BitArray;
use crate::codec::utf8;
use zeroize::Zeroize;

/// A 128-bit block, four big-endian words.
pub type Block = [u32; 4];

/// A keyed permutation over 128-bit blocks.
///
/// Implementations are immutable after construction; encrypting or
/// decrypting a block has no side effects.
pub trait BlockCipher {
    /// Encrypt one block.
    fn encrypt_block(&self, block: &Block) -> Block;

    /// Decrypt one block.
    fn decrypt_block(&self, block: &Block) -> Block;
}

/// A streaming hash function over bit strings.
///
/// The lifecycle is `new → update* → finalize`; `finalize` returns the
/// digest and leaves the context reset for reuse. Contexts can be wiped
/// with [`Zeroize`], since a keyed context is as sensitive as its key.
pub trait Digest: Clone + Zeroize {
    /// Compression block size in bits.
    const BLOCK_BITS: usize;

    /// Digest size in bits.
    const OUTPUT_BITS: usize;

    /// Create a context in the reset state.
    fn new() -> Self;

    /// Return to the initial state, discarding buffered input.
    fn reset(&mut self);

    /// Absorb more input.
    fn update(&mut self, data: &BitArray);

    /// Pad, compress the remaining input and return the digest.
    fn finalize(&mut self) -> BitArray;

    /// Absorb the UTF-8 encoding of `text`.
    fn update_text(&mut self, text: &str) {
        self.update(&utf8::to_bits(text));
    }

    /// Hash `data` in one call.
    fn hash(data: &BitArray) -> BitArray {
        let mut ctx = Self::new();
        ctx.update(data);
        ctx.finalize()
    }
}
