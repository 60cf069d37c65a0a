//! SHA-256 (FIPS 180-4).
//!
//! Input is buffered as a [`BitArray`], so messages need not be a whole
//! number of bytes. Every complete 512-bit block is compressed as soon as it
//! is available; the remainder stays buffered until the next update or
//! [`Digest::finalize`].

use oxinote_core::{BitArray, Digest};
use zeroize::Zeroize;

/// Initial hash values: fractional parts of the square roots of the first 8 primes.
const INIT: [u32; 8] = [
    0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a, 0x510e527f, 0x9b05688c, 0x1f83d9ab, 0x5be0cd19,
];

/// Round constants: fractional parts of the cube roots of the first 64 primes.
const K: [u32; 64] = [
    0x428a2f98, 0x71374491, 0xb5c0fbcf, 0xe9b5dba5, 0x3956c25b, 0x59f111f1, 0x923f82a4, 0xab1c5ed5,
    0xd807aa98, 0x12835b01, 0x243185be, 0x550c7dc3, 0x72be5d74, 0x80deb1fe, 0x9bdc06a7, 0xc19bf174,
    0xe49b69c1, 0xefbe4786, 0x0fc19dc6, 0x240ca1cc, 0x2de92c6f, 0x4a7484aa, 0x5cb0a9dc, 0x76f988da,
    0x983e5152, 0xa831c66d, 0xb00327c8, 0xbf597fc7, 0xc6e00bf3, 0xd5a79147, 0x06ca6351, 0x14292967,
    0x27b70a85, 0x2e1b2138, 0x4d2c6dfc, 0x53380d13, 0x650a7354, 0x766a0abb, 0x81c2c92e, 0x92722c85,
    0xa2bfe8a1, 0xa81a664b, 0xc24b8b70, 0xc76c51a3, 0xd192e819, 0xd6990624, 0xf40e3585, 0x106aa070,
    0x19a4c116, 0x1e376c08, 0x2748774c, 0x34b0bcb5, 0x391c0cb3, 0x4ed8aa4a, 0x5b9cca4f, 0x682e6ff3,
    0x748f82ee, 0x78a5636f, 0x84c87814, 0x8cc70208, 0x90befffa, 0xa4506ceb, 0xbef9a3f7, 0xc67178f2,
];

/// Block size in 32-bit words.
const BLOCK_WORDS: usize = 16;

/// SHA-256 hash state.
#[derive(Debug, Clone, Zeroize)]
pub struct Sha256 {
    h: [u32; 8],
    buffer: BitArray,
    length: u64,
}

impl Sha256 {
    /// Compress a single 16-word block.
    fn compress(h: &mut [u32; 8], block: &[u32]) {
        let mut w = [0u32; 64];
        w[..BLOCK_WORDS].copy_from_slice(&block[..BLOCK_WORDS]);
        for i in 16..64 {
            let s0 = w[i - 15].rotate_right(7) ^ w[i - 15].rotate_right(18) ^ (w[i - 15] >> 3);
            let s1 = w[i - 2].rotate_right(17) ^ w[i - 2].rotate_right(19) ^ (w[i - 2] >> 10);
            w[i] = w[i - 16]
                .wrapping_add(s0)
                .wrapping_add(w[i - 7])
                .wrapping_add(s1);
        }

        let [mut a, mut b, mut c, mut d, mut e, mut f, mut g, mut hh] = *h;

        for i in 0..64 {
            let s1 = e.rotate_right(6) ^ e.rotate_right(11) ^ e.rotate_right(25);
            let ch = g ^ (e & (f ^ g));
            let t1 = hh
                .wrapping_add(s1)
                .wrapping_add(ch)
                .wrapping_add(K[i])
                .wrapping_add(w[i]);
            let s0 = a.rotate_right(2) ^ a.rotate_right(13) ^ a.rotate_right(22);
            let maj = (a & b) ^ (c & (a ^ b));
            let t2 = s0.wrapping_add(maj);

            hh = g;
            g = f;
            f = e;
            e = d.wrapping_add(t1);
            d = c;
            c = b;
            b = a;
            a = t1.wrapping_add(t2);
        }

        for (state, v) in h.iter_mut().zip([a, b, c, d, e, f, g, hh]) {
            *state = state.wrapping_add(v);
        }
    }
}

impl Digest for Sha256 {
    const BLOCK_BITS: usize = 512;
    const OUTPUT_BITS: usize = 256;

    fn new() -> Self {
        Self {
            h: INIT,
            buffer: BitArray::new(),
            length: 0,
        }
    }

    fn reset(&mut self) {
        self.h = INIT;
        self.buffer = BitArray::new();
        self.length = 0;
    }

    fn update(&mut self, data: &BitArray) {
        self.buffer.append(data);
        self.length += data.bit_length() as u64;

        let blocks = self.buffer.bit_length() / Self::BLOCK_BITS;
        for block in self.buffer.words().chunks_exact(BLOCK_WORDS).take(blocks) {
            Self::compress(&mut self.h, block);
        }
        self.buffer.drain_words(blocks * BLOCK_WORDS);
    }

    fn finalize(&mut self) -> BitArray {
        let mut words = self
            .buffer
            .concat(&BitArray::partial(1, 1))
            .into_words();
        while (words.len() + 2) % BLOCK_WORDS != 0 {
            words.push(0);
        }
        words.push((self.length >> 32) as u32);
        words.push(self.length as u32);

        let mut h = self.h;
        for block in words.chunks_exact(BLOCK_WORDS) {
            Self::compress(&mut h, block);
        }

        self.reset();
        BitArray::from_words(h.to_vec())
    }
}

impl Default for Sha256 {
    fn default() -> Self {
        <Self as Digest>::new()
    }
}

/// Compute SHA-256 of a byte slice.
pub fn sha256(data: &[u8]) -> BitArray {
    Sha256::hash(&oxinote_core::codec::bytes::to_bits(data))
}
