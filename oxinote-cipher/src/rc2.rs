//! RC2 block cipher (RFC 2268).
//!
//! Only the legacy note container uses RC2, with a 128-bit key (an MD5
//! digest) reduced to 64 effective bits. The cipher itself is general:
//! any key of 1 to 128 bytes and any effective length of 1 to 1024 bits.
//!
//! Blocks are 64 bits, read as four little-endian 16-bit words.

use oxinote_core::{OxiNoteError, Result};
use zeroize::ZeroizeOnDrop;

/// Block size in bytes.
pub const BLOCK_SIZE: usize = 8;

/// Key-expansion permutation, derived from the digits of pi.
const PITABLE: [u8; 256] = [
    0xd9, 0x78, 0xf9, 0xc4, 0x19, 0xdd, 0xb5, 0xed, 0x28, 0xe9, 0xfd, 0x79, 0x4a, 0xa0, 0xd8, 0x9d,
    0xc6, 0x7e, 0x37, 0x83, 0x2b, 0x76, 0x53, 0x8e, 0x62, 0x4c, 0x64, 0x88, 0x44, 0x8b, 0xfb, 0xa2,
    0x17, 0x9a, 0x59, 0xf5, 0x87, 0xb3, 0x4f, 0x13, 0x61, 0x45, 0x6d, 0x8d, 0x09, 0x81, 0x7d, 0x32,
    0xbd, 0x8f, 0x40, 0xeb, 0x86, 0xb7, 0x7b, 0x0b, 0xf0, 0x95, 0x21, 0x22, 0x5c, 0x6b, 0x4e, 0x82,
    0x54, 0xd6, 0x65, 0x93, 0xce, 0x60, 0xb2, 0x1c, 0x73, 0x56, 0xc0, 0x14, 0xa7, 0x8c, 0xf1, 0xdc,
    0x12, 0x75, 0xca, 0x1f, 0x3b, 0xbe, 0xe4, 0xd1, 0x42, 0x3d, 0xd4, 0x30, 0xa3, 0x3c, 0xb6, 0x26,
    0x6f, 0xbf, 0x0e, 0xda, 0x46, 0x69, 0x07, 0x57, 0x27, 0xf2, 0x1d, 0x9b, 0xbc, 0x94, 0x43, 0x03,
    0xf8, 0x11, 0xc7, 0xf6, 0x90, 0xef, 0x3e, 0xe7, 0x06, 0xc3, 0xd5, 0x2f, 0xc8, 0x66, 0x1e, 0xd7,
    0x08, 0xe8, 0xea, 0xde, 0x80, 0x52, 0xee, 0xf7, 0x84, 0xaa, 0x72, 0xac, 0x35, 0x4d, 0x6a, 0x2a,
    0x96, 0x1a, 0xd2, 0x71, 0x5a, 0x15, 0x49, 0x74, 0x4b, 0x9f, 0xd0, 0x5e, 0x04, 0x18, 0xa4, 0xec,
    0xc2, 0xe0, 0x41, 0x6e, 0x0f, 0x51, 0xcb, 0xcc, 0x24, 0x91, 0xaf, 0x50, 0xa1, 0xf4, 0x70, 0x39,
    0x99, 0x7c, 0x3a, 0x85, 0x23, 0xb8, 0xb4, 0x7a, 0xfc, 0x02, 0x36, 0x5b, 0x25, 0x55, 0x97, 0x31,
    0x2d, 0x5d, 0xfa, 0x98, 0xe3, 0x8a, 0x92, 0xae, 0x05, 0xdf, 0x29, 0x10, 0x67, 0x6c, 0xba, 0xc9,
    0xd3, 0x00, 0xe6, 0xcf, 0xe1, 0x9e, 0xa8, 0x2c, 0x63, 0x16, 0x01, 0x3f, 0x58, 0xe2, 0x89, 0xa9,
    0x0d, 0x38, 0x34, 0x1b, 0xab, 0x33, 0xff, 0xb0, 0xbb, 0x48, 0x0c, 0x5f, 0xb9, 0xb1, 0xcd, 0x2e,
    0xc5, 0xf3, 0xdb, 0x47, 0xe5, 0xa5, 0x9c, 0x77, 0x0a, 0xa6, 0x20, 0x68, 0xfe, 0x7f, 0xc1, 0xad,
];

/// An expanded RC2 key: 64 little-endian 16-bit words.
#[derive(Clone, ZeroizeOnDrop)]
pub struct Rc2 {
    key: [u16; 64],
}

impl Rc2 {
    /// Expand `key` with the given effective key length in bits.
    ///
    /// # Errors
    ///
    /// [`OxiNoteError::InvalidKeySize`] if the key is empty or longer than
    /// 128 bytes, [`OxiNoteError::InvalidParameter`] if `effective_bits` is
    /// outside `1..=1024`.
    pub fn new(key: &[u8], effective_bits: usize) -> Result<Self> {
        if key.is_empty() || key.len() > 128 {
            return Err(OxiNoteError::InvalidKeySize {
                bits: key.len() * 8,
            });
        }
        if !(1..=1024).contains(&effective_bits) {
            return Err(OxiNoteError::invalid_parameter(format!(
                "rc2 effective key length must be 1..=1024 bits, got {effective_bits}"
            )));
        }

        let mut l = [0u8; 128];
        l[..key.len()].copy_from_slice(key);

        // Phase 1: expand to 128 bytes.
        let t = key.len();
        for i in t..128 {
            l[i] = PITABLE[l[i - 1].wrapping_add(l[i - t]) as usize];
        }

        // Phase 2: reduce to the effective key length.
        let t8 = effective_bits.div_ceil(8);
        let tm = 0xffu8 >> (8 * t8 - effective_bits);
        l[128 - t8] = PITABLE[(l[128 - t8] & tm) as usize];
        for i in (0..128 - t8).rev() {
            l[i] = PITABLE[(l[i + 1] ^ l[i + t8]) as usize];
        }

        let mut expanded = [0u16; 64];
        for (i, word) in expanded.iter_mut().enumerate() {
            *word = u16::from_le_bytes([l[2 * i], l[2 * i + 1]]);
        }
        zeroize::Zeroize::zeroize(&mut l);

        Ok(Self { key: expanded })
    }

    /// Encrypt one 8-byte block.
    pub fn encrypt_block(&self, block: &[u8; BLOCK_SIZE]) -> [u8; BLOCK_SIZE] {
        let k = &self.key;
        let mut r = load(block);

        for i in 0..16 {
            let j = 4 * i;
            r[0] = r[0]
                .wrapping_add(k[j])
                .wrapping_add((r[3] & r[2]) | (!r[3] & r[1]))
                .rotate_left(1);
            r[1] = r[1]
                .wrapping_add(k[j + 1])
                .wrapping_add((r[0] & r[3]) | (!r[0] & r[2]))
                .rotate_left(2);
            r[2] = r[2]
                .wrapping_add(k[j + 2])
                .wrapping_add((r[1] & r[0]) | (!r[1] & r[3]))
                .rotate_left(3);
            r[3] = r[3]
                .wrapping_add(k[j + 3])
                .wrapping_add((r[2] & r[1]) | (!r[2] & r[0]))
                .rotate_left(5);

            // mashing rounds follow mixing rounds 5 and 11
            if i == 4 || i == 10 {
                r[0] = r[0].wrapping_add(k[(r[3] & 63) as usize]);
                r[1] = r[1].wrapping_add(k[(r[0] & 63) as usize]);
                r[2] = r[2].wrapping_add(k[(r[1] & 63) as usize]);
                r[3] = r[3].wrapping_add(k[(r[2] & 63) as usize]);
            }
        }

        store(&r)
    }

    /// Decrypt one 8-byte block.
    pub fn decrypt_block(&self, block: &[u8; BLOCK_SIZE]) -> [u8; BLOCK_SIZE] {
        let k = &self.key;
        let mut r = load(block);

        for i in (0..16).rev() {
            let j = 4 * i;
            r[3] = r[3]
                .rotate_right(5)
                .wrapping_sub(k[j + 3])
                .wrapping_sub((r[2] & r[1]) | (!r[2] & r[0]));
            r[2] = r[2]
                .rotate_right(3)
                .wrapping_sub(k[j + 2])
                .wrapping_sub((r[1] & r[0]) | (!r[1] & r[3]));
            r[1] = r[1]
                .rotate_right(2)
                .wrapping_sub(k[j + 1])
                .wrapping_sub((r[0] & r[3]) | (!r[0] & r[2]));
            r[0] = r[0]
                .rotate_right(1)
                .wrapping_sub(k[j])
                .wrapping_sub((r[3] & r[2]) | (!r[3] & r[1]));

            if i == 5 || i == 11 {
                r[3] = r[3].wrapping_sub(k[(r[2] & 63) as usize]);
                r[2] = r[2].wrapping_sub(k[(r[1] & 63) as usize]);
                r[1] = r[1].wrapping_sub(k[(r[0] & 63) as usize]);
                r[0] = r[0].wrapping_sub(k[(r[3] & 63) as usize]);
            }
        }

        store(&r)
    }

    /// Encrypt every 8-byte block of `data` independently (ECB).
    ///
    /// A trailing partial block is zero-extended.
    pub fn encrypt_ecb(&self, data: &[u8]) -> Vec<u8> {
        self.ecb(data, Self::encrypt_block)
    }

    /// Decrypt every 8-byte block of `data` independently (ECB).
    ///
    /// A trailing partial block is zero-extended.
    pub fn decrypt_ecb(&self, data: &[u8]) -> Vec<u8> {
        self.ecb(data, Self::decrypt_block)
    }

    fn ecb(&self, data: &[u8], f: fn(&Self, &[u8; BLOCK_SIZE]) -> [u8; BLOCK_SIZE]) -> Vec<u8> {
        let mut out = Vec::with_capacity(data.len().div_ceil(BLOCK_SIZE) * BLOCK_SIZE);
        for chunk in data.chunks(BLOCK_SIZE) {
            let mut block = [0u8; BLOCK_SIZE];
            block[..chunk.len()].copy_from_slice(chunk);
            out.extend_from_slice(&f(self, &block));
        }
        out
    }
}

impl std::fmt::Debug for Rc2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rc2").finish_non_exhaustive()
    }
}

#[inline]
fn load(block: &[u8; BLOCK_SIZE]) -> [u16; 4] {
    [
        u16::from_le_bytes([block[0], block[1]]),
        u16::from_le_bytes([block[2], block[3]]),
        u16::from_le_bytes([block[4], block[5]]),
        u16::from_le_bytes([block[6], block[7]]),
    ]
}

#[inline]
fn store(r: &[u16; 4]) -> [u8; BLOCK_SIZE] {
    let mut out = [0u8; BLOCK_SIZE];
    for (chunk, word) in out.chunks_exact_mut(2).zip(r) {
        chunk.copy_from_slice(&word.to_le_bytes());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unhex<const N: usize>(text: &str) -> [u8; N] {
        let mut out = [0u8; N];
        for (i, byte) in out.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&text[2 * i..2 * i + 2], 16).expect("hex");
        }
        out
    }

    fn check(key: &str, bits: usize, plaintext: &str, ciphertext: &str) {
        let key_bytes: Vec<u8> = (0..key.len() / 2)
            .map(|i| u8::from_str_radix(&key[2 * i..2 * i + 2], 16).expect("hex"))
            .collect();
        let rc2 = Rc2::new(&key_bytes, bits).expect("key");
        let pt: [u8; 8] = unhex(plaintext);
        let ct: [u8; 8] = unhex(ciphertext);
        assert_eq!(rc2.encrypt_block(&pt), ct);
        assert_eq!(rc2.decrypt_block(&ct), pt);
    }

    #[test]
    fn test_rfc2268_vectors() {
        check("0000000000000000", 63, "0000000000000000", "ebb773f993278eff");
        check("ffffffffffffffff", 64, "ffffffffffffffff", "278b27e42e2f0d49");
        check("3000000000000000", 64, "1000000000000001", "30649edf9be7d2c2");
        check(
            "88bca90e90875a7f0f79c384627bafb2",
            128,
            "0000000000000000",
            "2269552ab0f85ca6",
        );
    }

    #[test]
    fn test_legacy_key_shape() {
        // 128-bit key with 64 effective bits, as the legacy notes use.
        check(
            "88bca90e90875a7f0f79c384627bafb2",
            64,
            "0000000000000000",
            "1a807d272bbe5db1",
        );
    }

    #[test]
    fn test_ecb_zero_extends_partial_block() {
        let rc2 = Rc2::new(&[0x42; 16], 64).expect("key");
        let ct = rc2.encrypt_ecb(b"Hello, legacy!");
        assert_eq!(ct.len(), 16);
        let pt = rc2.decrypt_ecb(&ct);
        assert_eq!(&pt[..14], b"Hello, legacy!");
        assert_eq!(&pt[14..], &[0, 0]);
    }

    #[test]
    fn test_ecb_blocks_are_independent() {
        let rc2 = Rc2::new(&[7; 16], 64).expect("key");
        let ct = rc2.encrypt_ecb(&[0xAB; 16]);
        assert_eq!(ct[..8], ct[8..]);
    }

    #[test]
    fn test_invalid_parameters() {
        assert_eq!(
            Rc2::new(&[], 64).unwrap_err(),
            OxiNoteError::InvalidKeySize { bits: 0 }
        );
        assert!(Rc2::new(&[0; 129], 64).is_err());
        assert!(matches!(
            Rc2::new(&[0; 16], 0),
            Err(OxiNoteError::InvalidParameter { .. })
        ));
        assert!(Rc2::new(&[0; 16], 1025).is_err());
    }
}
