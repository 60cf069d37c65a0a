//! OCB 2.0 authenticated encryption.
//!
//! XEX-style: each full block is whitened with an offset that is doubled
//! in GF(2^128) per block; the final (possibly partial) block is encrypted
//! with a pad derived from the offset and its bit length. Associated data
//! is authenticated with PMAC and folded into the tag.

use super::{block_at, check_tag_bits, require_bytes, split_tag, xor};
use crate::aes::to_block;
use oxinote_core::{BitArray, Block, BlockCipher, OxiNoteError, Result};

const MODE: &str = "ocb2";

/// Doubling in GF(2^128): shift left one bit, reducing with 0x87.
#[inline]
fn times2(x: &Block) -> Block {
    [
        (x[0] << 1) ^ (x[1] >> 31),
        (x[1] << 1) ^ (x[2] >> 31),
        (x[2] << 1) ^ (x[3] >> 31),
        (x[3] << 1) ^ ((x[0] >> 31) * 0x87),
    ]
}

fn check_iv(iv: &BitArray) -> Result<()> {
    if iv.bit_length() != 128 {
        return Err(OxiNoteError::invalid_iv("ocb iv must be 128 bits"));
    }
    Ok(())
}

/// PMAC over the associated data.
pub fn pmac<C: BlockCipher>(cipher: &C, adata: &BitArray) -> Block {
    let mut checksum = [0u32; 4];
    let mut delta = cipher.encrypt_block(&[0; 4]);
    delta = xor(&delta, &times2(&times2(&delta)));

    let mut i = 0;
    while i + 4 < adata.word_len() {
        delta = times2(&delta);
        checksum = xor(&checksum, &cipher.encrypt_block(&xor(&delta, &block_at(adata, i))));
        i += 4;
    }

    let mut last = adata.tail(i * 32);
    if last.bit_length() < 128 {
        delta = xor(&delta, &times2(&delta));
        last.push_word(0x8000_0000);
    }
    checksum = xor(&checksum, &block_at(&last, 0));
    cipher.encrypt_block(&xor(&times2(&xor(&delta, &times2(&delta))), &checksum))
}

/// Finish the tag from the checksum and the final offset.
fn finish_tag<C: BlockCipher>(
    cipher: &C,
    checksum: &Block,
    delta: &Block,
    adata: &BitArray,
    tag_bits: usize,
) -> BitArray {
    let mut tag = cipher.encrypt_block(&xor(checksum, &xor(delta, &times2(delta))));
    if !adata.is_empty() {
        tag = xor(&tag, &pmac(cipher, adata));
    }
    BitArray::from(tag).clamped(tag_bits)
}

/// Encrypt and authenticate, returning `ciphertext ‖ tag`.
///
/// # Errors
///
/// [`OxiNoteError::InvalidIv`] unless the IV is 128 bits,
/// [`OxiNoteError::InvalidParameter`] for a tag length that is not whole
/// bytes between 32 and 128 bits, or a plaintext that is not whole bytes.
pub fn encrypt<C: BlockCipher>(
    cipher: &C,
    plaintext: &BitArray,
    iv: &BitArray,
    adata: &BitArray,
    tag_bits: usize,
) -> Result<BitArray> {
    check_iv(iv)?;
    check_tag_bits(tag_bits, MODE)?;
    require_bytes(plaintext, "ocb2 plaintext")?;

    let mut checksum = [0u32; 4];
    let mut delta = times2(&cipher.encrypt_block(&to_block(iv)?));
    let mut output = Vec::with_capacity(plaintext.word_len() + 4);

    let mut i = 0;
    while i + 4 < plaintext.word_len() {
        let block = block_at(plaintext, i);
        checksum = xor(&checksum, &block);
        output.extend_from_slice(&xor(&delta, &cipher.encrypt_block(&xor(&delta, &block))));
        delta = times2(&delta);
        i += 4;
    }

    let last = plaintext.tail(i * 32);
    let bl = last.bit_length();
    let pad = cipher.encrypt_block(&xor(&delta, &[0, 0, 0, bl as u32]));
    let last = BitArray::from(xor(&block_at(&last, 0), &pad)).clamped(bl);
    checksum = xor(&checksum, &xor(&block_at(&last, 0), &pad));

    let tag = finish_tag(cipher, &checksum, &delta, adata, tag_bits);

    let mut out = BitArray::from_words(output);
    out.append(&last);
    out.append(&tag);
    Ok(out)
}

/// Decrypt and verify `ciphertext ‖ tag`.
///
/// # Errors
///
/// Parameter errors as for [`encrypt`];
/// [`OxiNoteError::CorruptTag`] if the tag does not verify.
pub fn decrypt<C: BlockCipher>(
    cipher: &C,
    ciphertext: &BitArray,
    iv: &BitArray,
    adata: &BitArray,
    tag_bits: usize,
) -> Result<BitArray> {
    check_iv(iv)?;
    check_tag_bits(tag_bits, MODE)?;
    let (body, tag) = split_tag(ciphertext, tag_bits, MODE)?;
    let len = body.bit_length();

    let mut checksum = [0u32; 4];
    let mut delta = times2(&cipher.encrypt_block(&to_block(iv)?));
    let mut output = Vec::with_capacity(body.word_len());

    let mut i = 0;
    while (i + 4) * 32 < len {
        let block = xor(&delta, &cipher.decrypt_block(&xor(&delta, &block_at(&body, i))));
        checksum = xor(&checksum, &block);
        output.extend_from_slice(&block);
        delta = times2(&delta);
        i += 4;
    }

    let bl = len - i * 32;
    let pad = cipher.encrypt_block(&xor(&delta, &[0, 0, 0, bl as u32]));
    let last = xor(&pad, &block_at(&body.tail(i * 32), 0));
    checksum = xor(&checksum, &last);

    let expected = finish_tag(cipher, &checksum, &delta, adata, tag_bits);
    if !tag.equal(&expected) {
        return Err(OxiNoteError::corrupt_tag(MODE));
    }

    let mut out = BitArray::from_words(output);
    out.append(&BitArray::from(last).clamped(bl));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aes::Aes;
    use oxinote_core::codec::{bytes, hex};

    fn aes() -> Aes {
        Aes::new(&hex::to_bits("000102030405060708090a0b0c0d0e0f").expect("hex")).expect("key")
    }

    fn iv() -> BitArray {
        hex::to_bits("000102030405060708090a0b0c0d0e0f").expect("hex")
    }

    #[test]
    fn test_times2() {
        assert_eq!(times2(&[0, 0, 0, 1]), [0, 0, 0, 2]);
        assert_eq!(times2(&[0, 0, 0x8000_0000, 0]), [0, 1, 0, 0]);
        assert_eq!(times2(&[0x8000_0000, 0, 0, 0]), [0, 0, 0, 0x87]);
    }

    #[test]
    fn test_roundtrip_lengths() {
        let adata = bytes::to_bits(b"associated");
        for len in [0usize, 1, 15, 16, 17, 31, 32, 33, 100] {
            let pt = bytes::to_bits(&vec![0xa5; len]);
            for ad in [BitArray::new(), adata.clone()] {
                let ct = encrypt(&aes(), &pt, &iv(), &ad, 128).expect("encrypt");
                assert_eq!(ct.bit_length(), len * 8 + 128);
                assert_eq!(decrypt(&aes(), &ct, &iv(), &ad, 128).expect("decrypt"), pt);
            }
        }
    }

    #[test]
    fn test_ciphertext_differs_from_plaintext() {
        let pt = bytes::to_bits(&[0u8; 48]);
        let ct = encrypt(&aes(), &pt, &iv(), &BitArray::new(), 64).expect("encrypt");
        assert_ne!(ct.bit_slice(0, 384), pt);
    }

    #[test]
    fn test_tamper_detection() {
        let pt = bytes::to_bits(b"The quick brown fox jumps over the lazy dog");
        let adata = bytes::to_bits(b"header");
        let ct = bytes::from_bits(&encrypt(&aes(), &pt, &iv(), &adata, 64).expect("encrypt"));
        for i in [0, 16, 40, ct.len() - 8, ct.len() - 1] {
            let mut tampered = ct.clone();
            tampered[i] ^= 0x40;
            assert_eq!(
                decrypt(&aes(), &bytes::to_bits(&tampered), &iv(), &adata, 64),
                Err(OxiNoteError::corrupt_tag("ocb2"))
            );
        }
        let ct = bytes::to_bits(&ct);
        assert!(decrypt(&aes(), &ct, &iv(), &BitArray::new(), 64).is_err());
    }

    #[test]
    fn test_pmac_depends_on_every_block() {
        let a = bytes::to_bits(&[1u8; 40]);
        let mut raw = [1u8; 40];
        raw[39] = 2;
        let b = bytes::to_bits(&raw);
        assert_ne!(pmac(&aes(), &a), pmac(&aes(), &b));
        // A full final block is not padded, a partial one is.
        assert_ne!(
            pmac(&aes(), &bytes::to_bits(&[0u8; 16])),
            pmac(&aes(), &bytes::to_bits(&[0u8; 15]))
        );
    }

    #[test]
    fn test_requires_128_bit_iv() {
        let iv = iv().bit_slice(0, 96);
        assert!(matches!(
            encrypt(&aes(), &BitArray::new(), &iv, &BitArray::new(), 64),
            Err(OxiNoteError::InvalidIv { .. })
        ));
    }
}
