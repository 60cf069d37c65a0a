//! Galois/counter mode (NIST SP 800-38D).
//!
//! CTR-mode encryption authenticated with GHASH, a polynomial hash over
//! GF(2^128) keyed by `H = E(0^128)`. A 96-bit IV is used directly as the
//! counter prefix; any other length is first compressed with GHASH.

use super::{block_at, check_tag_bits, require_bytes, split_tag, xor};
use oxinote_core::{BitArray, Block, BlockCipher, OxiNoteError, Result};

const MODE: &str = "gcm";

/// Reduction constant for `x^128 + x^7 + x^2 + x + 1` in GCM's reflected bit order.
const R: u128 = 0xe1 << 120;

#[inline]
fn to_u128(block: &Block) -> u128 {
    (block[0] as u128) << 96
        | (block[1] as u128) << 64
        | (block[2] as u128) << 32
        | block[3] as u128
}

#[inline]
fn from_u128(x: u128) -> Block {
    [(x >> 96) as u32, (x >> 64) as u32, (x >> 32) as u32, x as u32]
}

/// Multiply in GF(2^128) without branching on either operand.
fn gf_mul(x: u128, y: u128) -> u128 {
    let mut z = 0u128;
    let mut v = y;
    for i in 0..128 {
        let bit = (x >> (127 - i)) & 1;
        z ^= v & bit.wrapping_neg();
        let lsb = v & 1;
        v = (v >> 1) ^ (R & lsb.wrapping_neg());
    }
    z
}

/// Absorb `data`, zero-padded to whole blocks, into the running hash `y`.
fn ghash(h: u128, mut y: u128, data: &BitArray) -> u128 {
    for i in (0..data.word_len()).step_by(4) {
        y = gf_mul(y ^ to_u128(&block_at(data, i)), h);
    }
    y
}

fn length_block(a_bits: usize, c_bits: usize) -> BitArray {
    let a = a_bits as u64;
    let c = c_bits as u64;
    BitArray::from([(a >> 32) as u32, a as u32, (c >> 32) as u32, c as u32])
}

/// Shared keystream and tag computation.
///
/// When `encrypting`, the tag covers the output; otherwise it covers the
/// input ciphertext.
fn ctr_mode<C: BlockCipher>(
    encrypting: bool,
    cipher: &C,
    data: &BitArray,
    adata: &BitArray,
    iv: &BitArray,
    tag_bits: usize,
) -> (BitArray, BitArray) {
    let h = to_u128(&cipher.encrypt_block(&[0; 4]));

    let j0: Block = if iv.bit_length() == 96 {
        [iv.word(0), iv.word(1), iv.word(2), 1]
    } else {
        let y = ghash(h, 0, iv);
        from_u128(ghash(h, y, &length_block(0, iv.bit_length())))
    };

    let s0 = ghash(h, 0, adata);
    let mut tag = if encrypting { s0 } else { ghash(h, s0, data) };

    let mut ctr = j0;
    let mut words = data.words().to_vec();
    for chunk in words.chunks_mut(4) {
        ctr[3] = ctr[3].wrapping_add(1);
        let keystream = cipher.encrypt_block(&ctr);
        for (w, k) in chunk.iter_mut().zip(keystream) {
            *w ^= k;
        }
    }
    let output = BitArray::with_bit_length(words, data.bit_length());

    if encrypting {
        tag = ghash(h, s0, &output);
    }
    tag = ghash(h, tag, &length_block(adata.bit_length(), data.bit_length()));
    let tag = xor(&from_u128(tag), &cipher.encrypt_block(&j0));

    (output, BitArray::from(tag).clamped(tag_bits))
}

fn check_iv(iv: &BitArray) -> Result<()> {
    if iv.is_empty() {
        return Err(OxiNoteError::invalid_iv("gcm iv must not be empty"));
    }
    Ok(())
}

/// Encrypt and authenticate, returning `ciphertext ‖ tag`.
///
/// # Errors
///
/// [`OxiNoteError::InvalidIv`] for an empty IV,
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
    require_bytes(plaintext, "gcm plaintext")?;

    let (data, tag) = ctr_mode(true, cipher, plaintext, adata, iv, tag_bits);
    Ok(data.concat(&tag))
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

    let (plaintext, expected) = ctr_mode(false, cipher, &body, adata, iv, tag_bits);
    if !tag.equal(&expected) {
        return Err(OxiNoteError::corrupt_tag(MODE));
    }
    Ok(plaintext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aes::Aes;
    use oxinote_core::codec::{bytes, hex};

    const PANGRAM: &[u8] = b"The quick brown fox jumps over the lazy dog";

    fn aes() -> Aes {
        Aes::new(&hex::to_bits("000102030405060708090a0b0c0d0e0f").expect("hex")).expect("key")
    }

    fn iv16() -> BitArray {
        hex::to_bits("0f0e0d0c0b0a09080706050403020100").expect("hex")
    }

    #[test]
    fn test_nist_test_cases_1_and_2() {
        let aes = Aes::new(&BitArray::from_words(vec![0; 4])).expect("key");
        let iv = BitArray::from_words(vec![0; 3]);

        let tag = encrypt(&aes, &BitArray::new(), &iv, &BitArray::new(), 128).expect("encrypt");
        assert_eq!(hex::from_bits(&tag), "58e2fccefa7e3061367f1d57a4e7455a");

        let ct = encrypt(&aes, &BitArray::from_words(vec![0; 4]), &iv, &BitArray::new(), 128)
            .expect("encrypt");
        assert_eq!(
            hex::from_bits(&ct),
            "0388dace60b6a392f328c2b971b2fe78ab6e47d42cec13bdf53a67b21257bddf"
        );
    }

    #[test]
    fn test_known_answer_96_bit_iv() {
        let iv = iv16().bit_slice(0, 96);
        let pt = bytes::to_bits(PANGRAM);
        let adata = bytes::to_bits(b"header");
        let ct = encrypt(&aes(), &pt, &iv, &adata, 128).expect("encrypt");
        assert_eq!(
            hex::from_bits(&ct),
            "760cb07ebd4b55000e07a4ca6e7a9c547ac3394f2a3451b3209e7b1ab20fb0e8\
             3df45da93c7f5691586125c72b7eb37e5e03aa7fa6c8f4f9a43246"
        );
        assert_eq!(decrypt(&aes(), &ct, &iv, &adata, 128).expect("decrypt"), pt);
    }

    #[test]
    fn test_known_answer_128_bit_iv() {
        let pt = bytes::to_bits(PANGRAM);
        let ct = encrypt(&aes(), &pt, &iv16(), &BitArray::new(), 128).expect("encrypt");
        assert_eq!(
            hex::from_bits(&ct),
            "cacd261a8b88c5c1c717090105932f72c59780d5b90dbcd30b9e5e03b7f342c2\
             ee4f815026b7811f3758c3403a9599c573e464b21887aa4f1f7f74"
        );
    }

    #[test]
    fn test_truncated_tag() {
        let pt = bytes::to_bits(PANGRAM);
        let full = encrypt(&aes(), &pt, &iv16(), &BitArray::new(), 128).expect("encrypt");
        let short = encrypt(&aes(), &pt, &iv16(), &BitArray::new(), 64).expect("encrypt");
        assert_eq!(short, full.bit_slice(0, full.bit_length() - 64));
        assert_eq!(decrypt(&aes(), &short, &iv16(), &BitArray::new(), 64).expect("decrypt"), pt);
    }

    #[test]
    fn test_tamper_detection() {
        let pt = bytes::to_bits(PANGRAM);
        let adata = bytes::to_bits(b"header");
        let ct = bytes::from_bits(&encrypt(&aes(), &pt, &iv16(), &adata, 96).expect("encrypt"));
        for i in [0, 17, ct.len() - 12, ct.len() - 1] {
            let mut tampered = ct.clone();
            tampered[i] ^= 0x01;
            assert_eq!(
                decrypt(&aes(), &bytes::to_bits(&tampered), &iv16(), &adata, 96),
                Err(OxiNoteError::corrupt_tag("gcm"))
            );
        }
    }

    #[test]
    fn test_parameter_validation() {
        let pt = bytes::to_bits(b"x");
        assert!(matches!(
            encrypt(&aes(), &pt, &BitArray::new(), &BitArray::new(), 128),
            Err(OxiNoteError::InvalidIv { .. })
        ));
        assert!(matches!(
            encrypt(&aes(), &pt, &iv16(), &BitArray::new(), 20),
            Err(OxiNoteError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_gf_mul_identity() {
        // The multiplicative identity has only its leftmost bit set.
        let one = 1u128 << 127;
        let x = 0x0123_4567_89ab_cdef_fedc_ba98_7654_3210u128;
        assert_eq!(gf_mul(x, one), x);
        assert_eq!(gf_mul(one, x), x);
        assert_eq!(gf_mul(x, 0), 0);
    }
}
