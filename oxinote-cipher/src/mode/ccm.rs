//! CCM mode (NIST SP 800-38C, RFC 3610).
//!
//! The nonce is the IV truncated to `15 - L` bytes, where `L`, the width
//! of the length and counter fields, is the smallest of 2..=4 bytes that
//! holds the message length, or larger when the IV is shorter than
//! `15 - L` bytes. IVs longer than 13 bytes are therefore accepted and
//! truncated.

use super::{block_at, require_bytes, split_tag, xor};
use oxinote_core::{BitArray, Block, BlockCipher, OxiNoteError, Result};

const MODE: &str = "ccm";

fn check_tag_bits(tag_bits: usize) -> Result<()> {
    if tag_bits % 16 != 0 || !(32..=128).contains(&tag_bits) {
        return Err(OxiNoteError::invalid_parameter(format!(
            "ccm: invalid tag length {tag_bits}"
        )));
    }
    Ok(())
}

/// Work out `L` and the truncated nonce for a message of `len` bytes.
fn nonce_and_width(iv: &BitArray, len: usize) -> Result<(BitArray, usize)> {
    let iv_bits = iv.bit_length();
    if iv_bits % 8 != 0 || iv_bits < 56 {
        return Err(OxiNoteError::invalid_iv("ccm: iv must be at least 7 bytes"));
    }
    if len > u32::MAX as usize {
        return Err(OxiNoteError::invalid_parameter("ccm: message too long"));
    }

    let mut l = 2;
    while l < 4 && len >> (8 * l) != 0 {
        l += 1;
    }
    l = l.max(15usize.saturating_sub(iv_bits / 8));

    Ok((iv.bit_slice(0, 8 * (15 - l)), l))
}

/// CBC-MAC over `B0`, the length-prefixed associated data and the
/// plaintext, truncated to `tag_bits`.
fn compute_tag<C: BlockCipher>(
    cipher: &C,
    plaintext: &BitArray,
    nonce: &BitArray,
    adata: &BitArray,
    tag_bits: usize,
    l: usize,
) -> Result<BitArray> {
    let tag_bytes = (tag_bits / 8) as u32;
    let adata_flag = if adata.is_empty() { 0 } else { 0x40 };
    let flags = adata_flag | ((tag_bytes - 2) << 2) | (l as u32 - 1);

    let mut b0 = BitArray::partial(8, flags);
    b0.append(nonce);
    let mut first = block_at(&b0, 0);
    first[3] |= (plaintext.bit_length() / 8) as u32;
    let mut mac = cipher.encrypt_block(&first);

    if !adata.is_empty() {
        let adata_len = adata.bit_length() / 8;
        let mut mac_data = if adata_len <= 0xfeff {
            BitArray::partial(16, adata_len as u32)
        } else if let Ok(len) = u32::try_from(adata_len) {
            let mut prefix = BitArray::partial(16, 0xfffe);
            prefix.push_word(len);
            prefix
        } else {
            return Err(OxiNoteError::invalid_parameter(
                "ccm: associated data too long",
            ));
        };
        mac_data.append(adata);
        for i in (0..mac_data.word_len()).step_by(4) {
            mac = cipher.encrypt_block(&xor(&mac, &block_at(&mac_data, i)));
        }
    }

    for i in (0..plaintext.word_len()).step_by(4) {
        mac = cipher.encrypt_block(&xor(&mac, &block_at(plaintext, i)));
    }

    Ok(BitArray::from(mac).clamped(tag_bits))
}

/// CTR-encrypt `data` and the tag. The same call decrypts.
fn ctr_mode<C: BlockCipher>(
    cipher: &C,
    data: &BitArray,
    nonce: &BitArray,
    tag: &BitArray,
    tag_bits: usize,
    l: usize,
) -> (BitArray, BitArray) {
    let mut a = BitArray::partial(8, l as u32 - 1);
    a.append(nonce);
    let mut ctr: Block = block_at(&a, 0);

    let s0 = cipher.encrypt_block(&ctr);
    let tag = BitArray::from(xor(&block_at(tag, 0), &s0)).clamped(tag_bits);

    let mut words = data.words().to_vec();
    for chunk in words.chunks_mut(4) {
        ctr[3] = ctr[3].wrapping_add(1);
        let keystream = cipher.encrypt_block(&ctr);
        for (w, k) in chunk.iter_mut().zip(keystream) {
            *w ^= k;
        }
    }

    (BitArray::with_bit_length(words, data.bit_length()), tag)
}

/// Encrypt and authenticate, returning `ciphertext ‖ tag`.
///
/// # Errors
///
/// [`OxiNoteError::InvalidIv`] for an IV shorter than 7 bytes,
/// [`OxiNoteError::InvalidParameter`] for a tag length outside
/// `{32, 48, ..., 128}` or input that is not whole bytes.
pub fn encrypt<C: BlockCipher>(
    cipher: &C,
    plaintext: &BitArray,
    iv: &BitArray,
    adata: &BitArray,
    tag_bits: usize,
) -> Result<BitArray> {
    check_tag_bits(tag_bits)?;
    require_bytes(plaintext, "ccm plaintext")?;
    require_bytes(adata, "ccm associated data")?;
    let (nonce, l) = nonce_and_width(iv, plaintext.bit_length() / 8)?;

    let tag = compute_tag(cipher, plaintext, &nonce, adata, tag_bits, l)?;
    let (data, tag) = ctr_mode(cipher, plaintext, &nonce, &tag, tag_bits, l);
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
    check_tag_bits(tag_bits)?;
    require_bytes(ciphertext, "ccm ciphertext")?;
    require_bytes(adata, "ccm associated data")?;
    let (body, tag) = split_tag(ciphertext, tag_bits, MODE)?;
    let (nonce, l) = nonce_and_width(iv, body.bit_length() / 8)?;

    let (plaintext, tag) = ctr_mode(cipher, &body, &nonce, &tag, tag_bits, l);
    let expected = compute_tag(cipher, &plaintext, &nonce, adata, tag_bits, l)?;
    if !tag.equal(&expected) {
        return Err(OxiNoteError::corrupt_tag(MODE));
    }
    Ok(plaintext)
}
