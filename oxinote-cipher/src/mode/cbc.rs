//! CBC mode with PKCS#7 padding.
//!
//! Unauthenticated: associated data is rejected, and callers must verify
//! integrity separately (the current note container does so with
//! HMAC-SHA256 before decrypting).

use super::{block_at, require_bytes, xor};
use crate::aes::to_block;
use oxinote_core::{BitArray, BlockCipher, OxiNoteError, Result};

fn check(iv: &BitArray, adata: &BitArray) -> Result<()> {
    if !adata.is_empty() {
        return Err(OxiNoteError::not_supported("cbc can't authenticate data"));
    }
    if iv.bit_length() != 128 {
        return Err(OxiNoteError::invalid_iv("cbc iv must be 128 bits"));
    }
    Ok(())
}

/// Pad and encrypt. The output is always at least one block longer than
/// the whole blocks of the input.
///
/// # Errors
///
/// [`OxiNoteError::NotSupported`] if `adata` is non-empty,
/// [`OxiNoteError::InvalidIv`] unless the IV is 128 bits,
/// [`OxiNoteError::InvalidParameter`] if the plaintext is not whole bytes.
pub fn encrypt<C: BlockCipher>(
    cipher: &C,
    plaintext: &BitArray,
    iv: &BitArray,
    adata: &BitArray,
) -> Result<BitArray> {
    check(iv, adata)?;
    require_bytes(plaintext, "cbc plaintext")?;

    let bl = plaintext.bit_length();
    let full_blocks = bl / 128;
    let mut chain = to_block(iv)?;
    let mut out = Vec::with_capacity((full_blocks + 1) * 4);

    for i in 0..full_blocks {
        chain = cipher.encrypt_block(&xor(&chain, &block_at(plaintext, 4 * i)));
        out.extend_from_slice(&chain);
    }

    // 1..=16 bytes of padding, each holding the pad length
    let pad = (16 - ((bl >> 3) & 15)) as u32 * 0x0101_0101;
    let mut last = plaintext.tail(full_blocks * 128);
    last.append(&BitArray::from([pad; 4]));
    chain = cipher.encrypt_block(&xor(&chain, &block_at(&last, 0)));
    out.extend_from_slice(&chain);

    Ok(BitArray::from_words(out))
}

/// Decrypt and strip the padding.
///
/// # Errors
///
/// Parameter errors as for [`encrypt`]; [`OxiNoteError::InvalidBlockSize`]
/// unless the ciphertext is a positive multiple of 128 bits;
/// [`OxiNoteError::CorruptPadding`] if the padding does not verify.
pub fn decrypt<C: BlockCipher>(
    cipher: &C,
    ciphertext: &BitArray,
    iv: &BitArray,
    adata: &BitArray,
) -> Result<BitArray> {
    check(iv, adata)?;
    let len = ciphertext.bit_length();
    if len == 0 || len % 128 != 0 {
        return Err(OxiNoteError::InvalidBlockSize { bits: len });
    }

    let mut chain = to_block(iv)?;
    let mut out = Vec::with_capacity(ciphertext.word_len());
    for i in (0..ciphertext.word_len()).step_by(4) {
        let block = block_at(ciphertext, i);
        out.extend_from_slice(&xor(&chain, &cipher.decrypt_block(&block)));
        chain = block;
    }

    let pad_len = check_padding(&out)?;
    Ok(BitArray::from_words(out).clamped(len - pad_len * 8))
}

/// Validate PKCS#7 padding over the final block, returning the pad length.
///
/// Every byte of the final block is examined whatever the pad value, and
/// the outcome is folded into a single flag.
fn check_padding(words: &[u32]) -> Result<usize> {
    let n = words.len();
    let last_block = &words[n - 4..];
    let pad = words[n - 1] & 0xff;

    // non-zero when pad is 0 or greater than 16
    let mut bad = pad.wrapping_sub(1) >> 4;
    for k in 0..16u32 {
        let word = last_block[3 - (k / 4) as usize];
        let byte = (word >> (8 * (k % 4))) & 0xff;
        // all ones when k < pad
        let in_pad = 0u32.wrapping_sub(k.wrapping_sub(pad) >> 31);
        bad |= (byte ^ pad) & in_pad;
    }

    if bad != 0 {
        return Err(OxiNoteError::CorruptPadding);
    }
    Ok(pad as usize)
}
