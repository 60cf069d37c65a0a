//! The legacy RC2 note container.
//!
//! ```text
//! base64( RC2-ECB( key = MD5(passphrase), CHECK(4 hex) | text | NUL padding ) )
//! ```
//!
//! Text and passphrase use a UTF-8 variant that encodes each UTF-16 unit
//! separately, so characters outside the BMP take six bytes. The check
//! value is the first four uppercase hex digits of the CRC-32 register over
//! everything after it, without the final inversion and without leading
//! zeros.

use crate::config::LegacyFormatConfig;
use oxinote_cipher::Rc2;
use oxinote_cipher::rc2::BLOCK_SIZE;
use oxinote_core::codec::{Base64, bytes};
use oxinote_core::{Crc32, OxiNoteError, Result};
use oxinote_hash::Md5;
use tracing::{debug, warn};
use zeroize::Zeroize;

/// Encode text the way the legacy client did: `\r\n` becomes `\n` and each
/// UTF-16 unit is written as one to three bytes.
pub fn encode_text(text: &str) -> Vec<u8> {
    let text = text.replace("\r\n", "\n");
    let mut out = Vec::with_capacity(text.len());
    for unit in text.encode_utf16() {
        let c = unit as u32;
        if c < 0x80 {
            out.push(c as u8);
        } else if c < 0x800 {
            out.push(((c >> 6) | 0xc0) as u8);
            out.push(((c & 0x3f) | 0x80) as u8);
        } else {
            out.push(((c >> 12) | 0xe0) as u8);
            out.push((((c >> 6) & 0x3f) | 0x80) as u8);
            out.push(((c & 0x3f) | 0x80) as u8);
        }
    }
    out
}

/// Decode bytes produced by [`encode_text`].
///
/// Never fails: lead bytes of four-byte sequences are read as three-byte
/// leads, missing continuation bytes count as zero, and unpaired
/// surrogates become U+FFFD.
pub fn decode_text(data: &[u8]) -> String {
    let at = |i: usize| data.get(i).copied().unwrap_or(0) as u16;
    let mut units = Vec::with_capacity(data.len());
    let mut i = 0;
    while i < data.len() {
        let c = data[i] as u16;
        if c < 0x80 {
            units.push(c);
            i += 1;
        } else if (0xc0..0xe0).contains(&c) {
            units.push(((c & 0x1f) << 6) | (at(i + 1) & 0x3f));
            i += 2;
        } else {
            units.push(((c & 0x0f) << 12) | ((at(i + 1) & 0x3f) << 6) | (at(i + 2) & 0x3f));
            i += 3;
        }
    }
    String::from_utf16_lossy(&units)
}

/// Decode base64, dropping characters outside the standard alphabet.
fn decode_base64(blob: &str) -> Result<Vec<u8>> {
    let engine = Base64::STANDARD;
    let kept: String = blob
        .chars()
        .filter(|&c| engine.is_alphabet_char(c) || c == '=')
        .collect();
    let dropped = blob.chars().filter(|c| !c.is_whitespace()).count()
        - kept.chars().count();
    if dropped > 0 {
        warn!(dropped, "ignoring non-base64 characters in legacy note");
    }
    Ok(bytes::from_bits(&engine.decode(&kept)?))
}

/// Check value over `payload` as the legacy client wrote it.
fn check_value(config: &LegacyFormatConfig, payload: &[u8]) -> String {
    let mut crc = Crc32::new();
    crc.update(payload);
    let mut hex = format!("{:X}", crc.register());
    hex.truncate(config.check_digits);
    hex
}

fn cipher(config: &LegacyFormatConfig, passphrase: &str) -> Result<Rc2> {
    let mut secret = encode_text(passphrase);
    let mut key = Md5::digest(&secret);
    secret.zeroize();
    let rc2 = Rc2::new(&key, config.effective_key_bits);
    key.zeroize();
    rc2
}

/// Decrypt a base64 legacy container with the standard parameters.
pub fn decrypt(passphrase: &str, blob: &str) -> Result<String> {
    decrypt_with_config(&LegacyFormatConfig::STANDARD, passphrase, blob)
}

/// Decrypt a base64 legacy container.
///
/// # Errors
///
/// [`OxiNoteError::BadPassword`] if the check value does not match, which
/// covers both a wrong passphrase and a damaged container.
pub fn decrypt_with_config(
    config: &LegacyFormatConfig,
    passphrase: &str,
    blob: &str,
) -> Result<String> {
    let ciphertext = decode_base64(blob)?;
    let mut plain = cipher(config, passphrase)?.decrypt_ecb(&ciphertext);

    let split = config.check_digits.min(plain.len());
    let (stored, payload) = plain.split_at(split);
    let matches = check_value(config, payload).as_bytes() == stored;
    if !matches {
        plain.zeroize();
        debug!("legacy check value mismatch");
        return Err(OxiNoteError::BadPassword);
    }

    let end = payload.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    let text = decode_text(&payload[..end]);
    plain.zeroize();
    Ok(text)
}

/// Encrypt into a base64 legacy container with the standard parameters.
pub fn encrypt(passphrase: &str, text: &str) -> Result<String> {
    encrypt_with_config(&LegacyFormatConfig::STANDARD, passphrase, text)
}

/// Encrypt into a base64 legacy container.
///
/// The payload is NUL-padded so the container fills whole RC2 blocks. A
/// check register with fewer hex digits than the check field could never
/// verify, so another block of padding is added until it does.
pub fn encrypt_with_config(
    config: &LegacyFormatConfig,
    passphrase: &str,
    text: &str,
) -> Result<String> {
    let mut payload = encode_text(text);
    let pad = (BLOCK_SIZE - (config.check_digits + payload.len()) % BLOCK_SIZE) % BLOCK_SIZE;
    payload.resize(payload.len() + pad, 0);
    let check = loop {
        let check = check_value(config, &payload);
        if check.len() == config.check_digits {
            break check;
        }
        payload.resize(payload.len() + BLOCK_SIZE, 0);
    };

    let mut plain = check.into_bytes();
    plain.append(&mut payload);
    let ciphertext = cipher(config, passphrase)?.encrypt_ecb(&plain);
    plain.zeroize();
    Ok(Base64::STANDARD.encode(&bytes::to_bits(&ciphertext)))
}
