//! The current `ENC0` note container.
//!
//! ```text
//! "ENC0" | salt (16) | HMAC salt (16) | IV (16) | AES-CBC ciphertext | HMAC-SHA256 (32)
//! ```
//!
//! Two keys are stretched from the password with PBKDF2-HMAC-SHA256, one
//! per salt. The HMAC covers every byte before it and is checked before
//! anything is decrypted.

use crate::config::CurrentFormatConfig;
use oxinote_cipher::{Aes, Mode};
use oxinote_core::codec::{base64, bytes, utf8};
use oxinote_core::{BitArray, OxiNoteError, Result};
use oxinote_hash::{HmacSha256, pbkdf2_sha256};
use oxinote_random::RandomSource;
use tracing::debug;

/// An `ENC0` container split into its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enc0Blob {
    /// Salt for the encryption key.
    pub salt: Vec<u8>,
    /// Salt for the HMAC key.
    pub hmac_salt: Vec<u8>,
    /// CBC initialization vector.
    pub iv: Vec<u8>,
    /// AES-CBC ciphertext.
    pub ciphertext: Vec<u8>,
    /// HMAC-SHA256 over everything before it.
    pub tag: Vec<u8>,
}

impl Enc0Blob {
    /// Split raw container bytes.
    ///
    /// # Errors
    ///
    /// [`OxiNoteError::InvalidMagic`] without the magic prefix,
    /// [`OxiNoteError::Truncated`] if the framing does not fit.
    pub fn parse(config: &CurrentFormatConfig, data: &[u8]) -> Result<Self> {
        let magic_len = config.magic.len();
        if data.len() < magic_len || data[..magic_len] != config.magic {
            let found = &data[..data.len().min(magic_len)];
            return Err(OxiNoteError::invalid_magic(config.magic.to_vec(), found.to_vec()));
        }
        if data.len() < config.min_len() {
            return Err(OxiNoteError::truncated(config.min_len(), data.len()));
        }

        let field = config.field_len();
        let tag_start = data.len() - config.tag_len();
        let mut cursor = magic_len;
        let mut take = |len: usize| {
            let out = data[cursor..cursor + len].to_vec();
            cursor += len;
            out
        };
        let salt = take(field);
        let hmac_salt = take(field);
        let iv = take(field);
        let ciphertext = take(tag_start - config.header_len());

        Ok(Self {
            salt,
            hmac_salt,
            iv,
            ciphertext,
            tag: data[tag_start..].to_vec(),
        })
    }

    /// Serialize back to container bytes.
    pub fn to_bytes(&self, config: &CurrentFormatConfig) -> Vec<u8> {
        let mut out = self.signed_bytes(config);
        out.extend_from_slice(&self.tag);
        out
    }

    /// The bytes covered by the HMAC.
    fn signed_bytes(&self, config: &CurrentFormatConfig) -> Vec<u8> {
        let mut out =
            Vec::with_capacity(config.header_len() + self.ciphertext.len() + self.tag.len());
        out.extend_from_slice(&config.magic);
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&self.hmac_salt);
        out.extend_from_slice(&self.iv);
        out.extend_from_slice(&self.ciphertext);
        out
    }
}

fn derive_key(config: &CurrentFormatConfig, password: &str, salt: &[u8]) -> Result<BitArray> {
    pbkdf2_sha256(password, &bytes::to_bits(salt), config.iterations, config.key_bits)
}

fn require_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(OxiNoteError::invalid_parameter("missing password"));
    }
    Ok(())
}

/// Decrypt a base64 `ENC0` container with the standard parameters.
pub fn decrypt(password: &str, blob: &str) -> Result<String> {
    decrypt_with_config(&CurrentFormatConfig::STANDARD, password, blob)
}

/// Decrypt a base64 `ENC0` container.
///
/// # Errors
///
/// [`OxiNoteError::InvalidEncoding`] for bad base64 or UTF-8, framing
/// errors as for [`Enc0Blob::parse`], [`OxiNoteError::InvalidParameter`]
/// for an empty password, [`OxiNoteError::BadPassword`] if the HMAC does
/// not verify, and CBC errors from decryption.
pub fn decrypt_with_config(
    config: &CurrentFormatConfig,
    password: &str,
    blob: &str,
) -> Result<String> {
    let data = bytes::from_bits(&base64::decode(blob)?);
    let parsed = Enc0Blob::parse(config, &data)?;
    require_password(password)?;

    let hmac_key = derive_key(config, password, &parsed.hmac_salt)?;
    let expected = HmacSha256::new(&hmac_key).mac(&bytes::to_bits(&parsed.signed_bytes(config)));
    if !expected.equal(&bytes::to_bits(&parsed.tag)) {
        debug!("enc0 hmac mismatch");
        return Err(OxiNoteError::BadPassword);
    }
    debug!(ciphertext = parsed.ciphertext.len(), "enc0 hmac verified");

    let key = derive_key(config, password, &parsed.salt)?;
    let plaintext = Mode::Cbc.decrypt(
        &Aes::new(&key)?,
        &bytes::to_bits(&parsed.ciphertext),
        &bytes::to_bits(&parsed.iv),
        &BitArray::new(),
        0,
    )?;
    utf8::from_bits(&plaintext)
}

/// Encrypt into a base64 `ENC0` container with the standard parameters.
pub fn encrypt<R: RandomSource + ?Sized>(
    password: &str,
    plaintext: &str,
    rng: &mut R,
) -> Result<String> {
    encrypt_with_config(&CurrentFormatConfig::STANDARD, password, plaintext, rng)
}

/// Encrypt into a base64 `ENC0` container with fresh salts and IV.
///
/// # Errors
///
/// [`OxiNoteError::InvalidParameter`] for an empty password,
/// [`OxiNoteError::GeneratorNotSeeded`] if `rng` is not ready.
pub fn encrypt_with_config<R: RandomSource + ?Sized>(
    config: &CurrentFormatConfig,
    password: &str,
    plaintext: &str,
    rng: &mut R,
) -> Result<String> {
    require_password(password)?;
    let words = config.key_bits / 32;
    let salt = bytes::from_bits(&rng.random_bits(words, Some(0))?);
    let hmac_salt = bytes::from_bits(&rng.random_bits(words, Some(0))?);
    let iv = bytes::from_bits(&rng.random_bits(words, Some(0))?);

    let key = derive_key(config, password, &salt)?;
    let ciphertext = Mode::Cbc.encrypt(
        &Aes::new(&key)?,
        &utf8::to_bits(plaintext),
        &bytes::to_bits(&iv),
        &BitArray::new(),
        0,
    )?;

    let mut blob = Enc0Blob {
        salt,
        hmac_salt,
        iv,
        ciphertext: bytes::from_bits(&ciphertext),
        tag: Vec::new(),
    };
    let hmac_key = derive_key(config, password, &blob.hmac_salt)?;
    let tag = HmacSha256::new(&hmac_key).mac(&bytes::to_bits(&blob.signed_bytes(config)));
    blob.tag = bytes::from_bits(&tag);

    Ok(base64::encode(&bytes::to_bits(&blob.to_bytes(config))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxinote_random::{Prng, PrngConfig};

    const FAST: CurrentFormatConfig = CurrentFormatConfig {
        iterations: 1000,
        ..CurrentFormatConfig::STANDARD
    };

    // "Café ☃ note" under "correct horse", 1000 iterations, salts 00..0f and
    // 10..1f, IV 20..2f.
    const FAST_BLOB: &str = "RU5DMAABAgMEBQYHCAkKCwwNDg8QERITFBUWFxgZGhscHR4fICEiIyQlJicoKSorLC0uL8eHt\
        scJMeXCowrO0ym1b9C5hXwzqxQr9IqL/CpRsghWKX/XqJraOQFdk5v22A6HlA==";

    fn rng() -> Prng {
        let mut prng = Prng::with_seed(PrngConfig::STANDARD, 21);
        prng.add_entropy(vec![0x2468_ace0; 8], Some(256), "test");
        prng
    }

    #[test]
    fn test_decrypt_known_blob() {
        assert_eq!(
            decrypt_with_config(&FAST, "correct horse", FAST_BLOB).expect("decrypt"),
            "Caf\u{e9} \u{2603} note"
        );
    }

    #[test]
    fn test_wrong_password() {
        assert_eq!(
            decrypt_with_config(&FAST, "correct horsf", FAST_BLOB),
            Err(OxiNoteError::BadPassword)
        );
    }

    #[test]
    fn test_parse_fields() {
        let data = bytes::from_bits(&base64::decode(FAST_BLOB).expect("base64"));
        let blob = Enc0Blob::parse(&FAST, &data).expect("parse");
        assert_eq!(blob.salt, (0u8..16).collect::<Vec<_>>());
        assert_eq!(blob.hmac_salt, (16u8..32).collect::<Vec<_>>());
        assert_eq!(blob.iv, (32u8..48).collect::<Vec<_>>());
        assert_eq!(blob.ciphertext.len(), 16);
        assert_eq!(blob.tag.len(), 32);
        assert_eq!(blob.to_bytes(&FAST), data);
    }

    #[test]
    fn test_framing_errors() {
        assert!(matches!(
            Enc0Blob::parse(&FAST, b"ENC1aaaaaaaa"),
            Err(OxiNoteError::InvalidMagic { .. })
        ));
        assert!(matches!(
            Enc0Blob::parse(&FAST, b"EN"),
            Err(OxiNoteError::InvalidMagic { .. })
        ));
        assert_eq!(
            Enc0Blob::parse(&FAST, &[b'E', b'N', b'C', b'0', 0, 0]),
            Err(OxiNoteError::truncated(84, 6))
        );
    }

    #[test]
    fn test_empty_password_rejected() {
        assert!(matches!(
            decrypt_with_config(&FAST, "", FAST_BLOB),
            Err(OxiNoteError::InvalidParameter { .. })
        ));
        assert!(matches!(
            encrypt_with_config(&FAST, "", "x", &mut rng()),
            Err(OxiNoteError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_roundtrip() {
        let mut rng = rng();
        for text in ["", "short", "exactly 16 bytes", "a longer note spanning several blocks"] {
            let blob = encrypt_with_config(&FAST, "pw", text, &mut rng).expect("encrypt");
            assert_eq!(decrypt_with_config(&FAST, "pw", &blob).expect("decrypt"), text);
        }
    }
}
