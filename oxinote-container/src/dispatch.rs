//! Format dispatch.
//!
//! Notes arrive tagged with the cipher that produced them. The dispatcher
//! routes `AES` to the `ENC0` container and `RC2` to the legacy container,
//! and folds every integrity failure into [`OxiNoteError::BadPassword`].

use crate::config::{CurrentFormatConfig, LegacyFormatConfig};
use crate::current::{self, Enc0Blob};
use crate::legacy;
use oxinote_core::codec::{base64, bytes, hex};
use oxinote_core::{OxiNoteError, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// The cipher tag carried alongside an encrypted note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CipherTag {
    /// Current `ENC0` container.
    Aes,
    /// Legacy RC2 container.
    Rc2,
}

impl CipherTag {
    /// The tag as written in notes.
    pub fn name(self) -> &'static str {
        match self {
            CipherTag::Aes => "AES",
            CipherTag::Rc2 => "RC2",
        }
    }

    /// Parse a tag, ignoring case.
    ///
    /// # Errors
    ///
    /// [`OxiNoteError::UnsupportedCipher`] for anything else.
    pub fn from_name(name: &str) -> Result<Self> {
        if name.eq_ignore_ascii_case("AES") {
            Ok(CipherTag::Aes)
        } else if name.eq_ignore_ascii_case("RC2") {
            Ok(CipherTag::Rc2)
        } else {
            Err(OxiNoteError::unsupported_cipher(name))
        }
    }

    /// Guess the tag of an untagged base64 note.
    ///
    /// Anything that decodes to the `ENC0` magic is `AES`; anything else is
    /// assumed to be legacy.
    pub fn sniff(blob: &str) -> Self {
        let magic = &CurrentFormatConfig::STANDARD.magic;
        match base64::decode(blob) {
            Ok(bits) if bytes::from_bits(&bits).starts_with(magic) => CipherTag::Aes,
            _ => CipherTag::Rc2,
        }
    }

    /// Typical key length in bits, as carried next to the tag.
    pub fn key_length(self) -> usize {
        match self {
            CipherTag::Aes => CurrentFormatConfig::STANDARD.key_bits,
            CipherTag::Rc2 => LegacyFormatConfig::STANDARD.effective_key_bits,
        }
    }
}

impl fmt::Display for CipherTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CipherTag {
    type Err = OxiNoteError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

/// Decrypt a tagged note.
///
/// `key_length_hint` is the length that accompanies the tag in stored
/// notes; both containers fix their own key sizes, so it is only logged.
///
/// # Errors
///
/// [`OxiNoteError::UnsupportedCipher`] for an unknown tag, checked before
/// any decoding; [`OxiNoteError::BadPassword`] for any integrity failure;
/// other container errors unchanged.
pub fn decrypt(
    tag: &str,
    key_length_hint: Option<usize>,
    password: &str,
    blob: &str,
) -> Result<String> {
    let tag = CipherTag::from_name(tag)?;
    decrypt_tagged(tag, key_length_hint, password, blob)
}

/// [`decrypt`] with an already parsed tag.
pub fn decrypt_tagged(
    tag: CipherTag,
    key_length_hint: Option<usize>,
    password: &str,
    blob: &str,
) -> Result<String> {
    debug!(%tag, key_length_hint, "decrypting note");
    let result = match tag {
        CipherTag::Aes => current::decrypt(password, blob),
        CipherTag::Rc2 => legacy::decrypt(password, blob),
    };
    result.map_err(|err| {
        if err.is_integrity_failure() {
            OxiNoteError::BadPassword
        } else {
            err
        }
    })
}

/// A description of a note container, without decrypting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inspection {
    /// Container format.
    pub format: CipherTag,
    /// Decoded size in bytes.
    pub size: usize,
    /// Encryption salt, hex.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,
    /// HMAC salt, hex.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hmac_salt: Option<String>,
    /// IV, hex.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iv: Option<String>,
    /// Ciphertext bytes, excluding framing.
    pub payload: usize,
    /// PBKDF2 iterations, if the format stretches the password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iterations: Option<u32>,
}

/// Describe a base64 note. The format is sniffed when `tag` is `None`.
///
/// # Errors
///
/// [`OxiNoteError::InvalidEncoding`] for bad base64; framing errors for
/// `AES` notes.
pub fn inspect(tag: Option<CipherTag>, blob: &str) -> Result<Inspection> {
    let format = tag.unwrap_or_else(|| CipherTag::sniff(blob));
    let to_hex = |data: &[u8]| hex::from_bits(&bytes::to_bits(data));

    match format {
        CipherTag::Aes => {
            let config = CurrentFormatConfig::STANDARD;
            let data = bytes::from_bits(&base64::decode(blob)?);
            let parsed = Enc0Blob::parse(&config, &data)?;
            Ok(Inspection {
                format,
                size: data.len(),
                salt: Some(to_hex(&parsed.salt)),
                hmac_salt: Some(to_hex(&parsed.hmac_salt)),
                iv: Some(to_hex(&parsed.iv)),
                payload: parsed.ciphertext.len(),
                iterations: Some(config.iterations),
            })
        }
        CipherTag::Rc2 => {
            let engine = base64::Base64::STANDARD;
            let kept: String = blob.chars().filter(|&c| engine.is_alphabet_char(c)).collect();
            let size = bytes::from_bits(&engine.decode(&kept)?).len();
            Ok(Inspection {
                format,
                size,
                salt: None,
                hmac_salt: None,
                iv: None,
                payload: size,
                iterations: None,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEGACY: &str = "WZ4q5r8oALWluehnJ9nxhQ==";

    #[test]
    fn test_tag_names() {
        assert_eq!(CipherTag::from_name("aes"), Ok(CipherTag::Aes));
        assert_eq!("Rc2".parse::<CipherTag>(), Ok(CipherTag::Rc2));
        assert_eq!(
            CipherTag::from_name("DES"),
            Err(OxiNoteError::unsupported_cipher("DES"))
        );
        assert_eq!(CipherTag::Aes.to_string(), "AES");
    }

    #[test]
    fn test_unknown_tag_never_decodes() {
        // Not base64 either; the tag is rejected first.
        assert_eq!(
            decrypt("blowfish", None, "pw", "%%%"),
            Err(OxiNoteError::unsupported_cipher("blowfish"))
        );
    }

    #[test]
    fn test_legacy_dispatch() {
        assert_eq!(decrypt("RC2", Some(64), "secret", LEGACY).expect("decrypt"), "Hello");
        assert_eq!(
            decrypt("RC2", Some(64), "wrong", LEGACY),
            Err(OxiNoteError::BadPassword)
        );
    }

    #[test]
    fn test_sniff() {
        assert_eq!(CipherTag::sniff(LEGACY), CipherTag::Rc2);
        assert_eq!(CipherTag::sniff("RU5DMAAA"), CipherTag::Aes);
        assert_eq!(CipherTag::sniff("not base64!"), CipherTag::Rc2);
    }

    #[test]
    fn test_inspect_legacy() {
        let report = inspect(None, LEGACY).expect("inspect");
        assert_eq!(report.format, CipherTag::Rc2);
        assert_eq!(report.size, 16);
        assert_eq!(report.salt, None);
    }

    #[test]
    fn test_aes_framing_errors_pass_through() {
        assert!(matches!(
            decrypt("AES", None, "pw", "RU5DMAAA"),
            Err(OxiNoteError::Truncated { .. })
        ));
        assert!(matches!(
            decrypt("AES", None, "pw", LEGACY),
            Err(OxiNoteError::InvalidMagic { .. })
        ));
    }
}
