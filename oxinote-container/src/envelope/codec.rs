//! Flat JSON envelope encoding.
//!
//! The grammar is deliberately narrower than JSON. After all whitespace is
//! removed the text must be `{` entries separated by `,` then `}`, where an
//! entry is
//!
//! ```text
//! name  := quote? [A-Za-z][A-Za-z0-9]* quote?     (same quote, " or ', or none)
//! value := [0-9]+ | "[A-Za-z0-9+/%*_.@=-]*"
//! ```
//!
//! `iv`, `salt` and `ct` hold base64; other strings are `escape`-encoded.

use crate::config::EnvelopeDefaults;
use oxinote_core::codec::base64;
use oxinote_core::{BitArray, OxiNoteError, Result};
use std::collections::BTreeMap;
use std::fmt::Write;

/// An envelope value under a name this codec does not interpret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    /// Unquoted decimal.
    Number(u64),
    /// Quoted, unescaped text.
    Text(String),
}

/// Envelope parameters. Absent fields are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    /// Envelope version.
    pub v: Option<u32>,
    /// PBKDF2 iterations.
    pub iter: Option<u32>,
    /// Key size in bits.
    pub ks: Option<usize>,
    /// Tag size in bits.
    pub ts: Option<usize>,
    /// Mode name.
    pub mode: Option<String>,
    /// Associated data as text.
    pub adata: Option<String>,
    /// Cipher name.
    pub cipher: Option<String>,
    /// Initialization vector.
    pub iv: Option<BitArray>,
    /// PBKDF2 salt.
    pub salt: Option<BitArray>,
    /// Ciphertext with any tag appended.
    pub ct: Option<BitArray>,
    /// Fields with other names, kept so they survive a round trip.
    pub extra: BTreeMap<String, Field>,
}

fn overlay<T: Clone + PartialEq>(
    target: &mut Option<T>,
    src: &Option<T>,
    strict: bool,
) -> Result<()> {
    if let Some(value) = src {
        if strict && target.as_ref().is_some_and(|current| current != value) {
            return Err(OxiNoteError::invalid_envelope("required parameter overridden"));
        }
        *target = Some(value.clone());
    }
    Ok(())
}

impl Params {
    /// Parameters holding every default value.
    pub fn from_defaults(defaults: &EnvelopeDefaults) -> Self {
        Self {
            v: Some(defaults.v),
            iter: Some(defaults.iter),
            ks: Some(defaults.ks),
            ts: Some(defaults.ts),
            mode: Some(defaults.mode.name().to_string()),
            adata: Some(defaults.adata.to_string()),
            cipher: Some(defaults.cipher.name().to_string()),
            ..Self::default()
        }
    }

    /// Copy every field present in `other` into `self`.
    ///
    /// With `strict`, a field present in both with different values fails
    /// with [`OxiNoteError::InvalidEnvelope`].
    pub fn merge(&mut self, other: &Params, strict: bool) -> Result<()> {
        overlay(&mut self.v, &other.v, strict)?;
        overlay(&mut self.iter, &other.iter, strict)?;
        overlay(&mut self.ks, &other.ks, strict)?;
        overlay(&mut self.ts, &other.ts, strict)?;
        overlay(&mut self.mode, &other.mode, strict)?;
        overlay(&mut self.adata, &other.adata, strict)?;
        overlay(&mut self.cipher, &other.cipher, strict)?;
        overlay(&mut self.iv, &other.iv, strict)?;
        overlay(&mut self.salt, &other.salt, strict)?;
        overlay(&mut self.ct, &other.ct, strict)?;
        for (name, value) in &other.extra {
            if strict && self.extra.get(name).is_some_and(|current| current != value) {
                return Err(OxiNoteError::invalid_envelope("required parameter overridden"));
            }
            self.extra.insert(name.clone(), value.clone());
        }
        Ok(())
    }

    /// Serialize in the order `iv v iter ks ts mode adata cipher`, then any
    /// extra fields, then `salt ct`.
    ///
    /// # Errors
    ///
    /// [`OxiNoteError::InvalidEnvelope`] if an extra field's name is not
    /// alphanumeric.
    pub fn encode(&self) -> Result<String> {
        let mut out = String::from("{");
        let mut entry = |name: &str, value: String| {
            if out.len() > 1 {
                out.push(',');
            }
            let _ = write!(out, "\"{name}\":{value}");
        };

        if let Some(iv) = &self.iv {
            entry("iv", quote_bits(iv));
        }
        if let Some(v) = self.v {
            entry("v", v.to_string());
        }
        if let Some(iter) = self.iter {
            entry("iter", iter.to_string());
        }
        if let Some(ks) = self.ks {
            entry("ks", ks.to_string());
        }
        if let Some(ts) = self.ts {
            entry("ts", ts.to_string());
        }
        if let Some(mode) = &self.mode {
            entry("mode", quote_text(mode));
        }
        if let Some(adata) = &self.adata {
            entry("adata", quote_text(adata));
        }
        if let Some(cipher) = &self.cipher {
            entry("cipher", quote_text(cipher));
        }
        for (name, value) in &self.extra {
            if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(OxiNoteError::invalid_envelope(format!(
                    "invalid property name {name:?}"
                )));
            }
            match value {
                Field::Number(n) => entry(name, n.to_string()),
                Field::Text(s) => entry(name, quote_text(s)),
            }
        }
        if let Some(salt) = &self.salt {
            entry("salt", quote_bits(salt));
        }
        if let Some(ct) = &self.ct {
            entry("ct", quote_bits(ct));
        }

        out.push('}');
        Ok(out)
    }

    /// Parse an envelope.
    ///
    /// # Errors
    ///
    /// [`OxiNoteError::InvalidEnvelope`] if the text does not follow the
    /// grammar, a known field has the wrong kind of value, or a number is
    /// out of range; [`OxiNoteError::InvalidEncoding`] for bad base64.
    pub fn decode(text: &str) -> Result<Self> {
        let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        let inner = compact
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
            .ok_or_else(|| OxiNoteError::invalid_envelope("not an object"))?;

        let mut params = Params::default();
        for item in inner.split(',') {
            let (name, value) = parse_entry(item)?;
            params.set(name, value)?;
        }
        Ok(params)
    }

    fn set(&mut self, name: &str, value: Field) -> Result<()> {
        match name {
            "v" => self.v = Some(number(name, value)?),
            "iter" => self.iter = Some(number(name, value)?),
            "ks" => self.ks = Some(number(name, value)?),
            "ts" => self.ts = Some(number(name, value)?),
            "mode" => self.mode = Some(text(name, value)?),
            "adata" => self.adata = Some(text(name, value)?),
            "cipher" => self.cipher = Some(text(name, value)?),
            "iv" => self.iv = Some(binary(name, value)?),
            "salt" => self.salt = Some(binary(name, value)?),
            "ct" => self.ct = Some(binary(name, value)?),
            _ => {
                self.extra.insert(name.to_string(), value);
            }
        }
        Ok(())
    }
}

fn quote_text(s: &str) -> String {
    format!("\"{}\"", escape(s))
}

fn quote_bits(bits: &BitArray) -> String {
    format!("\"{}\"", base64::encode(bits))
}

fn number<T: TryFrom<u64>>(name: &str, value: Field) -> Result<T> {
    match value {
        Field::Number(n) => T::try_from(n)
            .map_err(|_| OxiNoteError::invalid_envelope(format!("{name} out of range"))),
        Field::Text(_) => Err(OxiNoteError::invalid_envelope(format!("{name} must be a number"))),
    }
}

fn text(name: &str, value: Field) -> Result<String> {
    match value {
        Field::Text(s) => Ok(s),
        Field::Number(_) => Err(OxiNoteError::invalid_envelope(format!("{name} must be a string"))),
    }
}

fn binary(name: &str, value: Field) -> Result<BitArray> {
    match value {
        // Binary fields are base64, not escape-encoded; `%` is not base64.
        Field::Text(s) => base64::decode(&s),
        Field::Number(_) => Err(OxiNoteError::invalid_envelope(format!("{name} must be a string"))),
    }
}

fn is_value_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "+/%*_.@=-".contains(c)
}

/// Split one `name:value` entry.
fn parse_entry(item: &str) -> Result<(&str, Field)> {
    let malformed = || OxiNoteError::invalid_envelope(format!("malformed entry {item:?}"));

    let (quote, rest) = match item.chars().next() {
        Some(q @ ('"' | '\'')) => (Some(q), &item[1..]),
        _ => (None, item),
    };
    let name_len = rest
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_alphabetic() || (i > 0 && c.is_ascii_digit())))
        .map_or(rest.len(), |(i, _)| i);
    if name_len == 0 {
        return Err(malformed());
    }
    let (name, mut rest) = rest.split_at(name_len);
    if let Some(q) = quote {
        rest = rest.strip_prefix(q).ok_or_else(malformed)?;
    }
    let raw = rest.strip_prefix(':').ok_or_else(malformed)?;

    if !raw.is_empty() && raw.chars().all(|c| c.is_ascii_digit()) {
        let n = raw
            .parse::<u64>()
            .map_err(|_| OxiNoteError::invalid_envelope(format!("{name} out of range")))?;
        return Ok((name, Field::Number(n)));
    }

    let body = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .filter(|s| s.chars().all(is_value_char))
        .ok_or_else(malformed)?;
    let value = match name {
        "iv" | "salt" | "ct" => body.to_string(),
        _ => unescape(body),
    };
    Ok((name, Field::Text(value)))
}

/// Percent-encode every UTF-16 unit outside `A-Za-z0-9@*_+-./`, as `%XX`
/// below 256 and `%uXXXX` above.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for unit in text.encode_utf16() {
        match char::from_u32(unit as u32) {
            Some(c) if c.is_ascii_alphanumeric() || "@*_+-./".contains(c) => out.push(c),
            _ if unit < 0x100 => {
                let _ = write!(out, "%{unit:02X}");
            }
            _ => {
                let _ = write!(out, "%u{unit:04X}");
            }
        }
    }
    out
}

/// Reverse [`escape`]. Malformed escapes are kept literally and unpaired
/// surrogates become U+FFFD.
pub fn unescape(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let hex = |from: usize, len: usize| -> Option<u16> {
        let digits: String = chars.get(from..from + len)?.iter().collect();
        if digits.chars().all(|c| c.is_ascii_hexdigit()) {
            u16::from_str_radix(&digits, 16).ok()
        } else {
            None
        }
    };

    let mut units: Vec<u16> = Vec::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '%' {
            if chars.get(i + 1) == Some(&'u') {
                if let Some(unit) = hex(i + 2, 4) {
                    units.push(unit);
                    i += 6;
                    continue;
                }
            } else if let Some(unit) = hex(i + 1, 2) {
                units.push(unit);
                i += 3;
                continue;
            }
        }
        let mut buf = [0u16; 2];
        units.extend_from_slice(chars[i].encode_utf16(&mut buf));
        i += 1;
    }
    String::from_utf16_lossy(&units)
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxinote_core::codec::hex;

    #[test]
    fn test_escape() {
        assert_eq!(escape("a b/c"), "a%20b/c");
        assert_eq!(escape("caf\u{e9}"), "caf%E9");
        assert_eq!(escape("\u{2603}"), "%u2603");
        assert_eq!(escape("\u{1F512}"), "%uD83D%uDD12");
        assert_eq!(escape("100%"), "100%25");
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape("a%20b"), "a b");
        assert_eq!(unescape("%uD83D%uDD12"), "\u{1F512}");
        assert_eq!(unescape("50%"), "50%");
        assert_eq!(unescape("%zz%u12"), "%zz%u12");
        for s in ["", "plain", "mixed caf\u{e9} \u{2603} \u{1F512} 100%"] {
            assert_eq!(unescape(&escape(s)), s);
        }
    }

    #[test]
    fn test_decode_fields() {
        let params = Params::decode(
            "{ \"iv\":\"AAECAw==\", 'iter':2000, ks:256, \"mode\":\"gcm\",\n \"adata\":\"a%20b\", \"x1\":7 }",
        )
        .expect("decode");
        assert_eq!(params.iv.as_ref().map(hex::from_bits).as_deref(), Some("00010203"));
        assert_eq!(params.iter, Some(2000));
        assert_eq!(params.ks, Some(256));
        assert_eq!(params.mode.as_deref(), Some("gcm"));
        assert_eq!(params.adata.as_deref(), Some("a b"));
        assert_eq!(params.extra.get("x1"), Some(&Field::Number(7)));
        assert_eq!(params.ts, None);
    }

    #[test]
    fn test_decode_rejects() {
        for bad in [
            "",
            "{}",
            "[\"v\":1]",
            "{\"v\":1,}",
            "{\"v\":-1}",
            "{\"v\":1.5}",
            "{\"v':1}",
            "{\"1v\":1}",
            "{\"mode\":\"c c\"}",
            "{\"mode\":'ccm'}",
            "{\"adata\":\"<tag>\"}",
            "{\"ks\":\"128\"}",
            "{\"mode\":5}",
            "{\"iter\":99999999999}",
        ] {
            assert!(
                matches!(Params::decode(bad), Err(OxiNoteError::InvalidEnvelope { .. })),
                "{bad:?} should be rejected"
            );
        }
        assert!(matches!(
            Params::decode("{\"ct\":\"a%20b\"}"),
            Err(OxiNoteError::InvalidEncoding { .. })
        ));
    }

    #[test]
    fn test_encode_order_and_roundtrip() {
        let mut params = Params::from_defaults(&EnvelopeDefaults::STANDARD);
        params.iv = Some(BitArray::from([1, 2, 3, 4]));
        params.salt = Some(BitArray::from([5, 6]));
        params.ct = Some(BitArray::from([7]));
        params.adata = Some("hello world".into());
        params.extra.insert("note".into(), Field::Text("x y".into()));

        let text = params.encode().expect("encode");
        assert_eq!(
            text,
            "{\"iv\":\"AAAAAQAAAAIAAAADAAAABA==\",\"v\":1,\"iter\":1000,\"ks\":128,\"ts\":64,\
             \"mode\":\"ccm\",\"adata\":\"hello%20world\",\"cipher\":\"aes\",\"note\":\"x%20y\",\
             \"salt\":\"AAAABQAAAAY=\",\"ct\":\"AAAABw==\"}"
        );
        assert_eq!(Params::decode(&text).expect("decode"), params);
    }

    #[test]
    fn test_encode_rejects_bad_names() {
        let mut params = Params::default();
        params.extra.insert("not-ok".into(), Field::Number(1));
        assert!(matches!(params.encode(), Err(OxiNoteError::InvalidEnvelope { .. })));
    }

    #[test]
    fn test_strict_merge() {
        let mut base = Params::from_defaults(&EnvelopeDefaults::STANDARD);
        let same = Params {
            ks: Some(128),
            ..Params::default()
        };
        base.merge(&same, true).expect("same value");

        let different = Params {
            ts: Some(128),
            ..Params::default()
        };
        assert!(matches!(
            base.clone().merge(&different, true),
            Err(OxiNoteError::InvalidEnvelope { .. })
        ));
        base.merge(&different, false).expect("lenient");
        assert_eq!(base.ts, Some(128));
    }
}
