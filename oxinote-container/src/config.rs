//! Format parameters.
//!
//! Every container is described by a plain `Copy` struct with a `STANDARD`
//! preset matching the deployed format. Tests and tools may build variants
//! with struct update syntax, for example to lower iteration counts.

use oxinote_cipher::{Cipher, Mode};

/// Parameters of the current `ENC0` container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentFormatConfig {
    /// Leading magic bytes.
    pub magic: [u8; 4],
    /// PBKDF2-HMAC-SHA256 iterations for both derived keys.
    pub iterations: u32,
    /// Derived key size in bits; also the salt and IV size.
    pub key_bits: usize,
    /// HMAC-SHA256 tag size in bits.
    pub hmac_bits: usize,
}

impl CurrentFormatConfig {
    /// The deployed format: `ENC0`, 50,000 iterations, AES-128, full HMAC.
    pub const STANDARD: Self = Self {
        magic: *b"ENC0",
        iterations: 50_000,
        key_bits: 128,
        hmac_bits: 256,
    };

    /// Size of one salt or the IV in bytes.
    pub const fn field_len(&self) -> usize {
        self.key_bits / 8
    }

    /// Bytes before the ciphertext: magic, salt, HMAC salt and IV.
    pub const fn header_len(&self) -> usize {
        self.magic.len() + 3 * self.field_len()
    }

    /// Size of the trailing tag in bytes.
    pub const fn tag_len(&self) -> usize {
        self.hmac_bits / 8
    }

    /// Smallest container that holds the framing.
    pub const fn min_len(&self) -> usize {
        self.header_len() + self.tag_len()
    }
}

impl Default for CurrentFormatConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Parameters of the legacy RC2 container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyFormatConfig {
    /// RC2 effective key length in bits.
    pub effective_key_bits: usize,
    /// Hex digits of the check value stored in front of the payload.
    pub check_digits: usize,
}

impl LegacyFormatConfig {
    /// The deployed format: 64 effective key bits, 4 check digits.
    pub const STANDARD: Self = Self {
        effective_key_bits: 64,
        check_digits: 4,
    };
}

impl Default for LegacyFormatConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Values assumed for envelope fields that are absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopeDefaults {
    /// Envelope version.
    pub v: u32,
    /// PBKDF2 iterations.
    pub iter: u32,
    /// Key size in bits.
    pub ks: usize,
    /// Tag size in bits.
    pub ts: usize,
    /// Chaining mode.
    pub mode: Mode,
    /// Associated data.
    pub adata: &'static str,
    /// Block cipher.
    pub cipher: Cipher,
}

impl EnvelopeDefaults {
    /// Version 1, 1000 iterations, AES-128-CCM with a 64-bit tag.
    pub const STANDARD: Self = Self {
        v: 1,
        iter: 1000,
        ks: 128,
        ts: 64,
        mode: Mode::Ccm,
        adata: "",
        cipher: Cipher::Aes,
    };
}

impl Default for EnvelopeDefaults {
    fn default() -> Self {
        Self::STANDARD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_framing() {
        let config = CurrentFormatConfig::STANDARD;
        assert_eq!(config.field_len(), 16);
        assert_eq!(config.header_len(), 52);
        assert_eq!(config.tag_len(), 32);
        assert_eq!(config.min_len(), 84);
    }

    #[test]
    fn test_override_iterations() {
        let fast = CurrentFormatConfig {
            iterations: 10,
            ..CurrentFormatConfig::STANDARD
        };
        assert_eq!(fast.magic, *b"ENC0");
        assert_ne!(fast, CurrentFormatConfig::default());
    }
}
