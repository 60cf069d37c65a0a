//! Error types for OxiNote operations.
//!
//! A single error enum covers the whole stack: parameter validation,
//! encoding problems, integrity failures raised by the cipher modes, and the
//! deliberately coarse [`OxiNoteError::BadPassword`] surfaced by the note
//! containers.

use thiserror::Error;

/// The main error type for OxiNote operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OxiNoteError {
    /// A parameter was out of range before any secret material was touched.
    #[error("Invalid parameter: {message}")]
    InvalidParameter {
        /// Description of the offending parameter.
        message: String,
    },

    /// Malformed base64, hex, UTF-8 or envelope text.
    #[error("Invalid encoding: {message}")]
    InvalidEncoding {
        /// Description of the encoding error.
        message: String,
    },

    /// Key length not supported by the cipher.
    #[error("Invalid key size: {bits} bits")]
    InvalidKeySize {
        /// Key length that was supplied, in bits.
        bits: usize,
    },

    /// Block length not supported by the cipher.
    #[error("Invalid block size: {bits} bits")]
    InvalidBlockSize {
        /// Block length that was supplied, in bits.
        bits: usize,
    },

    /// IV rejected by the chaining mode.
    #[error("Invalid IV: {message}")]
    InvalidIv {
        /// Description of the IV error.
        message: String,
    },

    /// CBC padding did not verify after decryption.
    #[error("Corrupt padding")]
    CorruptPadding,

    /// Authentication tag mismatch in an AEAD mode.
    #[error("Corrupt tag: {mode} tag doesn't match")]
    CorruptTag {
        /// Mode that rejected the tag.
        mode: &'static str,
    },

    /// The random generator was asked for output before it was seeded.
    #[error("Generator isn't seeded")]
    GeneratorNotSeeded,

    /// Unknown cipher identifier.
    #[error("Unsupported cipher: {name}")]
    UnsupportedCipher {
        /// The identifier that was not recognized.
        name: String,
    },

    /// Unknown chaining mode identifier.
    #[error("Unsupported mode: {name}")]
    UnsupportedMode {
        /// The identifier that was not recognized.
        name: String,
    },

    /// Operation not supported in this configuration.
    #[error("Not supported: {message}")]
    NotSupported {
        /// What was attempted.
        message: String,
    },

    /// Envelope text or parameters failed validation.
    #[error("Invalid envelope: {message}")]
    InvalidEnvelope {
        /// Description of the envelope error.
        message: String,
    },

    /// Container magic number mismatch.
    #[error("Invalid magic number: expected {expected:02x?}, found {found:02x?}")]
    InvalidMagic {
        /// Expected magic bytes.
        expected: Vec<u8>,
        /// Actual magic bytes found.
        found: Vec<u8>,
    },

    /// Container shorter than its fixed framing.
    #[error("Truncated container: need {needed} bytes, have {available}")]
    Truncated {
        /// Minimum number of bytes required.
        needed: usize,
        /// Number of bytes available.
        available: usize,
    },

    /// Wrong password or corrupted ciphertext; the two are indistinguishable.
    #[error("Bad password")]
    BadPassword,
}

/// Result type alias for OxiNote operations.
pub type Result<T> = std::result::Result<T, OxiNoteError>;

impl OxiNoteError {
    /// Create an invalid parameter error.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    /// Create an invalid encoding error.
    pub fn invalid_encoding(message: impl Into<String>) -> Self {
        Self::InvalidEncoding {
            message: message.into(),
        }
    }

    /// Create an invalid IV error.
    pub fn invalid_iv(message: impl Into<String>) -> Self {
        Self::InvalidIv {
            message: message.into(),
        }
    }

    /// Create a corrupt tag error for the named mode.
    pub fn corrupt_tag(mode: &'static str) -> Self {
        Self::CorruptTag { mode }
    }

    /// Create an unsupported cipher error.
    pub fn unsupported_cipher(name: impl Into<String>) -> Self {
        Self::UnsupportedCipher { name: name.into() }
    }

    /// Create an unsupported mode error.
    pub fn unsupported_mode(name: impl Into<String>) -> Self {
        Self::UnsupportedMode { name: name.into() }
    }

    /// Create a not supported error.
    pub fn not_supported(message: impl Into<String>) -> Self {
        Self::NotSupported {
            message: message.into(),
        }
    }

    /// Create an invalid envelope error.
    pub fn invalid_envelope(message: impl Into<String>) -> Self {
        Self::InvalidEnvelope {
            message: message.into(),
        }
    }

    /// Create an invalid magic error.
    pub fn invalid_magic(expected: impl Into<Vec<u8>>, found: impl Into<Vec<u8>>) -> Self {
        Self::InvalidMagic {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create a truncated container error.
    pub fn truncated(needed: usize, available: usize) -> Self {
        Self::Truncated { needed, available }
    }

    /// Whether this error reports a failed integrity check after decryption.
    ///
    /// These are the failures a container collapses into
    /// [`OxiNoteError::BadPassword`] so that callers cannot tell a padding
    /// failure from a tag failure.
    pub fn is_integrity_failure(&self) -> bool {
        matches!(
            self,
            Self::CorruptPadding | Self::CorruptTag { .. } | Self::BadPassword
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OxiNoteError::invalid_magic(b"ENC0".to_vec(), vec![0x00, 0x01, 0x02, 0x03]);
        assert!(err.to_string().contains("Invalid magic"));

        let err = OxiNoteError::corrupt_tag("ccm");
        assert_eq!(err.to_string(), "Corrupt tag: ccm tag doesn't match");

        let err = OxiNoteError::unsupported_cipher("DES");
        assert!(err.to_string().contains("DES"));

        let err = OxiNoteError::InvalidKeySize { bits: 100 };
        assert!(err.to_string().contains("100 bits"));
    }

    #[test]
    fn test_integrity_classification() {
        assert!(OxiNoteError::CorruptPadding.is_integrity_failure());
        assert!(OxiNoteError::corrupt_tag("gcm").is_integrity_failure());
        assert!(OxiNoteError::BadPassword.is_integrity_failure());
        assert!(!OxiNoteError::invalid_encoding("bad base64").is_integrity_failure());
        assert!(!OxiNoteError::unsupported_cipher("DES").is_integrity_failure());
        assert!(!OxiNoteError::truncated(84, 10).is_integrity_failure());
    }
}
