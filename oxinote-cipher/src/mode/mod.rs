//! Chaining and AEAD modes over a 128-bit [`BlockCipher`].
//!
//! Every mode shares one calling convention:
//!
//! ```text
//! encrypt(cipher, plaintext, iv, adata, tag_bits) -> ciphertext ‖ tag
//! decrypt(cipher, ciphertext ‖ tag, iv, adata, tag_bits) -> plaintext
//! ```
//!
//! Parameters are validated before any block is processed, and a failed
//! authentication check never returns partial plaintext.
//!
//! [`Mode`] is the closed set of modes; the name strings (`"cbc"`, `"ccm"`,
//! `"gcm"`, `"ocb2"`) only appear at the envelope serialization boundary.

pub mod cbc;
pub mod ccm;
pub mod gcm;
pub mod ocb2;

use crate::aes::Aes;
use oxinote_core::{BitArray, Block, BlockCipher, OxiNoteError, Result};
use std::fmt;
use std::str::FromStr;

/// A supported chaining mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// CBC with PKCS#7 padding, unauthenticated.
    Cbc,
    /// Counter with CBC-MAC.
    Ccm,
    /// Galois/counter mode.
    Gcm,
    /// Offset codebook, version 2.0.
    Ocb2,
}

impl Mode {
    /// All modes.
    pub const ALL: [Mode; 4] = [Mode::Cbc, Mode::Ccm, Mode::Gcm, Mode::Ocb2];

    /// Serialized name.
    pub fn name(self) -> &'static str {
        match self {
            Mode::Cbc => "cbc",
            Mode::Ccm => "ccm",
            Mode::Gcm => "gcm",
            Mode::Ocb2 => "ocb2",
        }
    }

    /// Look up a mode by its serialized name.
    ///
    /// # Errors
    ///
    /// [`OxiNoteError::UnsupportedMode`] for an unknown name.
    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.name() == name)
            .ok_or_else(|| OxiNoteError::unsupported_mode(name))
    }

    /// Whether the mode produces an authentication tag.
    pub fn is_authenticated(self) -> bool {
        !matches!(self, Mode::Cbc)
    }

    /// Encrypt `plaintext`, returning ciphertext with any tag appended.
    pub fn encrypt<C: BlockCipher>(
        self,
        cipher: &C,
        plaintext: &BitArray,
        iv: &BitArray,
        adata: &BitArray,
        tag_bits: usize,
    ) -> Result<BitArray> {
        match self {
            Mode::Cbc => cbc::encrypt(cipher, plaintext, iv, adata),
            Mode::Ccm => ccm::encrypt(cipher, plaintext, iv, adata, tag_bits),
            Mode::Gcm => gcm::encrypt(cipher, plaintext, iv, adata, tag_bits),
            Mode::Ocb2 => ocb2::encrypt(cipher, plaintext, iv, adata, tag_bits),
        }
    }

    /// Verify and decrypt `ciphertext`.
    pub fn decrypt<C: BlockCipher>(
        self,
        cipher: &C,
        ciphertext: &BitArray,
        iv: &BitArray,
        adata: &BitArray,
        tag_bits: usize,
    ) -> Result<BitArray> {
        match self {
            Mode::Cbc => cbc::decrypt(cipher, ciphertext, iv, adata),
            Mode::Ccm => ccm::decrypt(cipher, ciphertext, iv, adata, tag_bits),
            Mode::Gcm => gcm::decrypt(cipher, ciphertext, iv, adata, tag_bits),
            Mode::Ocb2 => ocb2::decrypt(cipher, ciphertext, iv, adata, tag_bits),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = OxiNoteError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

/// A supported block cipher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cipher {
    /// AES-128/192/256.
    Aes,
}

impl Cipher {
    /// Serialized name.
    pub fn name(self) -> &'static str {
        match self {
            Cipher::Aes => "aes",
        }
    }

    /// Look up a cipher by its serialized name.
    ///
    /// # Errors
    ///
    /// [`OxiNoteError::UnsupportedCipher`] for an unknown name.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "aes" => Ok(Cipher::Aes),
            other => Err(OxiNoteError::unsupported_cipher(other)),
        }
    }

    /// Expand `key` for this cipher.
    pub fn keyed(self, key: &BitArray) -> Result<KeyedCipher> {
        match self {
            Cipher::Aes => Ok(KeyedCipher::Aes(Aes::new(key)?)),
        }
    }
}

impl fmt::Display for Cipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Cipher {
    type Err = OxiNoteError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

/// A block cipher instance produced by [`Cipher::keyed`].
#[derive(Debug, Clone)]
pub enum KeyedCipher {
    /// Expanded AES key.
    Aes(Aes),
}

impl BlockCipher for KeyedCipher {
    fn encrypt_block(&self, block: &Block) -> Block {
        match self {
            KeyedCipher::Aes(aes) => aes.encrypt_block(block),
        }
    }

    fn decrypt_block(&self, block: &Block) -> Block {
        match self {
            KeyedCipher::Aes(aes) => aes.decrypt_block(block),
        }
    }
}

// ---------------------------------------------------------------------------
// Block helpers shared by the modes
// ---------------------------------------------------------------------------

/// Four words starting at word `index`, zero-filled past the end.
#[inline]
pub(crate) fn block_at(bits: &BitArray, index: usize) -> Block {
    [
        bits.word(index),
        bits.word(index + 1),
        bits.word(index + 2),
        bits.word(index + 3),
    ]
}

#[inline]
pub(crate) fn xor(a: &Block, b: &Block) -> Block {
    [a[0] ^ b[0], a[1] ^ b[1], a[2] ^ b[2], a[3] ^ b[3]]
}

/// Require a whole number of bytes.
pub(crate) fn require_bytes(bits: &BitArray, what: &str) -> Result<()> {
    if bits.bit_length() % 8 != 0 {
        return Err(OxiNoteError::invalid_parameter(format!(
            "{what} must be a whole number of bytes"
        )));
    }
    Ok(())
}

/// Tag length accepted by GCM and OCB2: whole bytes from 32 to 128 bits.
pub(crate) fn check_tag_bits(tag_bits: usize, mode: &str) -> Result<()> {
    if tag_bits % 8 != 0 || !(32..=128).contains(&tag_bits) {
        return Err(OxiNoteError::invalid_parameter(format!(
            "{mode}: invalid tag length {tag_bits}"
        )));
    }
    Ok(())
}

/// Split `data` into body and trailing `tag_bits`-bit tag.
pub(crate) fn split_tag(
    data: &BitArray,
    tag_bits: usize,
    mode: &'static str,
) -> Result<(BitArray, BitArray)> {
    let len = data.bit_length();
    if len < tag_bits {
        return Err(OxiNoteError::corrupt_tag(mode));
    }
    Ok((data.bit_slice(0, len - tag_bits), data.tail(len - tag_bits)))
}
