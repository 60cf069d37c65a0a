//! Self-describing JSON envelopes.
//!
//! An envelope carries the ciphertext together with everything needed to
//! reverse it: cipher, mode, key and tag sizes, IV, and the PBKDF2 salt and
//! iteration count when the key came from a password.
//!
//! ```rust
//! use oxinote_container::envelope::{EnvelopeCipher, Params, Secret};
//! use oxinote_random::{Prng, PrngConfig};
//!
//! let mut rng = Prng::new(PrngConfig::STANDARD);
//! rng.add_entropy(vec![0x5eed_5eed; 8], Some(256), "doc");
//!
//! let mut envelopes = EnvelopeCipher::new();
//! let secret = Secret::from("correct horse");
//! let sealed = envelopes
//!     .encrypt(&secret, "attack at dawn", &Params::default(), &mut rng)
//!     .unwrap();
//! assert_eq!(envelopes.decrypt(&secret, &sealed).unwrap(), "attack at dawn");
//! ```

pub mod cache;
pub mod codec;

pub use cache::Pbkdf2Cache;
pub use codec::{Field, Params, escape, unescape};

use crate::config::EnvelopeDefaults;
use oxinote_cipher::{Cipher, Mode};
use oxinote_core::codec::utf8;
use oxinote_core::{BitArray, OxiNoteError, Result};
use oxinote_random::{RandomSource, SystemRandom};
use std::fmt;
use std::sync::{Mutex, OnceLock, PoisonError};
use tracing::debug;
use zeroize::Zeroize;

/// Passwords at or below this many iterations are refused.
const MIN_PASSWORD_ITERATIONS: u32 = 100;

/// What an envelope is sealed with.
#[derive(Clone)]
pub enum Secret {
    /// Text stretched with PBKDF2.
    Password(String),
    /// A raw cipher key, used as is.
    Key(BitArray),
}

impl Secret {
    fn is_password(&self) -> bool {
        matches!(self, Secret::Password(_))
    }
}

impl From<&str> for Secret {
    fn from(password: &str) -> Self {
        Secret::Password(password.to_string())
    }
}

impl From<String> for Secret {
    fn from(password: String) -> Self {
        Secret::Password(password)
    }
}

impl From<BitArray> for Secret {
    fn from(key: BitArray) -> Self {
        Secret::Key(key)
    }
}

impl Drop for Secret {
    fn drop(&mut self) {
        match self {
            Secret::Password(password) => password.zeroize(),
            Secret::Key(key) => key.zeroize(),
        }
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Secret::Password(_) => f.write_str("Password(..)"),
            Secret::Key(key) => write!(f, "Key({} bits)", key.bit_length()),
        }
    }
}

/// Parameters checked against the allowed value sets.
struct Resolved {
    iter: u32,
    ks: usize,
    ts: usize,
    mode: Mode,
    cipher: Cipher,
    adata: BitArray,
    iv: BitArray,
}

fn resolve(params: &Params, secret: &Secret) -> Result<Resolved> {
    let mode = Mode::from_name(params.mode.as_deref().unwrap_or_default())?;
    let cipher = Cipher::from_name(params.cipher.as_deref().unwrap_or_default())?;

    let iter = params.iter.unwrap_or(0);
    if secret.is_password() && iter <= MIN_PASSWORD_ITERATIONS {
        return Err(OxiNoteError::invalid_parameter(format!(
            "envelope: {iter} iterations is too few for a password"
        )));
    }
    let ts = params.ts.unwrap_or(0);
    if ![64, 96, 128].contains(&ts) {
        return Err(OxiNoteError::invalid_parameter(format!(
            "envelope: invalid tag size {ts}"
        )));
    }
    let ks = params.ks.unwrap_or(0);
    if ![128, 192, 256].contains(&ks) {
        return Err(OxiNoteError::invalid_parameter(format!(
            "envelope: invalid key size {ks}"
        )));
    }
    let iv = params
        .iv
        .clone()
        .ok_or_else(|| OxiNoteError::invalid_parameter("envelope: missing iv"))?;
    if !(2..=4).contains(&iv.word_len()) {
        return Err(OxiNoteError::invalid_parameter(format!(
            "envelope: iv of {} bits",
            iv.bit_length()
        )));
    }

    let adata = utf8::to_bits(params.adata.as_deref().unwrap_or_default());
    Ok(Resolved {
        iter,
        ks,
        ts,
        mode,
        cipher,
        adata,
        iv,
    })
}

/// Envelope encryption with a session-wide PBKDF2 cache.
#[derive(Debug, Default)]
pub struct EnvelopeCipher {
    defaults: EnvelopeDefaults,
    cache: Pbkdf2Cache,
}

impl EnvelopeCipher {
    /// Create a codec with the standard defaults and an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a codec with other defaults.
    pub fn with_defaults(defaults: EnvelopeDefaults) -> Self {
        Self {
            defaults,
            cache: Pbkdf2Cache::new(),
        }
    }

    /// The PBKDF2 cache.
    pub fn cache(&self) -> &Pbkdf2Cache {
        &self.cache
    }

    /// Forget every cached password and key.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Resolve the cipher key, filling in `params.salt` for passwords.
    fn key_for(
        &mut self,
        secret: &Secret,
        resolved: &Resolved,
        params: &mut Params,
        fresh_salt: impl FnOnce() -> Result<BitArray>,
    ) -> Result<BitArray> {
        match secret {
            Secret::Key(key) => Ok(key.clone()),
            Secret::Password(password) => {
                let (key, salt) =
                    self.cache
                        .derive(password, resolved.iter, params.salt.as_ref(), fresh_salt)?;
                params.salt = Some(salt);
                Ok(key.clamped(resolved.ks))
            }
        }
    }

    /// Encrypt `plaintext`, returning the envelope text.
    ///
    /// Fields absent from `params` take the defaults; a missing IV is four
    /// random words and a missing salt is the password's first salt, or
    /// two random words.
    ///
    /// # Errors
    ///
    /// [`OxiNoteError::UnsupportedMode`] / [`OxiNoteError::UnsupportedCipher`]
    /// for unknown names, [`OxiNoteError::InvalidParameter`] for values
    /// outside the allowed sets, [`OxiNoteError::GeneratorNotSeeded`] if
    /// `rng` cannot supply an IV or salt.
    pub fn encrypt<R: RandomSource + ?Sized>(
        &mut self,
        secret: &Secret,
        plaintext: &str,
        params: &Params,
        rng: &mut R,
    ) -> Result<String> {
        let mut p = Params::default();
        if params.iv.is_none() {
            p.iv = Some(rng.random_bits(4, Some(0))?);
        }
        p.merge(&Params::from_defaults(&self.defaults), false)?;
        p.merge(params, false)?;

        let resolved = resolve(&p, secret)?;
        let key = self.key_for(secret, &resolved, &mut p, || rng.random_bits(2, Some(0)))?;
        let prp = resolved.cipher.keyed(&key)?;

        let ct = resolved.mode.encrypt(
            &prp,
            &utf8::to_bits(plaintext),
            &resolved.iv,
            &resolved.adata,
            resolved.ts,
        )?;
        p.ct = Some(ct);
        debug!(mode = %resolved.mode, ks = resolved.ks, "envelope sealed");
        p.encode()
    }

    /// Decrypt an envelope.
    ///
    /// # Errors
    ///
    /// [`OxiNoteError::InvalidEnvelope`] / [`OxiNoteError::InvalidEncoding`]
    /// for malformed text, parameter errors as for [`EnvelopeCipher::encrypt`],
    /// and [`OxiNoteError::CorruptTag`] / [`OxiNoteError::CorruptPadding`]
    /// from the mode, unchanged.
    pub fn decrypt(&mut self, secret: &Secret, envelope: &str) -> Result<String> {
        self.decrypt_with(secret, envelope, &Params::default())
    }

    /// Decrypt with extra parameters merged over the envelope.
    ///
    /// A parameter that disagrees with the envelope, or with a default the
    /// envelope relies on, fails with [`OxiNoteError::InvalidEnvelope`].
    pub fn decrypt_with(
        &mut self,
        secret: &Secret,
        envelope: &str,
        overrides: &Params,
    ) -> Result<String> {
        let mut p = Params::from_defaults(&self.defaults);
        p.merge(&Params::decode(envelope)?, false)?;
        p.merge(overrides, true)?;

        let resolved = resolve(&p, secret)?;
        let ct = p
            .ct
            .clone()
            .ok_or_else(|| OxiNoteError::invalid_envelope("missing ct"))?;
        let key = self.key_for(secret, &resolved, &mut p, || {
            Err(OxiNoteError::invalid_parameter("envelope: missing salt"))
        })?;
        let prp = resolved.cipher.keyed(&key)?;

        let pt = resolved
            .mode
            .decrypt(&prp, &ct, &resolved.iv, &resolved.adata, resolved.ts)?;
        utf8::from_bits(&pt)
    }
}

static SHARED: OnceLock<Mutex<EnvelopeCipher>> = OnceLock::new();

fn with_shared<T>(f: impl FnOnce(&mut EnvelopeCipher) -> Result<T>) -> Result<T> {
    let shared = SHARED.get_or_init(|| Mutex::new(EnvelopeCipher::new()));
    let mut guard = shared.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut guard)
}

/// Encrypt with the process-wide cache and generator.
pub fn encrypt(secret: &Secret, plaintext: &str, params: &Params) -> Result<String> {
    with_shared(|envelopes| envelopes.encrypt(secret, plaintext, params, &mut SystemRandom))
}

/// Decrypt with the process-wide cache.
pub fn decrypt(secret: &Secret, envelope: &str) -> Result<String> {
    with_shared(|envelopes| envelopes.decrypt(secret, envelope))
}

/// Decrypt with overrides, using the process-wide cache.
pub fn decrypt_with(secret: &Secret, envelope: &str, overrides: &Params) -> Result<String> {
    with_shared(|envelopes| envelopes.decrypt_with(secret, envelope, overrides))
}
