//! PBKDF2 (RFC 8018) with an HMAC pseudo-random function.
//!
//! Two drivers produce identical output:
//!
//! - [`pbkdf2`] runs the whole derivation in one call.
//! - [`Pbkdf2Step`] runs a bounded number of PRF iterations per
//!   [`Pbkdf2Step::step`], so a caller on a cooperative scheduler (or one
//!   drawing a progress bar) can interleave other work between quanta.

use crate::hmac::Hmac;
use crate::sha256::Sha256;
use oxinote_core::codec::utf8;
use oxinote_core::{BitArray, Digest, OxiNoteError, Result};

fn validate(iterations: u32, length: Option<usize>) -> Result<()> {
    if iterations == 0 {
        return Err(OxiNoteError::invalid_parameter(
            "pbkdf2 iteration count must be positive",
        ));
    }
    if length == Some(0) {
        return Err(OxiNoteError::invalid_parameter(
            "pbkdf2 output length must be positive",
        ));
    }
    Ok(())
}

fn xor_into(acc: &mut [u32], u: &BitArray) {
    for (a, w) in acc.iter_mut().zip(u.words()) {
        *a ^= w;
    }
}

/// Derive `length` bits (one digest's worth if `None`) from a password.
///
/// # Errors
///
/// [`OxiNoteError::InvalidParameter`] if `iterations` or `length` is zero.
pub fn pbkdf2<D: Digest>(
    password: &BitArray,
    salt: &BitArray,
    iterations: u32,
    length: Option<usize>,
) -> Result<BitArray> {
    validate(iterations, length)?;
    let length = length.unwrap_or(D::OUTPUT_BITS);
    let prf = Hmac::<D>::new(password);

    let mut out = BitArray::new();
    let mut block_index: u32 = 1;
    while out.bit_length() < length {
        let mut message = salt.clone();
        message.push_word(block_index);

        let mut u = prf.mac(&message);
        let mut acc = u.words().to_vec();
        for _ in 1..iterations {
            u = prf.mac(&u);
            xor_into(&mut acc, &u);
        }

        out.append(&BitArray::from_words(acc));
        block_index += 1;
    }

    out.clamp(length);
    Ok(out)
}

/// PBKDF2-HMAC-SHA256 over a UTF-8 password.
pub fn pbkdf2_sha256(
    password: &str,
    salt: &BitArray,
    iterations: u32,
    length: usize,
) -> Result<BitArray> {
    pbkdf2::<Sha256>(&utf8::to_bits(password), salt, iterations, Some(length))
}

/// A resumable PBKDF2 derivation.
///
/// # Example
///
/// ```
/// use oxinote_core::codec::utf8;
/// use oxinote_hash::{Pbkdf2Step, Sha256, pbkdf2};
///
/// let password = utf8::to_bits("password");
/// let salt = utf8::to_bits("salt");
///
/// let mut job = Pbkdf2Step::<Sha256>::new(&password, &salt, 2000, Some(256)).unwrap();
/// let key = loop {
///     if let Some(key) = job.step(300) {
///         break key;
///     }
/// };
/// assert_eq!(key, pbkdf2::<Sha256>(&password, &salt, 2000, Some(256)).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct Pbkdf2Step<D: Digest> {
    prf: Hmac<D>,
    salt: BitArray,
    iterations: u32,
    length: usize,
    out: BitArray,
    block_index: u32,
    round: u32,
    u: BitArray,
    acc: Vec<u32>,
    completed: u64,
}

impl<D: Digest> Pbkdf2Step<D> {
    /// Prepare a derivation without running any iterations.
    ///
    /// # Errors
    ///
    /// [`OxiNoteError::InvalidParameter`] if `iterations` or `length` is zero.
    pub fn new(
        password: &BitArray,
        salt: &BitArray,
        iterations: u32,
        length: Option<usize>,
    ) -> Result<Self> {
        validate(iterations, length)?;
        Ok(Self {
            prf: Hmac::new(password),
            salt: salt.clone(),
            iterations,
            length: length.unwrap_or(D::OUTPUT_BITS),
            out: BitArray::new(),
            block_index: 1,
            round: 0,
            u: BitArray::new(),
            acc: Vec::new(),
            completed: 0,
        })
    }

    /// Total PRF invocations the derivation needs.
    pub fn total_iterations(&self) -> u64 {
        self.length.div_ceil(D::OUTPUT_BITS) as u64 * self.iterations as u64
    }

    /// Fraction of the work done, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        self.completed as f64 / self.total_iterations() as f64
    }

    /// Whether every output block has been produced.
    pub fn is_done(&self) -> bool {
        self.out.bit_length() >= self.length
    }

    /// Run at most `budget` PRF iterations (at least one).
    ///
    /// Returns the derived key once the final iteration has run; calling
    /// again after that returns the same key without further work.
    pub fn step(&mut self, budget: u32) -> Option<BitArray> {
        let mut budget = budget.max(1);
        while !self.is_done() && budget > 0 {
            if self.round == 0 {
                let mut message = self.salt.clone();
                message.push_word(self.block_index);
                self.u = self.prf.mac(&message);
                self.acc = self.u.words().to_vec();
            } else {
                self.u = self.prf.mac(&self.u);
                xor_into(&mut self.acc, &self.u);
            }
            self.round += 1;
            self.completed += 1;
            budget -= 1;

            if self.round == self.iterations {
                self.out
                    .append(&BitArray::from_words(std::mem::take(&mut self.acc)));
                self.block_index += 1;
                self.round = 0;
            }
        }

        if self.is_done() {
            tracing::trace!(
                iterations = self.iterations,
                bits = self.length,
                "pbkdf2 derivation complete"
            );
            Some(self.out.clone().clamped(self.length))
        } else {
            None
        }
    }

    /// Run the remaining iterations and return the key.
    pub fn finish(mut self) -> BitArray {
        loop {
            if let Some(key) = self.step(u32::MAX) {
                return key;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxinote_core::codec::hex;

    fn derive(iterations: u32, bytes: usize) -> String {
        let key = pbkdf2_sha256("password", &utf8::to_bits("salt"), iterations, bytes * 8).unwrap();
        hex::from_bits(&key)
    }

    #[test]
    fn test_pbkdf2_sha256_vectors() {
        assert_eq!(
            derive(1, 32),
            "120fb6cffcf8b32c43e7225256c4f837a86548c92ccc35480805987cb70be17b"
        );
        assert_eq!(
            derive(2, 32),
            "ae4d0c95af6b46d32d0adff928f06dd02a303f8ef3c251dfd6e2d85a95474c43"
        );
        assert_eq!(
            derive(4096, 32),
            "c5e478d59288c841aa530db6845c4c8d962893a001ce4e11a4963873aa98134a"
        );
    }

    #[test]
    fn test_pbkdf2_multi_block_truncation() {
        let key = pbkdf2_sha256(
            "passwordPASSWORDpassword",
            &utf8::to_bits("saltSALTsaltSALTsaltSALTsaltSALTsalt"),
            4096,
            320,
        )
        .unwrap();
        assert_eq!(
            hex::from_bits(&key),
            "348c89dbcbd32b2f32d814b8116e84cf2b17347ebc1800181c4e2a1fb8dd53e1c635518c7dac47e9"
        );
    }

    #[test]
    fn test_pbkdf2_default_length_is_one_block() {
        let key = pbkdf2::<Sha256>(&utf8::to_bits("pw"), &utf8::to_bits("salt"), 10, None).unwrap();
        assert_eq!(key.bit_length(), 256);
    }

    #[test]
    fn test_pbkdf2_rejects_zero_parameters() {
        let salt = utf8::to_bits("salt");
        assert!(matches!(
            pbkdf2_sha256("pw", &salt, 0, 128),
            Err(OxiNoteError::InvalidParameter { .. })
        ));
        assert!(matches!(
            pbkdf2_sha256("pw", &salt, 10, 0),
            Err(OxiNoteError::InvalidParameter { .. })
        ));
        assert!(Pbkdf2Step::<Sha256>::new(&salt, &salt, 0, None).is_err());
    }

    #[test]
    fn test_step_matches_one_shot_for_any_budget() {
        let password = utf8::to_bits("password");
        let salt = utf8::to_bits("salt");
        let expected = pbkdf2::<Sha256>(&password, &salt, 1000, Some(384)).unwrap();

        for budget in [1, 7, 999, 1000, 1001, 5000] {
            let mut job = Pbkdf2Step::<Sha256>::new(&password, &salt, 1000, Some(384)).unwrap();
            let mut calls = 0;
            let key = loop {
                calls += 1;
                if let Some(key) = job.step(budget) {
                    break key;
                }
            };
            assert_eq!(key, expected, "budget {budget}");
            assert!(calls >= 2000usize.div_ceil(budget as usize));
            assert_eq!(job.progress(), 1.0);
        }
    }

    #[test]
    fn test_step_progress_is_monotonic() {
        let mut job =
            Pbkdf2Step::<Sha256>::new(&utf8::to_bits("pw"), &utf8::to_bits("s"), 100, Some(128))
                .unwrap();
        assert_eq!(job.total_iterations(), 100);
        assert_eq!(job.progress(), 0.0);
        assert!(job.step(25).is_none());
        assert!((job.progress() - 0.25).abs() < 1e-9);
        let key = job.clone().finish();
        assert_eq!(key.bit_length(), 128);
        assert!(job.step(75).is_some());
    }
}
