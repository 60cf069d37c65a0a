//! Random sources and the process-wide generator.

use crate::config::PrngConfig;
use crate::prng::{Entropy, Prng};
use oxinote_core::{BitArray, Result};
use rand::RngCore;
use rand::rngs::OsRng;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};
use tracing::{debug, warn};

/// Anything that can produce random words for key and IV generation.
pub trait RandomSource {
    /// Generate `count` random words at `paranoia`, or at the source's
    /// default level for `None`.
    fn random_words(&mut self, count: usize, paranoia: Option<usize>) -> Result<Vec<u32>>;

    /// Generate `count` random words as a [`BitArray`].
    fn random_bits(&mut self, count: usize, paranoia: Option<usize>) -> Result<BitArray> {
        self.random_words(count, paranoia).map(BitArray::from_words)
    }
}

impl RandomSource for Prng {
    fn random_words(&mut self, count: usize, paranoia: Option<usize>) -> Result<Vec<u32>> {
        Prng::random_words(self, count, paranoia)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn random_words(&mut self, count: usize, paranoia: Option<usize>) -> Result<Vec<u32>> {
        (**self).random_words(count, paranoia)
    }
}

/// Words of operating-system randomness used to seed the global generator.
const OS_SEED_WORDS: usize = 32;

static GLOBAL: OnceLock<Mutex<Prng>> = OnceLock::new();

/// Feed [`OS_SEED_WORDS`] words of operating-system randomness into
/// `prng`, credited as 1024 bits.
pub fn seed_from_os(prng: &mut Prng) {
    let mut bytes = [0u8; OS_SEED_WORDS * 4];
    if let Err(err) = OsRng.try_fill_bytes(&mut bytes) {
        warn!(%err, "os randomness unavailable, seeding from thread rng");
        rand::thread_rng().fill_bytes(&mut bytes);
    }
    let words: Vec<u32> = bytes
        .chunks_exact(4)
        .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    bytes.fill(0);
    prng.add_entropy(Entropy::Words(words), Some(1024), "os");
}

/// The process-wide generator, created and seeded on first use.
pub fn global() -> &'static Mutex<Prng> {
    GLOBAL.get_or_init(|| {
        let mut prng = Prng::new(PrngConfig::STANDARD);
        seed_from_os(&mut prng);
        debug!("global generator initialized");
        Mutex::new(prng)
    })
}

/// Initialize the process-wide generator now rather than on first use.
pub fn init() {
    global();
}

/// Lock the process-wide generator.
///
/// A panic while the lock was held leaves the generator in a usable
/// state, so poisoning is ignored.
pub fn lock_global() -> MutexGuard<'static, Prng> {
    global().lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle to the process-wide generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRandom;

impl RandomSource for SystemRandom {
    fn random_words(&mut self, count: usize, paranoia: Option<usize>) -> Result<Vec<u32>> {
        lock_global().random_words(count, paranoia)
    }
}
