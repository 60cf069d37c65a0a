//! Fortuna-style generator with entropy pools.
//!
//! Entropy events are hashed into a growing list of SHA-256 pools, chosen
//! round-robin per source. A reseed finalizes pool 0 every time, pool 1
//! every second time, pool 2 every fourth time and so on; a new pool is
//! appended once the highest existing pool has taken part in a reseed.
//! Output is AES-256 in counter mode under a key derived from the pools,
//! and the key is replaced with fresh output after every request.

use crate::config::PrngConfig;
use oxinote_cipher::Aes;
use oxinote_core::{BitArray, Block, BlockCipher, Digest, OxiNoteError, Result};
use oxinote_hash::Sha256;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::collections::HashMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, trace};
use zeroize::Zeroize;

/// A unit of entropy fed to [`Prng::add_entropy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entropy {
    /// A single 32-bit sample, such as a timestamp.
    Word(u32),
    /// Several 32-bit samples, such as pointer coordinates.
    Words(Vec<u32>),
    /// Free text.
    Text(String),
}

impl Entropy {
    /// Estimate used when the caller does not supply one.
    ///
    /// One bit for a word, the sum of significant bit widths for a word
    /// list, one bit per UTF-16 unit for text.
    pub fn default_estimate(&self) -> u64 {
        match self {
            Entropy::Word(_) => 1,
            Entropy::Words(words) => words.iter().map(|w| 32 - w.leading_zeros() as u64).sum(),
            Entropy::Text(text) => text.encode_utf16().count() as u64,
        }
    }
}

impl From<u32> for Entropy {
    fn from(value: u32) -> Self {
        Entropy::Word(value)
    }
}

impl From<Vec<u32>> for Entropy {
    fn from(value: Vec<u32>) -> Self {
        Entropy::Words(value)
    }
}

impl From<&[u32]> for Entropy {
    fn from(value: &[u32]) -> Self {
        Entropy::Words(value.to_vec())
    }
}

impl From<&str> for Entropy {
    fn from(value: &str) -> Self {
        Entropy::Text(value.to_string())
    }
}

impl From<String> for Entropy {
    fn from(value: String) -> Self {
        Entropy::Text(value)
    }
}

/// Whether the generator can serve a request at a given paranoia level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Not enough entropy; [`Prng::random_words`] fails.
    NotReady,
    /// Enough entropy, either already in the key or waiting in the pools.
    Ready,
    /// Seeded, and the next request will reseed from the pools first.
    RequiresReseed,
}

/// Internal readiness, distinguishing how a request would be served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Unseeded,
    /// Pools hold enough entropy but the key does not; reseed from all pools.
    PoolsReady,
    Seeded,
    /// Seeded, and pool 0 plus elapsed time call for a partial reseed.
    ReseedDue,
}

impl From<State> for Readiness {
    fn from(state: State) -> Self {
        match state {
            State::Unseeded => Readiness::NotReady,
            State::PoolsReady | State::Seeded => Readiness::Ready,
            State::ReseedDue => Readiness::RequiresReseed,
        }
    }
}

/// Handle returned when registering an observer.
pub type ObserverId = usize;

enum Observer {
    Seeded(Box<dyn FnMut(u64) + Send>),
    Progress(Box<dyn FnMut(f64) + Send>),
}

fn system_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// The entropy-pool generator.
pub struct Prng {
    config: PrngConfig,

    pools: Vec<Sha256>,
    pool_entropy: Vec<u64>,
    reseed_count: u64,
    robins: HashMap<String, usize>,
    collector_ids: HashMap<String, u32>,
    event_id: u32,

    strength: u64,
    pool_strength: u64,
    next_reseed: u64,

    key: [u32; 8],
    counter: Block,
    cipher: Aes,

    /// Process-local randomness stirred into every reseed.
    local: StdRng,
    clock: fn() -> u64,

    observers: Vec<(ObserverId, Observer)>,
    next_observer: ObserverId,
}

impl Prng {
    /// Create an unseeded generator.
    pub fn new(config: PrngConfig) -> Self {
        Self::with_local_rng(config, StdRng::from_entropy())
    }

    /// Create an unseeded generator whose process-local randomness is
    /// derived from `seed`.
    ///
    /// With a fixed clock and the same entropy events, two such generators
    /// produce identical output; use this in tests only.
    pub fn with_seed(config: PrngConfig, seed: u64) -> Self {
        Self::with_local_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_local_rng(config: PrngConfig, local: StdRng) -> Self {
        let key = [0u32; 8];
        Self {
            config,
            pools: vec![Sha256::new()],
            pool_entropy: vec![0],
            reseed_count: 0,
            robins: HashMap::new(),
            collector_ids: HashMap::new(),
            event_id: 0,
            strength: 0,
            pool_strength: 0,
            next_reseed: 0,
            cipher: Aes::from_words_256(&key),
            key,
            counter: [0; 4],
            local,
            clock: system_millis,
            observers: Vec::new(),
            next_observer: 0,
        }
    }

    /// Replace the millisecond clock used for timestamps and reseed timing.
    pub fn with_clock(mut self, clock: fn() -> u64) -> Self {
        self.clock = clock;
        self
    }

    /// Current configuration.
    pub fn config(&self) -> &PrngConfig {
        &self.config
    }

    /// Change the paranoia level used when a call does not name one.
    pub fn set_default_paranoia(&mut self, paranoia: usize) {
        self.config.default_paranoia = paranoia;
    }

    /// Number of entropy pools.
    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    /// Number of reseeds so far.
    pub fn reseed_count(&self) -> u64 {
        self.reseed_count
    }

    /// Feed an entropy sample into the pool that `source` is due to use.
    ///
    /// `estimate` is the caller's guess of the sample's entropy in bits;
    /// `None` uses [`Entropy::default_estimate`].
    pub fn add_entropy(&mut self, data: impl Into<Entropy>, estimate: Option<u64>, source: &str) {
        let data = data.into();
        let t = (self.clock)() as u32;
        let was_unseeded = self.state(None) == State::Unseeded;

        let next_id = self.collector_ids.len() as u32;
        let id = *self.collector_ids.entry(source.to_string()).or_insert(next_id);
        let robin_slot = self.robins.entry(source.to_string()).or_insert(0);
        let robin = *robin_slot;
        *robin_slot = (robin + 1) % self.pools.len();

        let estimate = estimate.unwrap_or_else(|| data.default_estimate());
        let event = self.event_id;
        self.event_id = self.event_id.wrapping_add(1);
        let est = u32::try_from(estimate).unwrap_or(u32::MAX);

        let pool = &mut self.pools[robin];
        match &data {
            Entropy::Word(word) => {
                pool.update(&BitArray::from_words(vec![id, event, 1, est, t, 1, *word]));
            }
            Entropy::Words(words) => {
                let mut record = vec![id, event, 2, est, t, words.len() as u32];
                record.extend_from_slice(words);
                pool.update(&BitArray::from_words(record));
            }
            Entropy::Text(text) => {
                let len = text.encode_utf16().count() as u32;
                pool.update(&BitArray::from_words(vec![id, event, 3, est, t, len]));
                pool.update_text(text);
            }
        }

        self.pool_entropy[robin] = self.pool_entropy[robin].saturating_add(estimate);
        self.pool_strength = self.pool_strength.saturating_add(estimate);
        trace!(source, estimate, pool = robin, "entropy added");

        if was_unseeded {
            if self.state(None) != State::Unseeded {
                let strength = self.strength.max(self.pool_strength);
                debug!(strength, "generator seeded");
                self.fire_seeded(strength);
            }
            let progress = self.progress(None);
            self.fire_progress(progress);
        }
    }

    fn state(&self, paranoia: Option<usize>) -> State {
        let required = self.config.entropy_required(paranoia);
        if self.strength > 0 && self.strength >= required {
            if self.pool_entropy[0] > self.config.bits_per_reseed
                && (self.clock)() > self.next_reseed
            {
                State::ReseedDue
            } else {
                State::Seeded
            }
        } else if self.pool_strength > 0 && self.pool_strength >= required {
            State::PoolsReady
        } else {
            State::Unseeded
        }
    }

    /// Readiness at `paranoia`, or at the default level for `None`.
    pub fn is_ready(&self, paranoia: Option<usize>) -> Readiness {
        self.state(paranoia).into()
    }

    /// Progress toward readiness as a fraction in `[0, 1]`.
    pub fn progress(&self, paranoia: Option<usize>) -> f64 {
        let required = self.config.entropy_required(paranoia);
        if self.strength >= required || self.pool_strength > required {
            1.0
        } else {
            self.pool_strength as f64 / required as f64
        }
    }

    /// Generate `count` random words.
    ///
    /// # Errors
    ///
    /// [`OxiNoteError::GeneratorNotSeeded`] if the generator is not ready
    /// at `paranoia`.
    pub fn random_words(&mut self, count: usize, paranoia: Option<usize>) -> Result<Vec<u32>> {
        match self.state(paranoia) {
            State::Unseeded => return Err(OxiNoteError::GeneratorNotSeeded),
            State::PoolsReady => self.reseed_from_pools(true),
            State::ReseedDue => self.reseed_from_pools(false),
            State::Seeded => {}
        }

        let burst = self.config.max_words_per_burst.max(4);
        let mut out = Vec::with_capacity(count.div_ceil(4) * 4);
        let mut i = 0;
        while i < count {
            if i > 0 && i % burst == 0 {
                self.gate();
            }
            out.extend_from_slice(&self.gen4words());
            i += 4;
        }
        self.gate();

        out.truncate(count);
        Ok(out)
    }

    /// Register a callback run once the generator first becomes ready.
    ///
    /// The argument is the entropy available at that point, in bits.
    pub fn on_seeded(&mut self, callback: impl FnMut(u64) + Send + 'static) -> ObserverId {
        self.add_observer(Observer::Seeded(Box::new(callback)))
    }

    /// Register a callback run with [`Prng::progress`] after every entropy
    /// sample that arrives while the generator is not ready.
    pub fn on_progress(&mut self, callback: impl FnMut(f64) + Send + 'static) -> ObserverId {
        self.add_observer(Observer::Progress(Box::new(callback)))
    }

    /// Unregister an observer. Returns whether it was registered.
    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        self.observers.len() != before
    }

    fn add_observer(&mut self, observer: Observer) -> ObserverId {
        let id = self.next_observer;
        self.next_observer += 1;
        self.observers.push((id, observer));
        id
    }

    fn fire_seeded(&mut self, strength: u64) {
        for (_, observer) in &mut self.observers {
            if let Observer::Seeded(callback) = observer {
                callback(strength);
            }
        }
    }

    fn fire_progress(&mut self, progress: f64) {
        for (_, observer) in &mut self.observers {
            if let Observer::Progress(callback) = observer {
                callback(progress);
            }
        }
    }

    /// Next counter block, no reseed and no rekey.
    fn gen4words(&mut self) -> Block {
        for word in self.counter.iter_mut() {
            *word = word.wrapping_add(1);
            if *word != 0 {
                break;
            }
        }
        self.cipher.encrypt_block(&self.counter)
    }

    /// Rekey the output cipher with its own output.
    fn gate(&mut self) {
        let a = self.gen4words();
        let b = self.gen4words();
        self.key[..4].copy_from_slice(&a);
        self.key[4..].copy_from_slice(&b);
        self.cipher = Aes::from_words_256(&self.key);
    }

    fn reseed(&mut self, seed: &BitArray) {
        let mut input = BitArray::from_words(self.key.to_vec());
        input.append(seed);
        let digest = Sha256::hash(&input);
        for (dst, src) in self.key.iter_mut().zip(digest.words()) {
            *dst = *src;
        }
        input.zeroize();

        self.cipher = Aes::from_words_256(&self.key);
        for word in self.counter.iter_mut() {
            *word = word.wrapping_add(1);
            if *word != 0 {
                break;
            }
        }
    }

    fn reseed_from_pools(&mut self, full: bool) {
        self.next_reseed = (self.clock)() + self.config.millis_per_reseed;

        let mut data = BitArray::from_words(vec![self.next_reseed as u32]);
        for _ in 0..16 {
            data.push_word(self.local.next_u32());
        }

        let mut strength = 0u64;
        for i in 0..self.pools.len() {
            data.append(&self.pools[i].finalize());
            strength = strength.saturating_add(self.pool_entropy[i]);
            self.pool_entropy[i] = 0;

            let used_last_time = self.reseed_count.checked_shr(i as u32).unwrap_or(0) & 1 != 0;
            if !full && used_last_time {
                break;
            }
        }

        // every pool has now been drawn on at least once; add another
        if 1u64
            .checked_shl(self.pools.len() as u32)
            .is_some_and(|limit| self.reseed_count >= limit)
        {
            self.pools.push(Sha256::new());
            self.pool_entropy.push(0);
        }

        self.pool_strength = self.pool_strength.saturating_sub(strength);
        self.strength = self.strength.max(strength);
        self.reseed_count += 1;
        self.reseed(&data);
        data.zeroize();

        debug!(
            full,
            strength,
            pools = self.pools.len(),
            reseeds = self.reseed_count,
            "generator reseeded"
        );
    }
}

impl Drop for Prng {
    fn drop(&mut self) {
        self.key.zeroize();
        self.counter.zeroize();
    }
}

impl fmt::Debug for Prng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Prng")
            .field("pools", &self.pools.len())
            .field("reseed_count", &self.reseed_count)
            .field("strength", &self.strength)
            .field("pool_strength", &self.pool_strength)
            .finish_non_exhaustive()
    }
}
