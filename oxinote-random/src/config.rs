//! Generator configuration.

/// Tunables for [`Prng`](crate::Prng).
///
/// # Example
///
/// ```
/// use oxinote_random::PrngConfig;
///
/// let config = PrngConfig::STANDARD.with_default_paranoia(0);
/// assert_eq!(config.entropy_required(None), 0);
/// assert_eq!(config.entropy_required(Some(10)), 1024);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrngConfig {
    /// Paranoia level used when a call does not name one.
    pub default_paranoia: usize,
    /// Words generated before the output cipher is rekeyed mid-request.
    pub max_words_per_burst: usize,
    /// Minimum time between reseeds triggered by pool 0.
    pub millis_per_reseed: u64,
    /// Entropy pool 0 must exceed before a timed reseed.
    pub bits_per_reseed: u64,
    /// Entropy in bits required at each paranoia level.
    pub paranoia_levels: [u64; 11],
}

impl PrngConfig {
    /// Paranoia level 6 (256 bits), 64 Ki-word bursts, reseed every 30 s.
    pub const STANDARD: Self = Self {
        default_paranoia: 6,
        max_words_per_burst: 65536,
        millis_per_reseed: 30_000,
        bits_per_reseed: 80,
        paranoia_levels: [0, 48, 64, 96, 128, 192, 256, 384, 512, 768, 1024],
    };

    /// Same configuration with a different default paranoia level.
    pub const fn with_default_paranoia(mut self, paranoia: usize) -> Self {
        self.default_paranoia = paranoia;
        self
    }

    /// Entropy required at `paranoia`, or at the default level for `None`.
    ///
    /// Levels above the table saturate at the highest threshold.
    pub fn entropy_required(&self, paranoia: Option<usize>) -> u64 {
        let level = paranoia.unwrap_or(self.default_paranoia);
        let last = self.paranoia_levels.len() - 1;
        self.paranoia_levels[level.min(last)]
    }
}

impl Default for PrngConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}
