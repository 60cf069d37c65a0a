//! # OxiNote Random
//!
//! A Fortuna-style cryptographically secure generator for keys, salts and
//! IVs.
//!
//! - [`Prng`]: entropy pools, AES-256 counter-mode output, paranoia levels
//! - [`RandomSource`]: the seam consumers draw random words through
//! - [`SystemRandom`] / [`global`]: a process-wide generator seeded from
//!   the operating system on first use
//!
//! ## Example
//!
//! ```rust
//! use oxinote_random::{Prng, PrngConfig, Readiness};
//!
//! let mut prng = Prng::new(PrngConfig::STANDARD);
//! assert_eq!(prng.is_ready(None), Readiness::NotReady);
//!
//! prng.add_entropy(vec![0x1234_5678; 8], Some(256), "example");
//! assert_eq!(prng.is_ready(None), Readiness::Ready);
//!
//! let words = prng.random_words(4, None).unwrap();
//! assert_eq!(words.len(), 4);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod config;
pub mod prng;
pub mod source;

pub use config::PrngConfig;
pub use prng::{Entropy, ObserverId, Prng, Readiness};
pub use source::{RandomSource, SystemRandom, global, init, lock_global, seed_from_os};
