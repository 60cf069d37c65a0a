//! Generator behaviour through the public API.

use oxinote_core::OxiNoteError;
use oxinote_random::{Prng, PrngConfig, RandomSource, Readiness};
use proptest::prelude::*;

fn fixed_clock() -> u64 {
    1_700_000_000_000
}

fn seeded(seed: u64) -> Prng {
    let mut prng = Prng::with_seed(PrngConfig::STANDARD, seed).with_clock(fixed_clock);
    prng.add_entropy(vec![0x0bad_f00d; 16], Some(1024), "test");
    prng
}

#[test]
fn requests_fail_until_seeded() {
    let mut prng = Prng::with_seed(PrngConfig::STANDARD, 0).with_clock(fixed_clock);
    assert_eq!(prng.random_words(1, None), Err(OxiNoteError::GeneratorNotSeeded));

    prng.add_entropy(vec![1, 2], Some(48), "mouse");
    assert_eq!(prng.is_ready(Some(1)), Readiness::Ready);
    assert_eq!(prng.is_ready(Some(2)), Readiness::NotReady);
    assert!(prng.random_words(4, Some(1)).is_ok());
    assert_eq!(prng.random_words(4, Some(2)), Err(OxiNoteError::GeneratorNotSeeded));
}

#[test]
fn different_local_seeds_diverge() {
    let a = seeded(1).random_words(8, None).expect("ready");
    let b = seeded(2).random_words(8, None).expect("ready");
    assert_ne!(a, b);
}

#[test]
fn long_requests_cross_burst_boundaries() {
    let config = PrngConfig {
        max_words_per_burst: 8,
        ..PrngConfig::STANDARD
    };
    let mut prng = Prng::with_seed(config, 9).with_clock(fixed_clock);
    prng.add_entropy("enough entropy for a test", Some(512), "text");

    let words = prng.random_words(40, None).expect("ready");
    assert_eq!(words.len(), 40);
    // Rekeying between bursts makes every block distinct.
    let blocks: Vec<&[u32]> = words.chunks(4).collect();
    for (i, a) in blocks.iter().enumerate() {
        for b in &blocks[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn default_paranoia_can_be_lowered() {
    let mut prng = Prng::with_seed(PrngConfig::STANDARD, 4).with_clock(fixed_clock);
    prng.add_entropy(3u32, Some(64), "test");
    assert_eq!(prng.is_ready(None), Readiness::NotReady);
    prng.set_default_paranoia(2);
    assert_eq!(prng.is_ready(None), Readiness::Ready);
    assert_eq!(prng.random_bits(2, None).expect("ready").bit_length(), 64);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn output_has_requested_length(count in 0usize..200) {
        let mut prng = seeded(5);
        prop_assert_eq!(prng.random_words(count, None).expect("ready").len(), count);
    }
}
