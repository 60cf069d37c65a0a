//! Derive command implementation.

use crate::utils::{create_progress_bar, password};
use oxinote_core::BitArray;
use oxinote_core::codec::{hex, utf8};
use oxinote_hash::{Pbkdf2Step, Sha256};

/// PRF iterations run between progress updates.
const STEP_BUDGET: u32 = 1000;

/// Run a derivation in slices, reporting progress after each one.
pub fn derive_key(
    password: &str,
    salt: &BitArray,
    iterations: u32,
    length: usize,
    mut on_progress: impl FnMut(u64),
) -> Result<BitArray, Box<dyn std::error::Error>> {
    let mut step =
        Pbkdf2Step::<Sha256>::new(&utf8::to_bits(password), salt, iterations, Some(length))?;
    let mut done = 0u64;
    loop {
        let key = step.step(STEP_BUDGET);
        let total = step.total_iterations();
        done = (done + u64::from(STEP_BUDGET)).min(total);
        on_progress(done);
        if let Some(key) = key {
            return Ok(key);
        }
    }
}

pub fn cmd_derive(
    salt: &str,
    iterations: u32,
    length: usize,
    progress: bool,
    given: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let salt = hex::to_bits(salt)?;
    let password = password(given, false)?;

    let total = length.div_ceil(256) as u64 * u64::from(iterations);
    let pb = create_progress_bar(total, progress);
    let key = derive_key(&password, &salt, iterations, length, |done| pb.set_position(done))?;
    pb.finish_and_clear();

    println!("{}", hex::from_bits(&key));
    Ok(())
}
