//! Memoized PBKDF2 for envelope passwords.

use oxinote_core::codec::utf8;
use oxinote_core::{BitArray, Result};
use oxinote_hash::{Sha256, pbkdf2};
use std::collections::HashMap;
use tracing::{debug, trace};
use zeroize::Zeroize;

type SaltKey = (Vec<u32>, usize);

fn salt_key(salt: &BitArray) -> SaltKey {
    (salt.words().to_vec(), salt.bit_length())
}

#[derive(Default)]
struct Slot {
    first_salt: Option<BitArray>,
    keys: HashMap<SaltKey, BitArray>,
}

/// Derived keys by password, iteration count and salt.
///
/// Each `(password, iterations)` pair remembers the first salt it saw;
/// callers that supply no salt get that one back, so repeated encryptions
/// under one password stretch it only once.
#[derive(Default)]
pub struct Pbkdf2Cache {
    entries: HashMap<(String, u32), Slot>,
}

impl Pbkdf2Cache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of derived keys held.
    pub fn len(&self) -> usize {
        self.entries.values().map(|slot| slot.keys.len()).sum()
    }

    /// Whether no keys are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The salt used when none is supplied for this pair, if one is known.
    pub fn first_salt(&self, password: &str, iterations: u32) -> Option<&BitArray> {
        self.entries
            .get(&(password.to_string(), iterations))
            .and_then(|slot| slot.first_salt.as_ref())
    }

    /// Derive (or recall) a 256-bit key, returning it with the salt used.
    ///
    /// `fresh_salt` supplies the salt when none is given and this pair has
    /// no first salt yet.
    pub fn derive(
        &mut self,
        password: &str,
        iterations: u32,
        salt: Option<&BitArray>,
        fresh_salt: impl FnOnce() -> Result<BitArray>,
    ) -> Result<(BitArray, BitArray)> {
        let slot = self
            .entries
            .entry((password.to_string(), iterations))
            .or_default();

        let first = match &slot.first_salt {
            Some(first) => first.clone(),
            None => {
                let first = match salt {
                    Some(salt) => salt.clone(),
                    None => fresh_salt()?,
                };
                slot.first_salt = Some(first.clone());
                first
            }
        };
        let salt = salt.cloned().unwrap_or(first);

        let key = match slot.keys.get(&salt_key(&salt)) {
            Some(key) => {
                trace!(iterations, "pbkdf2 cache hit");
                key.clone()
            }
            None => {
                debug!(iterations, "pbkdf2 cache miss");
                let key = pbkdf2::<Sha256>(&utf8::to_bits(password), &salt, iterations, None)?;
                slot.keys.insert(salt_key(&salt), key.clone());
                key
            }
        };
        Ok((key, salt))
    }

    /// Forget every password and key.
    pub fn clear(&mut self) {
        for ((mut password, _), mut slot) in self.entries.drain() {
            password.zeroize();
            for (_, mut key) in slot.keys.drain() {
                key.zeroize();
            }
        }
    }
}

impl Drop for Pbkdf2Cache {
    fn drop(&mut self) {
        self.clear();
    }
}

impl std::fmt::Debug for Pbkdf2Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pbkdf2Cache")
            .field("keys", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxinote_core::OxiNoteError;
    use oxinote_hash::pbkdf2_sha256;

    fn no_salt() -> Result<BitArray> {
        Err(OxiNoteError::invalid_parameter("no salt"))
    }

    #[test]
    fn test_derives_full_digest() {
        let mut cache = Pbkdf2Cache::new();
        let salt = BitArray::from([1, 2]);
        let (key, used) = cache.derive("pw", 200, Some(&salt), no_salt).expect("derive");
        assert_eq!(used, salt);
        assert_eq!(key, pbkdf2_sha256("pw", &salt, 200, 256).expect("pbkdf2"));
    }

    #[test]
    fn test_first_salt_is_reused() {
        let mut cache = Pbkdf2Cache::new();
        let (k1, s1) = cache
            .derive("pw", 200, None, || Ok(BitArray::from([9, 9])))
            .expect("derive");
        let (k2, s2) = cache.derive("pw", 200, None, no_salt).expect("cached");
        assert_eq!(s1, BitArray::from([9, 9]));
        assert_eq!((k1, s1), (k2, s2));
        assert_eq!(cache.len(), 1);

        // A different iteration count is a different slot.
        assert!(cache.derive("pw", 201, None, no_salt).is_err());
    }

    #[test]
    fn test_empty_salt_is_used_as_given() {
        let mut cache = Pbkdf2Cache::new();
        cache
            .derive("pw", 200, Some(&BitArray::from([7])), no_salt)
            .expect("first");
        let empty = BitArray::new();
        let (key, used) = cache.derive("pw", 200, Some(&empty), no_salt).expect("empty");
        assert_eq!(used, empty);
        assert_eq!(key, pbkdf2_sha256("pw", &empty, 200, 256).expect("pbkdf2"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_distinct_salts() {
        let mut cache = Pbkdf2Cache::new();
        let (a, _) = cache.derive("pw", 200, Some(&BitArray::from([1])), no_salt).expect("a");
        let (b, _) = cache.derive("pw", 200, Some(&BitArray::from([2])), no_salt).expect("b");
        assert_ne!(a, b);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.first_salt("pw", 200), Some(&BitArray::from([1])));

        cache.clear();
        assert!(cache.is_empty());
    }
}
