//! HMAC (RFC 2104) over any [`Digest`].

use oxinote_core::{BitArray, Digest};
use zeroize::Zeroize;

/// Inner pad byte repeated across a word.
const IPAD: u32 = 0x3636_3636;
/// Outer pad byte repeated across a word.
const OPAD: u32 = 0x5c5c_5c5c;

/// A keyed HMAC instance.
///
/// The padded key is absorbed once at construction; every MAC computation
/// starts from clones of those primed contexts. The primed contexts are
/// wiped on drop.
///
/// # Example
///
/// ```
/// use oxinote_core::codec::{hex, utf8};
/// use oxinote_hash::{Hmac, Sha256};
///
/// let mac = Hmac::<Sha256>::new(&utf8::to_bits("Jefe"))
///     .mac(&utf8::to_bits("what do ya want for nothing?"));
/// assert_eq!(
///     hex::from_bits(&mac),
///     "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Hmac<D: Digest> {
    inner_base: D,
    outer_base: D,
    inner: D,
}

impl<D: Digest> Hmac<D> {
    /// Key an HMAC instance; keys longer than one block are hashed first.
    pub fn new(key: &BitArray) -> Self {
        let block_words = D::BLOCK_BITS / 32;
        let mut key_words = if key.word_len() > block_words {
            D::hash(key).into_words()
        } else {
            key.words().to_vec()
        };
        key_words.resize(block_words, 0);

        let mut ipad = BitArray::from_words(key_words.iter().map(|w| w ^ IPAD).collect());
        let mut opad = BitArray::from_words(key_words.iter().map(|w| w ^ OPAD).collect());
        key_words.zeroize();

        let mut inner_base = D::new();
        inner_base.update(&ipad);
        let mut outer_base = D::new();
        outer_base.update(&opad);
        ipad.zeroize();
        opad.zeroize();

        Self {
            inner: inner_base.clone(),
            inner_base,
            outer_base,
        }
    }

    /// Compute the MAC of `data` in one call.
    pub fn mac(&self, data: &BitArray) -> BitArray {
        let mut inner = self.inner_base.clone();
        inner.update(data);
        self.wrap(inner.finalize())
    }

    /// Absorb data for a streaming MAC.
    pub fn update(&mut self, data: &BitArray) {
        self.inner.update(data);
    }

    /// Finish a streaming MAC and reset for the next message.
    pub fn digest(&mut self) -> BitArray {
        let inner_hash = self.inner.finalize();
        self.reset();
        self.wrap(inner_hash)
    }

    /// Discard any streamed data.
    pub fn reset(&mut self) {
        self.inner = self.inner_base.clone();
    }

    fn wrap(&self, inner_hash: BitArray) -> BitArray {
        let mut outer = self.outer_base.clone();
        outer.update(&inner_hash);
        outer.finalize()
    }
}

impl<D: Digest> Zeroize for Hmac<D> {
    fn zeroize(&mut self) {
        self.inner_base.zeroize();
        self.outer_base.zeroize();
        self.inner.zeroize();
    }
}

impl<D: Digest> Drop for Hmac<D> {
    fn drop(&mut self) {
        self.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Sha256, Sha512};
    use oxinote_core::codec::{bytes, hex, utf8};

    #[test]
    fn test_rfc4231_case1() {
        let mac = Hmac::<Sha256>::new(&bytes::to_bits(&[0x0b; 20])).mac(&utf8::to_bits("Hi There"));
        assert_eq!(
            hex::from_bits(&mac),
            "b0344c61d8db38535ca8afceaf0bf12b881dc200c9833da726e9376c2e32cff7"
        );
    }

    #[test]
    fn test_rfc4231_case2_sha512() {
        let mac = Hmac::<Sha512>::new(&utf8::to_bits("Jefe"))
            .mac(&utf8::to_bits("what do ya want for nothing?"));
        assert_eq!(
            hex::from_bits(&mac),
            "164b7a7bfcf819e2e395fbe73b56e0a387bd64222e831fd610270cd7ea250554\
             9758bf75c05a994a6d034f65f8f0e6fdcaeab1a34d4a6b4b636e070a38bce737"
        );
    }

    #[test]
    fn test_rfc4231_case6_long_key() {
        let mac = Hmac::<Sha256>::new(&bytes::to_bits(&[0xaa; 131]))
            .mac(&utf8::to_bits("Test Using Larger Than Block-Size Key - Hash Key First"));
        assert_eq!(
            hex::from_bits(&mac),
            "60e431591ee0b67f0d8a26aacbf5b77f8e0bc6213728c5140546040f0ee37f54"
        );
    }

    #[test]
    fn test_zeroize_forgets_key() {
        let key = utf8::to_bits("key");
        let message = utf8::to_bits("message");
        let mut hmac = Hmac::<Sha256>::new(&key);
        let keyed = hmac.mac(&message);

        hmac.zeroize();
        assert_ne!(hmac.mac(&message), keyed);
        assert_eq!(Hmac::<Sha256>::new(&key).mac(&message), keyed);
    }

    #[test]
    fn test_streaming_matches_one_shot() {
        let mut hmac = Hmac::<Sha256>::new(&utf8::to_bits("key"));
        let expected = hmac.mac(&utf8::to_bits("streamed message"));

        hmac.update(&utf8::to_bits("streamed "));
        hmac.update(&utf8::to_bits("message"));
        assert_eq!(hmac.digest(), expected);

        // digest() resets, so a second round gives the same answer
        hmac.update(&utf8::to_bits("streamed message"));
        assert_eq!(hmac.digest(), expected);
    }
}
