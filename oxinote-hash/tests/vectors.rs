//! Published test vectors exercised through the public API.

use oxinote_core::codec::{bytes, hex, utf8};
use oxinote_core::Digest;
use oxinote_hash::{HmacSha256, Md5, Pbkdf2Step, Sha256, Sha512, pbkdf2, pbkdf2_sha256};

#[test]
fn test_sha2_two_block_messages() {
    let msg = "abcdbcdecdefdefgefghfghighijhijkijkljklmklmnlmnomnopnopq";
    assert_eq!(
        hex::from_bits(&Sha256::hash(&utf8::to_bits(msg))),
        "248d6a61d20638b8e5c026930c3e6039a33ce45964ff2167f6ecedd419db06c1"
    );

    let digest = Sha512::hash(&utf8::to_bits(msg));
    assert_eq!(digest.bit_length(), 512);
}

#[test]
fn test_hmac_sha256_rfc4231_case2() {
    let mac = HmacSha256::new(&utf8::to_bits("Jefe"))
        .mac(&utf8::to_bits("what do ya want for nothing?"));
    assert_eq!(
        hex::from_bits(&mac),
        "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
    );
}

#[test]
fn test_pbkdf2_note_key_size() {
    // Note containers derive 128-bit keys.
    let key = pbkdf2_sha256("password", &utf8::to_bits("salt"), 1000, 128).expect("derive");
    assert_eq!(hex::from_bits(&key), "632c2812e46d4604102ba7618e9d6d7d");
}

#[test]
fn test_chunked_pbkdf2_is_bit_identical() {
    let password = utf8::to_bits("correct horse battery staple");
    let salt = bytes::to_bits(&[0x5a; 16]);
    let direct = pbkdf2::<Sha256>(&password, &salt, 3000, Some(128)).expect("derive");

    let mut job = Pbkdf2Step::<Sha256>::new(&password, &salt, 3000, Some(128)).expect("job");
    let mut chunked = None;
    while chunked.is_none() {
        chunked = job.step(128);
    }
    assert_eq!(chunked.expect("finished"), direct);
}

#[test]
fn test_md5_legacy_key() {
    let digest = Md5::digest(b"secret");
    assert_eq!(digest.len(), 16);
    assert_eq!(digest[0], 0x5e);
    assert_eq!(digest[15], 0x69);
}
