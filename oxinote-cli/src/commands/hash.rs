//! Hash command implementation.

use crate::utils::read_input;
use clap::ValueEnum;
use oxinote_core::Digest;
use oxinote_core::codec::{bytes, hex};
use oxinote_hash::{Md5, Sha256, Sha512};
use std::path::Path;

/// Digest algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum HashAlgorithm {
    /// SHA-256
    #[default]
    Sha256,
    /// SHA-512
    Sha512,
    /// MD5 (legacy key derivation only)
    Md5,
}

/// Hex digest of `data`.
pub fn digest_hex(algorithm: HashAlgorithm, data: &[u8]) -> String {
    match algorithm {
        HashAlgorithm::Sha256 => hex::from_bits(&Sha256::hash(&bytes::to_bits(data))),
        HashAlgorithm::Sha512 => hex::from_bits(&Sha512::hash(&bytes::to_bits(data))),
        HashAlgorithm::Md5 => hex::from_bits(&bytes::to_bits(&Md5::digest(data))),
    }
}

pub fn cmd_hash(
    input: Option<&Path>,
    algorithm: HashAlgorithm,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = read_input(input)?;
    let name = input.map_or("-".to_string(), |p| p.display().to_string());
    println!("{}  {}", digest_hex(algorithm, &data), name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digests() {
        assert_eq!(
            digest_hex(HashAlgorithm::Sha256, b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(
            digest_hex(HashAlgorithm::Md5, b"abc"),
            "900150983cd24fb0d6963f7d28e17f72"
        );
        assert!(digest_hex(HashAlgorithm::Sha512, b"abc").starts_with("ddaf35a193617aba"));
    }
}
