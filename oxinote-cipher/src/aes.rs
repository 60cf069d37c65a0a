//! AES block cipher (FIPS 197) with 128, 192 and 256-bit keys.
//!
//! Table-driven implementation: the S-box, its inverse and the combined
//! SubBytes/MixColumns round tables are computed at compile time from the
//! field arithmetic of GF(2^8) and shared by every key. A key is expanded
//! once into separate encryption and decryption schedules; the decryption
//! schedule already has InvMixColumns folded in, so both directions run
//! through the same round function.

use oxinote_core::{BitArray, Block, BlockCipher, OxiNoteError, Result};
use zeroize::ZeroizeOnDrop;

// ===========================================================================
// Tables
// ===========================================================================

/// Round tables for one direction.
struct DirectionTables {
    rounds: [[u32; 256]; 4],
    sbox: [u8; 256],
}

struct Tables {
    encrypt: DirectionTables,
    decrypt: DirectionTables,
}

/// Build the S-boxes and round tables.
///
/// Walks the multiplicative group of GF(2^8) with generator 3, tracking the
/// inverse alongside, so each step yields one S-box entry without an
/// explicit inversion.
const fn build_tables() -> Tables {
    // d[i] = 2*i in GF(2^8), th[3*i] = i
    let mut d = [0u32; 256];
    let mut th = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        d[i] = ((i << 1) ^ ((i >> 7) * 0x11b)) as u32;
        th[d[i] as usize ^ i] = i as u32;
        i += 1;
    }

    let mut enc = [[0u32; 256]; 4];
    let mut dec = [[0u32; 256]; 4];
    let mut sbox = [0u8; 256];
    let mut inv_sbox = [0u8; 256];

    let mut x = 0usize;
    let mut x_inv = 0usize;
    let mut step = 0;
    while step < 256 {
        // affine transform of the inverse
        let mut s = x_inv ^ (x_inv << 1) ^ (x_inv << 2) ^ (x_inv << 3) ^ (x_inv << 4);
        s = (s >> 8) ^ (s & 0xff) ^ 0x63;
        sbox[x] = s as u8;
        inv_sbox[s] = x as u8;

        let x2 = d[x];
        let x4 = d[x2 as usize];
        let x8 = d[x4 as usize];
        let mut t_dec =
            (x8 * 0x0101_0101)
                ^ (x4 * 0x0001_0001)
                ^ (x2 * 0x0000_0101)
                ^ ((x as u32) * 0x0101_0100);
        let mut t_enc = (d[s] * 0x101) ^ ((s as u32) * 0x0101_0100);

        let mut t = 0;
        while t < 4 {
            t_enc = t_enc.rotate_right(8);
            t_dec = t_dec.rotate_right(8);
            enc[t][x] = t_enc;
            dec[t][s] = t_dec;
            t += 1;
        }

        x ^= if x2 != 0 { x2 as usize } else { 1 };
        x_inv = if th[x_inv] != 0 { th[x_inv] as usize } else { 1 };
        step += 1;
    }

    Tables {
        encrypt: DirectionTables { rounds: enc, sbox },
        decrypt: DirectionTables {
            rounds: dec,
            sbox: inv_sbox,
        },
    }
}

static TABLES: Tables = build_tables();

#[inline(always)]
fn sub_word(sbox: &[u8; 256], w: u32) -> u32 {
    (sbox[(w >> 24) as usize] as u32) << 24
        | (sbox[(w >> 16 & 0xff) as usize] as u32) << 16
        | (sbox[(w >> 8 & 0xff) as usize] as u32) << 8
        | sbox[(w & 0xff) as usize] as u32
}

// ===========================================================================
// Cipher
// ===========================================================================

/// An expanded AES key.
///
/// Both schedules are wiped when the value is dropped.
#[derive(Clone, ZeroizeOnDrop)]
pub struct Aes {
    enc_key: Vec<u32>,
    dec_key: Vec<u32>,
}

impl Aes {
    /// Expand a 128, 192 or 256-bit key.
    ///
    /// # Errors
    ///
    /// [`OxiNoteError::InvalidKeySize`] for any other length.
    pub fn new(key: &BitArray) -> Result<Self> {
        let bits = key.bit_length();
        if !matches!(bits, 128 | 192 | 256) {
            return Err(OxiNoteError::InvalidKeySize { bits });
        }
        Ok(Self::expand(key.words()))
    }

    /// Expand a 256-bit key given as eight words. Infallible.
    pub fn from_words_256(key: &[u32; 8]) -> Self {
        Self::expand(key)
    }

    fn expand(key: &[u32]) -> Self {
        let sbox = &TABLES.encrypt.sbox;
        let key_len = key.len();
        let total = 4 * key_len + 28;

        let mut enc_key = Vec::with_capacity(total);
        enc_key.extend_from_slice(key);
        let mut rcon: u32 = 1;
        for i in key_len..total {
            let mut tmp = enc_key[i - 1];
            if i % key_len == 0 || (key_len == 8 && i % key_len == 4) {
                tmp = sub_word(sbox, tmp);
                if i % key_len == 0 {
                    tmp = tmp.rotate_left(8) ^ (rcon << 24);
                    rcon = (rcon << 1) ^ ((rcon >> 7) * 0x11b);
                }
            }
            enc_key.push(enc_key[i - key_len] ^ tmp);
        }

        // Decryption schedule: round keys in reverse, with InvMixColumns
        // applied to all but the first and last.
        let dec_tables = &TABLES.decrypt.rounds;
        let mut dec_key = Vec::with_capacity(total);
        for j in 0..total {
            let i = total - j;
            let tmp = if j & 3 != 0 { enc_key[i] } else { enc_key[i - 4] };
            if i <= 4 || j < 4 {
                dec_key.push(tmp);
            } else {
                dec_key.push(
                    dec_tables[0][sbox[(tmp >> 24) as usize] as usize]
                        ^ dec_tables[1][sbox[(tmp >> 16 & 0xff) as usize] as usize]
                        ^ dec_tables[2][sbox[(tmp >> 8 & 0xff) as usize] as usize]
                        ^ dec_tables[3][sbox[(tmp & 0xff) as usize] as usize],
                );
            }
        }

        Self { enc_key, dec_key }
    }

    /// Key length in bits.
    pub fn key_bits(&self) -> usize {
        (self.enc_key.len() - 28) / 4 * 32
    }

    /// Encrypt one 128-bit block given as a bit array.
    ///
    /// # Errors
    ///
    /// [`OxiNoteError::InvalidBlockSize`] unless `block` is exactly 128 bits.
    pub fn encrypt(&self, block: &BitArray) -> Result<BitArray> {
        let block = to_block(block)?;
        Ok(BitArray::from(self.encrypt_block(&block)))
    }

    /// Decrypt one 128-bit block given as a bit array.
    ///
    /// # Errors
    ///
    /// [`OxiNoteError::InvalidBlockSize`] unless `block` is exactly 128 bits.
    pub fn decrypt(&self, block: &BitArray) -> Result<BitArray> {
        let block = to_block(block)?;
        Ok(BitArray::from(self.decrypt_block(&block)))
    }

    fn crypt(&self, input: &Block, decrypt: bool) -> Block {
        let (key, tables) = if decrypt {
            (&self.dec_key, &TABLES.decrypt)
        } else {
            (&self.enc_key, &TABLES.encrypt)
        };
        let [t0, t1, t2, t3] = &tables.rounds;

        let mut a = input[0] ^ key[0];
        let mut b = input[if decrypt { 3 } else { 1 }] ^ key[1];
        let mut c = input[2] ^ key[2];
        let mut d = input[if decrypt { 1 } else { 3 }] ^ key[3];

        let inner_rounds = key.len() / 4 - 2;
        let mut k = 4;
        for _ in 0..inner_rounds {
            let a2 = t0[(a >> 24) as usize]
                ^ t1[(b >> 16 & 0xff) as usize]
                ^ t2[(c >> 8 & 0xff) as usize]
                ^ t3[(d & 0xff) as usize]
                ^ key[k];
            let b2 = t0[(b >> 24) as usize]
                ^ t1[(c >> 16 & 0xff) as usize]
                ^ t2[(d >> 8 & 0xff) as usize]
                ^ t3[(a & 0xff) as usize]
                ^ key[k + 1];
            let c2 = t0[(c >> 24) as usize]
                ^ t1[(d >> 16 & 0xff) as usize]
                ^ t2[(a >> 8 & 0xff) as usize]
                ^ t3[(b & 0xff) as usize]
                ^ key[k + 2];
            d = t0[(d >> 24) as usize]
                ^ t1[(a >> 16 & 0xff) as usize]
                ^ t2[(b >> 8 & 0xff) as usize]
                ^ t3[(c & 0xff) as usize]
                ^ key[k + 3];
            a = a2;
            b = b2;
            c = c2;
            k += 4;
        }

        // Last round: no MixColumns.
        let sbox = &tables.sbox;
        let mut out = [0u32; 4];
        for i in 0..4 {
            let index = if decrypt { (4 - i) & 3 } else { i };
            out[index] = (sbox[(a >> 24) as usize] as u32) << 24
                ^ (sbox[(b >> 16 & 0xff) as usize] as u32) << 16
                ^ (sbox[(c >> 8 & 0xff) as usize] as u32) << 8
                ^ sbox[(d & 0xff) as usize] as u32
                ^ key[k];
            k += 1;
            let first = a;
            a = b;
            b = c;
            c = d;
            d = first;
        }
        out
    }
}

impl BlockCipher for Aes {
    #[inline]
    fn encrypt_block(&self, block: &Block) -> Block {
        self.crypt(block, false)
    }

    #[inline]
    fn decrypt_block(&self, block: &Block) -> Block {
        self.crypt(block, true)
    }
}

impl std::fmt::Debug for Aes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aes")
            .field("key_bits", &self.key_bits())
            .finish_non_exhaustive()
    }
}

/// Convert a 128-bit bit array to a block.
pub(crate) fn to_block(bits: &BitArray) -> Result<Block> {
    if bits.bit_length() != 128 {
        return Err(OxiNoteError::InvalidBlockSize {
            bits: bits.bit_length(),
        });
    }
    Ok([bits.word(0), bits.word(1), bits.word(2), bits.word(3)])
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use oxinote_core::codec::hex;

    fn bits(text: &str) -> BitArray {
        hex::to_bits(text).expect("hex")
    }

    const PLAINTEXT: &str = "00112233445566778899aabbccddeeff";

    #[test]
    fn test_tables() {
        assert_eq!(TABLES.encrypt.sbox[0x00], 0x63);
        assert_eq!(TABLES.encrypt.sbox[0x53], 0xed);
        assert_eq!(TABLES.decrypt.sbox[0x63], 0x00);
        assert_eq!(TABLES.encrypt.rounds[0][0], 0xc66363a5);
        assert_eq!(TABLES.encrypt.rounds[0][1], 0xf87c7c84);
        assert_eq!(TABLES.decrypt.rounds[0][0], 0x51f4a750);
    }

    #[test]
    fn test_fips197_aes128() {
        let aes = Aes::new(&bits("000102030405060708090a0b0c0d0e0f")).expect("key");
        let ct = aes.encrypt(&bits(PLAINTEXT)).expect("encrypt");
        assert_eq!(hex::from_bits(&ct), "69c4e0d86a7b0430d8cdb78070b4c55a");
        assert_eq!(hex::from_bits(&aes.decrypt(&ct).expect("decrypt")), PLAINTEXT);
    }

    #[test]
    fn test_fips197_aes192() {
        let aes = Aes::new(&bits("000102030405060708090a0b0c0d0e0f1011121314151617")).expect("key");
        let ct = aes.encrypt(&bits(PLAINTEXT)).expect("encrypt");
        assert_eq!(hex::from_bits(&ct), "dda97ca4864cdfe06eaf70a0ec0d7191");
        assert_eq!(hex::from_bits(&aes.decrypt(&ct).expect("decrypt")), PLAINTEXT);
    }

    #[test]
    fn test_fips197_aes256() {
        let aes = Aes::new(&bits(
            "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f",
        ))
        .expect("key");
        let ct = aes.encrypt(&bits(PLAINTEXT)).expect("encrypt");
        assert_eq!(hex::from_bits(&ct), "8ea2b7ca516745bfeafc49904b496089");
        assert_eq!(hex::from_bits(&aes.decrypt(&ct).expect("decrypt")), PLAINTEXT);
        assert_eq!(aes.key_bits(), 256);
    }

    #[test]
    fn test_invalid_key_size() {
        for len in [0usize, 64, 96, 160, 224, 288] {
            let key = BitArray::with_bit_length(vec![0; 9], len);
            assert_eq!(
                Aes::new(&key).unwrap_err(),
                OxiNoteError::InvalidKeySize { bits: len }
            );
        }
        // A partial word is never a valid key.
        let key = BitArray::with_bit_length(vec![0; 4], 120);
        assert!(Aes::new(&key).is_err());
    }

    #[test]
    fn test_invalid_block_size() {
        let aes = Aes::new(&BitArray::from_words(vec![0; 4])).expect("key");
        let short = BitArray::from_words(vec![0; 3]);
        assert_eq!(
            aes.encrypt(&short).unwrap_err(),
            OxiNoteError::InvalidBlockSize { bits: 96 }
        );
        assert!(aes.decrypt(&BitArray::from_words(vec![0; 5])).is_err());
    }

    #[test]
    fn test_block_roundtrip_all_key_sizes() {
        let block: Block = [0xdeadbeef, 0x01234567, 0x89abcdef, 0xfeedface];
        for words in [4usize, 6, 8] {
            let key: Vec<u32> = (0..words as u32).map(|i| i.wrapping_mul(0x9e3779b9)).collect();
            let aes = Aes::new(&BitArray::from_words(key)).expect("key");
            let ct = aes.encrypt_block(&block);
            assert_ne!(ct, block);
            assert_eq!(aes.decrypt_block(&ct), block);
        }
    }
}
