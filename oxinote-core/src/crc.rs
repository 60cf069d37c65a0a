//! CRC-32 (ISO 3309) checksum.
//!
//! The legacy note container prefixes its payload with a CRC-32 check value,
//! so this is the only CRC variant OxiNote needs.
//!
//! - Polynomial: 0x04C11DB7 (reflected: 0xEDB88320)
//! - Initial value: 0xFFFFFFFF
//! - Final XOR: 0xFFFFFFFF

/// CRC-32 lookup table (polynomial 0xEDB88320, reflected).
const CRC32_TABLE: [u32; 256] = {
    let mut table = [0u32; 256];
    let mut i = 0usize;
    while i < 256 {
        let mut crc = i as u32;
        let mut j = 0;
        while j < 8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ 0xEDB88320
            } else {
                crc >> 1
            };
            j += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
};

/// Streaming CRC-32 calculator.
///
/// # Example
///
/// ```
/// use oxinote_core::crc::Crc32;
///
/// let mut crc = Crc32::new();
/// crc.update(b"Hello, ");
/// crc.update(b"World!");
/// assert_eq!(crc.finalize(), 0xEC4AC3D0);
/// ```
#[derive(Debug, Clone)]
pub struct Crc32 {
    crc: u32,
}

impl Crc32 {
    /// Create a new CRC-32 calculator.
    pub fn new() -> Self {
        Self { crc: 0xFFFFFFFF }
    }

    /// Reset the CRC to its initial state.
    pub fn reset(&mut self) {
        self.crc = 0xFFFFFFFF;
    }

    /// Update the CRC with more data.
    #[inline]
    pub fn update(&mut self, data: &[u8]) {
        for &byte in data {
            let index = ((self.crc ^ byte as u32) & 0xFF) as usize;
            self.crc = CRC32_TABLE[index] ^ (self.crc >> 8);
        }
    }

    /// The running register, before the final inversion.
    #[inline(always)]
    pub fn register(&self) -> u32 {
        self.crc
    }

    /// Finalize and return the standard CRC value.
    #[inline(always)]
    pub fn finalize(self) -> u32 {
        self.crc ^ 0xFFFFFFFF
    }

    /// Compute CRC-32 for a slice in one call.
    #[inline]
    pub fn compute(data: &[u8]) -> u32 {
        let mut crc = Self::new();
        crc.update(data);
        crc.finalize()
    }
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}
