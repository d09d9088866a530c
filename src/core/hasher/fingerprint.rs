//! The fingerprint value type and its Hamming metric.

use crate::error::HashError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A square grid of bits summarising an image's low-frequency content.
///
/// Bits are stored row-major and packed eight per byte, least significant
/// bit first, so bit `i` lives at `bytes[i / 8] & (1 << (i % 8))`. Padding
/// bits in the last byte are always zero.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fingerprint {
    side: u32,
    bytes: Vec<u8>,
}

impl Fingerprint {
    /// Pack a row-major grid of `side * side` bits.
    pub fn from_bits(side: u32, bits: &[bool]) -> Result<Self, HashError> {
        let expected = (side as usize) * (side as usize);
        if bits.len() != expected {
            return Err(HashError::InvalidDimensions {
                expected,
                actual: bits.len(),
            });
        }

        let mut bytes = vec![0u8; expected.div_ceil(8)];
        for (i, &bit) in bits.iter().enumerate() {
            if bit {
                bytes[i / 8] |= 1 << (i % 8);
            }
        }

        Ok(Self { side, bytes })
    }

    /// Side length of the grid
    pub fn side(&self) -> u32 {
        self.side
    }

    /// Total number of bits in the grid
    pub fn bit_count(&self) -> u32 {
        self.side * self.side
    }

    /// Bit at `(row, col)`; out-of-range coordinates read as `false`
    pub fn bit(&self, row: u32, col: u32) -> bool {
        if row >= self.side || col >= self.side {
            return false;
        }
        let i = (row * self.side + col) as usize;
        self.bytes[i / 8] & (1 << (i % 8)) != 0
    }

    /// All bits in row-major order
    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.bit_count() as usize).map(move |i| self.bytes[i / 8] & (1 << (i % 8)) != 0)
    }

    /// Packed bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Hamming distance: the number of positions where the bits differ.
    ///
    /// Fingerprints of different sizes are not comparable.
    pub fn distance(&self, other: &Self) -> Result<u32, HashError> {
        if self.bit_count() != other.bit_count() {
            return Err(HashError::SizeMismatch {
                left: self.bit_count(),
                right: other.bit_count(),
            });
        }

        Ok(self
            .bytes
            .iter()
            .zip(other.bytes.iter())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum())
    }

    /// Similarity as a percentage (0-100)
    pub fn similarity(&self, other: &Self) -> Result<f64, HashError> {
        let distance = self.distance(other)?;
        let max_distance = self.bit_count();
        if max_distance == 0 {
            return Ok(100.0);
        }
        Ok((1.0 - (distance as f64 / max_distance as f64)) * 100.0)
    }

    /// Lowercase hex of the packed bytes
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
