//! Perceptual Hash (pHash) implementation.
//!
//! pHash runs a Discrete Cosine Transform over a small grayscale copy of
//! the image and keeps only the lowest frequencies. That makes it robust to:
//! - Scaling
//! - Re-encoding and compression artifacts
//! - Small brightness/contrast changes
//!
//! The DCT comes from `rustdct`. Its DCT-II is unnormalised, which only
//! scales every coefficient by the same positive factor and therefore
//! leaves the median comparison unchanged.

use super::fingerprint::Fingerprint;
use super::Fingerprinter;
use crate::error::HashError;
use rustdct::{Dct2, DctPlanner, TransformType2And3};
use std::sync::Arc;

/// DCT-based perceptual hasher
pub struct PerceptualHasher {
    /// Side of the output bit grid
    hash_size: usize,
    /// Side of the pixel grid fed to the DCT
    image_size: usize,
    dct: Arc<dyn TransformType2And3<f32>>,
}

impl PerceptualHasher {
    /// Create a hasher producing `hash_size x hash_size` bits from a grid of
    /// `hash_size * highfreq_factor` pixels per side.
    ///
    /// Sizes are validated by [`super::HasherConfig::build`].
    pub fn new(hash_size: u32, highfreq_factor: u32) -> Self {
        let hash_size = hash_size as usize;
        let image_size = hash_size * highfreq_factor as usize;
        let dct = DctPlanner::new().plan_dct2(image_size);

        Self {
            hash_size,
            image_size,
            dct,
        }
    }

    /// Separable 2-D DCT-II over a square row-major grid.
    ///
    /// Output index `(v, u)` holds vertical frequency `v` and horizontal
    /// frequency `u`.
    fn dct_2d(&self, pixels: &[f32]) -> Vec<f32> {
        let n = self.image_size;

        let mut rows = pixels.to_vec();
        for row in rows.chunks_exact_mut(n) {
            self.dct.process_dct2(row);
        }

        let mut columns = transpose(&rows, n);
        for column in columns.chunks_exact_mut(n) {
            self.dct.process_dct2(column);
        }

        transpose(&columns, n)
    }

    /// Top-left `hash_size x hash_size` block of a transformed grid.
    fn low_frequencies(&self, coefficients: &[f32]) -> Vec<f32> {
        coefficients
            .chunks_exact(self.image_size)
            .take(self.hash_size)
            .flat_map(|row| row[..self.hash_size].iter().copied())
            .collect()
    }
}

impl Fingerprinter for PerceptualHasher {
    fn image_size(&self) -> u32 {
        self.image_size as u32
    }

    fn hash_size(&self) -> u32 {
        self.hash_size as u32
    }

    fn fingerprint_pixels(&self, pixels: &[f32]) -> Result<Fingerprint, HashError> {
        let expected = self.image_size * self.image_size;
        if pixels.len() != expected {
            return Err(HashError::InvalidDimensions {
                expected,
                actual: pixels.len(),
            });
        }

        let coefficients = self.dct_2d(pixels);
        let low = self.low_frequencies(&coefficients);
        Fingerprint::from_bits(self.hash_size as u32, &bits_above_median(&low))
    }
}

fn transpose(grid: &[f32], n: usize) -> Vec<f32> {
    let mut out = vec![0.0; grid.len()];
    for row in 0..n {
        for col in 0..n {
            out[col * n + row] = grid[row * n + col];
        }
    }
    out
}

/// Set a bit for every value strictly above the median.
///
/// An even count takes the mean of the two middle values. When every value
/// is equal no bit is set.
pub(crate) fn bits_above_median(values: &[f32]) -> Vec<bool> {
    if values.is_empty() {
        return Vec::new();
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    };

    values.iter().map(|&v| v > median).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageBuffer, Rgb};

    fn gradient(n: usize) -> Vec<f32> {
        (0..n * n).map(|i| ((i % n) * 8) as f32).collect()
    }

    fn checkerboard(n: usize, block: usize) -> Vec<f32> {
        (0..n * n)
            .map(|i| {
                let (row, col) = (i / n, i % n);
                if (row / block + col / block) % 2 == 0 {
                    255.0
                } else {
                    0.0
                }
            })
            .collect()
    }

    #[test]
    fn identical_pixels_produce_identical_fingerprint() {
        let hasher = PerceptualHasher::new(8, 4);
        let pixels = checkerboard(32, 4);

        let first = hasher.fingerprint_pixels(&pixels).unwrap();
        let second = hasher.fingerprint_pixels(&pixels).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.distance(&second).unwrap(), 0);
    }

    #[test]
    fn fingerprint_has_hash_size_squared_bits() {
        let hasher = PerceptualHasher::new(8, 4);
        let fp = hasher.fingerprint_pixels(&gradient(32)).unwrap();
        assert_eq!(fp.side(), 8);
        assert_eq!(fp.bit_count(), 64);
    }

    #[test]
    fn different_patterns_produce_different_fingerprints() {
        let hasher = PerceptualHasher::new(8, 4);
        let a = hasher.fingerprint_pixels(&gradient(32)).unwrap();
        let b = hasher.fingerprint_pixels(&checkerboard(32, 16)).unwrap();
        assert!(a.distance(&b).unwrap() > 0);
    }

    #[test]
    fn horizontal_gradient_sets_dc_bit() {
        // The DC term dominates every other coefficient of a bright ramp.
        let hasher = PerceptualHasher::new(8, 4);
        let fp = hasher.fingerprint_pixels(&gradient(32)).unwrap();
        assert!(fp.bit(0, 0));
    }

    #[test]
    fn wrong_grid_size_is_rejected() {
        let hasher = PerceptualHasher::new(8, 4);
        let result = hasher.fingerprint_pixels(&[0.0; 100]);
        assert!(matches!(
            result,
            Err(HashError::InvalidDimensions { expected: 1024, actual: 100 })
        ));
    }

    #[test]
    fn median_threshold_is_strict() {
        assert_eq!(
            bits_above_median(&[1.0, 2.0, 3.0, 4.0]),
            vec![false, false, true, true]
        );
        assert_eq!(bits_above_median(&[1.0, 5.0, 3.0]), vec![false, true, false]);
    }

    #[test]
    fn equal_values_set_no_bits() {
        assert!(bits_above_median(&[7.5; 64]).iter().all(|b| !b));
    }

    #[test]
    fn fingerprint_image_resizes_first() {
        let hasher = PerceptualHasher::new(8, 4);
        let img = ImageBuffer::from_fn(100, 80, |x, y| {
            Rgb([(x * 2) as u8, (y * 3) as u8, 128])
        });
        let image = DynamicImage::ImageRgb8(img);

        let first = hasher.fingerprint_image(&image).unwrap();
        let second = hasher.fingerprint_image(&image).unwrap();

        assert_eq!(first.bit_count(), 64);
        assert_eq!(first, second);
    }
}
