//! # Hasher Module
//!
//! Turns images into perceptual fingerprints.
//!
//! ## How It Works
//! 1. Decode the file (zune-jpeg for JPEG, the image crate otherwise)
//! 2. Convert to grayscale and resize to `hash_size * highfreq_factor` pixels square
//! 3. Run a 2-D DCT-II and keep the `hash_size x hash_size` lowest frequencies
//! 4. Set each bit whose coefficient is above the median of that block
//!
//! Fingerprints compare with Hamming distance.
//!
//! ## Example
//! ```rust,ignore
//! use phash_dedup::core::hasher::{Fingerprinter, HasherConfig};
//!
//! let hasher = HasherConfig::new().hash_size(8).build()?;
//! let fingerprint = hasher.fingerprint_file(&path)?;
//! ```

pub mod decode;
mod fingerprint;
mod perceptual;
pub mod resize;

pub use decode::FastDecoder;
pub use fingerprint::Fingerprint;
pub use perceptual::PerceptualHasher;

use crate::error::HashError;
use image::DynamicImage;
use std::path::Path;

/// Something that maps pixels to fingerprints.
pub trait Fingerprinter: Send + Sync {
    /// Side of the square pixel grid [`Fingerprinter::fingerprint_pixels`] expects
    fn image_size(&self) -> u32;

    /// Side of the produced bit grid
    fn hash_size(&self) -> u32;

    /// Fingerprint a row-major grid of exactly `image_size²` luminance samples
    fn fingerprint_pixels(&self, pixels: &[f32]) -> Result<Fingerprint, HashError>;

    /// Fingerprint a decoded image of any size
    fn fingerprint_image(&self, image: &DynamicImage) -> Result<Fingerprint, HashError> {
        let samples = resize::grayscale_samples(image, self.image_size())?;
        self.fingerprint_pixels(&samples)
    }

    /// Decode a file and fingerprint it
    fn fingerprint_file(&self, path: &Path) -> Result<Fingerprint, HashError> {
        let image = FastDecoder::decode(path)?;
        self.fingerprint_image(&image).map_err(|e| match e {
            HashError::DecodeError { reason, .. } => HashError::DecodeError {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })
    }
}

/// Largest accepted bit-grid side (4096-bit fingerprints)
pub const MAX_HASH_SIZE: u32 = 64;

/// Largest accepted oversampling factor
pub const MAX_HIGHFREQ_FACTOR: u32 = 32;

/// Configuration builder for the perceptual hasher
#[derive(Debug, Clone)]
pub struct HasherConfig {
    /// Side of the output bit grid (8 gives 64 bits)
    hash_size: u32,
    /// How many pixels per output bit, per side, go into the DCT
    highfreq_factor: u32,
}

impl HasherConfig {
    /// Defaults: 8x8 bits from a 32x32 pixel grid
    pub fn new() -> Self {
        Self {
            hash_size: 8,
            highfreq_factor: 4,
        }
    }

    /// Set the side of the bit grid
    pub fn hash_size(mut self, size: u32) -> Self {
        self.hash_size = size;
        self
    }

    /// Set the oversampling factor for the DCT input
    pub fn highfreq_factor(mut self, factor: u32) -> Self {
        self.highfreq_factor = factor;
        self
    }

    /// Build the hasher
    pub fn build(self) -> Result<PerceptualHasher, HashError> {
        if !(2..=MAX_HASH_SIZE).contains(&self.hash_size) {
            return Err(HashError::InvalidConfig(format!(
                "hash size must be between 2 and {}, got {}",
                MAX_HASH_SIZE, self.hash_size
            )));
        }
        if !(1..=MAX_HIGHFREQ_FACTOR).contains(&self.highfreq_factor) {
            return Err(HashError::InvalidConfig(format!(
                "highfreq factor must be between 1 and {}, got {}",
                MAX_HIGHFREQ_FACTOR, self.highfreq_factor
            )));
        }
        Ok(PerceptualHasher::new(self.hash_size, self.highfreq_factor))
    }
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self::new()
    }
}
