//! # Core Module
//!
//! The duplicate detection engine.
//!
//! ## Modules
//! - `scanner` - Lists candidate image files in a directory
//! - `hasher` - Decodes images and computes DCT fingerprints
//! - `index` - Vantage-point tree over fingerprints
//! - `comparator` - Groups fingerprints into duplicate sets
//! - `reporter` - Persists duplicate groups as JSON
//! - `remover` - Keeps one file per group and removes the rest
//! - `pipeline` - Orchestrates the full workflow

pub mod comparator;
pub mod hasher;
pub mod index;
pub mod pipeline;
pub mod remover;
pub mod reporter;
pub mod scanner;

// Re-export commonly used types
pub use comparator::{DuplicateGroup, FingerprintBuckets, MatchType};
pub use hasher::{Fingerprint, PerceptualHasher};
pub use index::{Hamming, VpTree};
pub use scanner::ImageFile;
