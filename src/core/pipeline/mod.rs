//! # Pipeline Module
//!
//! Orchestrates the full duplicate detection workflow.
//!
//! ## Pipeline Stages
//! 1. **Scan** - List image files in the target directory
//! 2. **Fingerprint** - Compute a perceptual hash per image, skipping undecodable files
//! 3. **Group** - Bucket identical fingerprints, then group within the radius
//!
//! ## Parallelism
//! Uses rayon for parallel fingerprinting across multiple CPU cores.

mod executor;

pub use executor::{Pipeline, PipelineBuilder, PipelineConfig, PipelineResult};
