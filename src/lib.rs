//! # phash-dedup
//!
//! Finds near-duplicate images by reducing each image to a DCT-based
//! perceptual fingerprint and searching the fingerprints with a
//! vantage-point tree.
//!
//! ## Architecture
//! - `core` - Fingerprinting, the metric index, grouping and the pipeline
//! - `events` - Event-driven progress reporting
//! - `error` - Error types for every stage

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{DedupError, Result};

/// Initialize tracing for the library
///
/// `RUST_LOG` wins when set; otherwise `default_level` is used.
/// Calling this twice is harmless.
pub fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
