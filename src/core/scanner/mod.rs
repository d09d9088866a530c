//! # Scanner Module
//!
//! Lists candidate image files in a directory.
//!
//! ## Supported Formats
//! - PNG (.png)
//! - JPEG (.jpg, .jpeg)
//! - BMP (.bmp)
//!
//! Extensions match case-insensitively. Results are sorted by path so that
//! every later stage sees files in a stable order.
//!
//! ## Example
//! ```rust,ignore
//! use phash_dedup::core::scanner::{DirectoryScanner, ScanConfig};
//!
//! let scanner = DirectoryScanner::new(ScanConfig::default());
//! let result = scanner.scan(Path::new("/images"))?;
//! ```

mod filter;
mod walker;

pub use filter::ImageFilter;
pub use walker::{DirectoryScanner, ScanConfig};

use crate::error::ScanError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A discovered image file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFile {
    /// Path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Format detected from the extension
    pub format: ImageFormat,
}

/// Recognised image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Bmp,
    Unknown,
}

impl ImageFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "png" => ImageFormat::Png,
            "jpg" | "jpeg" => ImageFormat::Jpeg,
            "bmp" => ImageFormat::Bmp,
            _ => ImageFormat::Unknown,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, ImageFormat::Unknown)
    }
}

/// Result of a scan operation
#[derive(Debug)]
pub struct ScanResult {
    /// Image files, sorted by path
    pub images: Vec<ImageFile>,
    /// Entries that could not be read (non-fatal)
    pub errors: Vec<ScanError>,
}
