//! Extension filter for candidate image files.

use super::ImageFormat;
use std::path::Path;

/// Decides whether a path names a supported image
#[derive(Debug, Clone, Default)]
pub struct ImageFilter;

impl ImageFilter {
    pub fn new() -> Self {
        Self
    }

    /// Check if a file should be included
    pub fn should_include(&self, path: &Path) -> bool {
        self.get_format(path).is_supported()
    }

    /// Get the image format for a path
    pub fn get_format(&self, path: &Path) -> ImageFormat {
        path.extension()
            .and_then(|e| e.to_str())
            .map(ImageFormat::from_extension)
            .unwrap_or(ImageFormat::Unknown)
    }
}
