//! # Reporter Module
//!
//! Persists duplicate groups as JSON.
//!
//! ## Format
//! A JSON array with one element per group; each element is an array of
//! the group's image paths:
//!
//! ```json
//! [["/photos/a.png", "/photos/b.png"], ["/photos/c.jpg", "/photos/d.jpg"]]
//! ```
//!
//! Group order and path order are preserved exactly as produced by grouping.

use crate::core::comparator::DuplicateGroup;
use crate::error::ReportError;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

/// Paths as JSON strings. Names that are not valid UTF-8 are written lossily,
/// with U+FFFD in place of the undecodable bytes.
pub fn group_listing(groups: &[DuplicateGroup]) -> Vec<Vec<String>> {
    groups
        .iter()
        .map(|g| lossy_paths(&g.images))
        .collect()
}

/// Lossy string form of each path
pub fn lossy_paths(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect()
}

/// Write `groups` to `path`, replacing any existing file.
///
/// The JSON is staged in a temporary file beside `path` and renamed into
/// place, so a failed save never leaves a partial file behind.
pub fn save_groups(path: &Path, groups: &[DuplicateGroup]) -> Result<(), ReportError> {
    let write_failed = |source: std::io::Error| ReportError::WriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let json = serde_json::to_vec(&group_listing(groups))?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(dir).map_err(write_failed)?;
    staged.write_all(&json).map_err(write_failed)?;
    staged.flush().map_err(write_failed)?;
    staged.persist(path).map_err(|e| write_failed(e.error))?;

    info!(path = %path.display(), groups = groups.len(), "saved duplicate groups");
    Ok(())
}
