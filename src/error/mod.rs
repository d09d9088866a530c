//! # Error Module
//!
//! Error types for the duplicate image finder.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, sizes, what went wrong
//! - **Isolate I/O failures** - one bad file never aborts a batch
//! - **Fail loudly on misuse** - precondition errors surface immediately

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum DedupError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Hashing error: {0}")]
    Hash(#[from] HashError),

    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    #[error("Comparison error: {0}")]
    Compare(#[from] CompareError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("Removal error: {0}")]
    Remove(#[from] RemoveError),
}

/// Errors that occur while listing image files
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while decoding images or computing fingerprints
#[derive(Error, Debug)]
pub enum HashError {
    #[error("Failed to decode image {path}: {reason}")]
    DecodeError { path: PathBuf, reason: String },

    #[error("Failed to open image file {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Pixel grid has {actual} samples, expected {expected}")]
    InvalidDimensions { expected: usize, actual: usize },

    #[error("Fingerprints differ in size: {left} bits vs {right} bits")]
    SizeMismatch { left: u32, right: u32 },

    #[error("Invalid hasher configuration: {0}")]
    InvalidConfig(String),
}

/// Errors raised by the vantage-point tree
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Cannot build an index over an empty point set")]
    EmptyInput,

    #[error("Distance computation failed: {0}")]
    Distance(#[from] HashError),
}

/// Errors that occur while grouping duplicates
#[derive(Error, Debug)]
pub enum CompareError {
    #[error("Invalid radius: {value} (must be zero or positive)")]
    InvalidRadius { value: i64 },

    #[error("Radius {radius} requires an index over the fingerprints")]
    MissingIndex { radius: u32 },

    #[error(transparent)]
    Index(#[from] IndexError),
}

/// Errors that occur while persisting duplicate groups
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write report to {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize duplicate groups: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors that occur while removing duplicate files
#[derive(Error, Debug)]
pub enum RemoveError {
    #[error("Failed to read size of {path}: {source}")]
    SizeUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove {path}: {source}")]
    RemoveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, DedupError>;
