//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the duplicate finder pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Directory listing events
    Scan(ScanEvent),
    /// Fingerprinting events
    Hash(HashEvent),
    /// Index construction and grouping events
    Group(GroupEvent),
    /// Duplicate removal events
    Remove(RemoveEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events while listing candidate files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Listing has started
    Started { root: PathBuf },
    /// An image file was found
    ImageFound { path: PathBuf },
    /// An entry could not be read; listing continues
    Error { path: PathBuf, message: String },
    /// Listing completed
    Completed { total_images: usize },
}

/// Events while fingerprinting images
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HashEvent {
    /// Fingerprinting has started
    Started { total_images: usize },
    /// Progress update
    Progress(HashProgress),
    /// A file could not be decoded and was skipped
    Skipped { path: PathBuf, message: String },
    /// Fingerprinting completed
    Completed { total_hashed: usize, skipped: usize },
}

/// Progress information during fingerprinting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashProgress {
    /// Number of images processed so far
    pub completed: usize,
    /// Total number of images to process
    pub total: usize,
    /// Image just processed
    pub current_path: PathBuf,
}

/// Events while indexing and grouping fingerprints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GroupEvent {
    /// The vantage-point tree was built
    IndexBuilt { points: usize },
    /// Progress over the fingerprints used as query anchors
    Progress { processed: usize, total: usize },
    /// Grouping completed
    Completed { total_groups: usize, total_duplicates: usize },
}

/// Events while removing duplicates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RemoveEvent {
    /// A duplicate was removed
    Removed { path: PathBuf },
    /// A duplicate could not be removed; other removals continue
    Failed { path: PathBuf, message: String },
    /// Removal completed
    Completed { removed: usize, failed: usize },
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started,
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Pipeline completed successfully
    Completed { summary: PipelineSummary },
}

/// Phases of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Scanning,
    Hashing,
    Grouping,
}

/// Summary of pipeline results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Image files listed
    pub total_images: usize,
    /// Images that failed to decode
    pub skipped_images: usize,
    /// Number of duplicate groups found
    pub duplicate_groups: usize,
    /// Total number of duplicate images (excluding the kept one per group)
    pub duplicate_count: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Scanning => write!(f, "Scanning"),
            PipelinePhase::Hashing => write!(f, "Fingerprinting"),
            PipelinePhase::Grouping => write!(f, "Grouping"),
        }
    }
}
