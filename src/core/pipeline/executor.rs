//! Pipeline execution implementation.

use crate::core::comparator::{DuplicateGroup, FingerprintBuckets, GroupingStats, RadiusGrouper};
use crate::core::hasher::{Fingerprint, Fingerprinter, HasherConfig, PerceptualHasher};
use crate::core::index::{Hamming, VpTree};
use crate::core::remover::select_keeper;
use crate::core::scanner::{DirectoryScanner, ImageFile, ScanConfig};
use crate::error::{CompareError, DedupError};
use crate::events::{
    null_sender, Event, EventSender, GroupEvent, HashEvent, HashProgress, PipelineEvent,
    PipelinePhase, PipelineSummary,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Result of pipeline execution
#[derive(Debug)]
pub struct PipelineResult {
    /// All duplicate groups found
    pub groups: Vec<DuplicateGroup>,
    /// Image files listed
    pub total_images: usize,
    /// Images that could not be decoded
    pub skipped: usize,
    /// Non-fatal errors, one line each
    pub errors: Vec<String>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl PipelineResult {
    /// Total duplicates across groups: images minus one kept per group
    pub fn duplicate_count(&self) -> usize {
        self.groups.iter().map(|g| g.duplicate_count()).sum()
    }

    pub fn stats(&self) -> GroupingStats {
        GroupingStats::from_groups(&self.groups)
    }
}

/// Configuration for the pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory to scan
    pub images_dir: PathBuf,
    /// Inclusive Hamming radius; 0 groups identical fingerprints only
    pub radius: u32,
    /// Scanner configuration
    pub scan_config: ScanConfig,
    /// Seed for vantage-point selection; random when unset
    pub seed: Option<u64>,
}

/// Builder for pipeline configuration
pub struct PipelineBuilder {
    images_dir: PathBuf,
    radius: i64,
    scan_config: ScanConfig,
    hasher: HasherConfig,
    seed: Option<u64>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            images_dir: PathBuf::new(),
            radius: 0,
            scan_config: ScanConfig::default(),
            hasher: HasherConfig::new(),
            seed: None,
        }
    }

    /// Directory to scan
    pub fn images_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.images_dir = dir.into();
        self
    }

    /// Grouping radius. Validated by [`PipelineBuilder::build`].
    pub fn radius(mut self, radius: i64) -> Self {
        self.radius = radius;
        self
    }

    /// Descend into subdirectories
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.scan_config.recursive = recursive;
        self
    }

    /// Set scanner configuration
    pub fn scan_config(mut self, config: ScanConfig) -> Self {
        self.scan_config = config;
        self
    }

    /// Side of the fingerprint bit grid
    pub fn hash_size(mut self, size: u32) -> Self {
        self.hasher = self.hasher.hash_size(size);
        self
    }

    /// Oversampling factor for the DCT input
    pub fn highfreq_factor(mut self, factor: u32) -> Self {
        self.hasher = self.hasher.highfreq_factor(factor);
        self
    }

    /// Fix vantage-point selection for reproducible trees
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Build the pipeline, rejecting bad settings before any file is touched
    pub fn build(self) -> Result<Pipeline, DedupError> {
        if self.radius < 0 {
            return Err(CompareError::InvalidRadius { value: self.radius }.into());
        }
        let radius = u32::try_from(self.radius).unwrap_or(u32::MAX);
        let hasher = self.hasher.build()?;

        Ok(Pipeline {
            config: PipelineConfig {
                images_dir: self.images_dir,
                radius,
                scan_config: self.scan_config,
                seed: self.seed,
            },
            hasher,
        })
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The duplicate detection pipeline
pub struct Pipeline {
    config: PipelineConfig,
    hasher: PerceptualHasher,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline without events
    pub fn run(&self) -> Result<PipelineResult, DedupError> {
        self.run_with_events(&null_sender())
    }

    /// Run the pipeline with event reporting
    pub fn run_with_events(&self, events: &EventSender) -> Result<PipelineResult, DedupError> {
        let start_time = Instant::now();
        let mut errors = Vec::new();

        events.send(Event::Pipeline(PipelineEvent::Started));

        // Phase 1: Scanning
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Scanning,
        }));

        let scanner = DirectoryScanner::new(self.config.scan_config.clone());
        let scan_result = scanner.scan_with_events(&self.config.images_dir, events)?;
        errors.extend(scan_result.errors.iter().map(ToString::to_string));

        let images = scan_result.images;
        let total_images = images.len();
        info!(
            dir = %self.config.images_dir.display(),
            images = total_images,
            "scan complete"
        );

        // Phase 2: Fingerprinting
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Hashing,
        }));

        let (buckets, skipped) = self.fingerprint_all(&images, &mut errors, events);

        // Phase 3: Grouping
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Grouping,
        }));

        let index = self.build_index(&buckets, events)?;
        let mut groups = RadiusGrouper::new(self.config.radius).group_with_events(
            &buckets,
            index.as_ref(),
            events,
        )?;
        assign_representatives(&mut groups, &images);

        let duration_ms = start_time.elapsed().as_millis() as u64;
        let duplicate_count = groups.iter().map(|g| g.duplicate_count()).sum();

        info!(
            groups = groups.len(),
            duplicates = duplicate_count,
            skipped,
            duration_ms,
            "grouping complete"
        );

        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: PipelineSummary {
                total_images,
                skipped_images: skipped,
                duplicate_groups: groups.len(),
                duplicate_count,
                duration_ms,
            },
        }));

        Ok(PipelineResult {
            groups,
            total_images,
            skipped,
            errors,
            duration_ms,
        })
    }

    /// Fingerprint every image in parallel. Undecodable files are skipped.
    fn fingerprint_all(
        &self,
        images: &[ImageFile],
        errors: &mut Vec<String>,
        events: &EventSender,
    ) -> (FingerprintBuckets, usize) {
        let total = images.len();
        events.send(Event::Hash(HashEvent::Started {
            total_images: total,
        }));

        let completed = AtomicUsize::new(0);

        // Indexed parallel collect keeps scan order, so bucket order is stable
        let outcomes: Vec<_> = images
            .par_iter()
            .map(|image| {
                let outcome = self.hasher.fingerprint_file(&image.path);
                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                events.send(Event::Hash(HashEvent::Progress(HashProgress {
                    completed: done,
                    total,
                    current_path: image.path.clone(),
                })));
                outcome
            })
            .collect();

        let mut buckets = FingerprintBuckets::new();
        let mut skipped = 0;

        for (image, outcome) in images.iter().zip(outcomes) {
            match outcome {
                Ok(fingerprint) => buckets.insert(fingerprint, image.path.clone()),
                Err(e) => {
                    warn!(path = %image.path.display(), error = %e, "skipping image");
                    events.send(Event::Hash(HashEvent::Skipped {
                        path: image.path.clone(),
                        message: e.to_string(),
                    }));
                    errors.push(e.to_string());
                    skipped += 1;
                }
            }
        }

        events.send(Event::Hash(HashEvent::Completed {
            total_hashed: total - skipped,
            skipped,
        }));
        debug!(distinct = buckets.len(), "fingerprints bucketed");

        (buckets, skipped)
    }

    /// Index distinct fingerprints; only a positive radius needs one
    fn build_index(
        &self,
        buckets: &FingerprintBuckets,
        events: &EventSender,
    ) -> Result<Option<VpTree<Fingerprint, Hamming>>, DedupError> {
        if self.config.radius == 0 || buckets.is_empty() {
            return Ok(None);
        }

        let points = buckets.fingerprints().to_vec();
        let tree = match self.config.seed {
            Some(seed) => VpTree::build_with_rng(points, Hamming, &mut StdRng::seed_from_u64(seed))?,
            None => VpTree::build(points, Hamming)?,
        };

        debug!(points = tree.len(), depth = tree.depth(), "index built");
        events.send(Event::Group(GroupEvent::IndexBuilt { points: tree.len() }));

        Ok(Some(tree))
    }
}

/// Pick the keeper of each group by scanned size and total the rest
fn assign_representatives(groups: &mut [DuplicateGroup], images: &[ImageFile]) {
    let sizes: HashMap<&PathBuf, u64> = images.iter().map(|i| (&i.path, i.size)).collect();

    for group in groups {
        let group_sizes: Vec<u64> = group
            .images
            .iter()
            .map(|p| sizes.get(p).copied().unwrap_or(0))
            .collect();

        if let Some(keep) = select_keeper(&group_sizes) {
            group.representative = group.images[keep].clone();
            group.duplicate_size_bytes = group_sizes.iter().sum::<u64>() - group_sizes[keep];
        }
    }
}
