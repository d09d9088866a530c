//! Groups bucketed images into duplicate sets.
//!
//! Each not-yet-grouped fingerprint in turn anchors one range query; every
//! fingerprint it reaches joins the anchor's group and is never grouped
//! again. This is first-come-first-grouped, not transitive: with A~B and B~C
//! but A far from C, anchoring on A yields {A, B} and C stays alone.

use super::{DuplicateGroup, FingerprintBuckets};
use crate::core::hasher::Fingerprint;
use crate::core::index::{Hamming, VpTree};
use crate::error::{CompareError, IndexError};
use crate::events::{null_sender, Event, EventSender, GroupEvent};
use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;
use tracing::debug;

/// How often to emit progress while anchoring queries
const PROGRESS_INTERVAL: usize = 200;

/// Groups images whose fingerprints are within `radius` of a query anchor
#[derive(Debug, Clone, Copy, Default)]
pub struct RadiusGrouper {
    radius: u32,
}

impl RadiusGrouper {
    /// A grouper for the given inclusive Hamming radius
    pub fn new(radius: u32) -> Self {
        Self { radius }
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// Group without progress events
    pub fn group(
        &self,
        buckets: &FingerprintBuckets,
        index: Option<&VpTree<Fingerprint, Hamming>>,
    ) -> Result<Vec<DuplicateGroup>, CompareError> {
        self.group_with_events(buckets, index, &null_sender())
    }

    /// Group duplicates.
    ///
    /// Radius 0 is exact matching: every bucket holding two or more images
    /// is a group and `index` is not consulted. A positive radius needs an
    /// index over the distinct fingerprints of `buckets`.
    pub fn group_with_events(
        &self,
        buckets: &FingerprintBuckets,
        index: Option<&VpTree<Fingerprint, Hamming>>,
        events: &EventSender,
    ) -> Result<Vec<DuplicateGroup>, CompareError> {
        let groups = if self.radius == 0 {
            exact_groups(buckets)
        } else {
            let index = index.ok_or(CompareError::MissingIndex {
                radius: self.radius,
            })?;
            self.radius_groups(buckets, index, events)?
        };

        events.send(Event::Group(GroupEvent::Completed {
            total_groups: groups.len(),
            total_duplicates: groups.iter().map(|g| g.duplicate_count()).sum(),
        }));

        Ok(groups)
    }

    fn radius_groups(
        &self,
        buckets: &FingerprintBuckets,
        index: &VpTree<Fingerprint, Hamming>,
        events: &EventSender,
    ) -> Result<Vec<DuplicateGroup>, CompareError> {
        // Inclusive radius: distance == radius still groups
        let tau = self.radius.saturating_add(1);
        let total = buckets.len();

        let mut consumed: HashSet<&Fingerprint> = HashSet::with_capacity(total);
        let mut groups = Vec::new();

        for (processed, (anchor, _)) in buckets.iter().enumerate() {
            if processed % PROGRESS_INTERVAL == 0 {
                events.send(Event::Group(GroupEvent::Progress { processed, total }));
            }

            if consumed.contains(anchor) {
                continue;
            }

            let mut members: BTreeSet<PathBuf> = BTreeSet::new();
            let mut max_distance = 0;
            let mut similarity = 100.0_f64;

            for (distance, neighbour) in index.range_query(anchor, tau)? {
                let Some(paths) = buckets.get(neighbour) else {
                    continue;
                };
                if !consumed.insert(neighbour) {
                    continue;
                }
                max_distance = max_distance.max(distance);
                similarity = similarity.min(anchor.similarity(neighbour).map_err(IndexError::from)?);
                members.extend(paths.iter().cloned());
            }

            if members.len() > 1 {
                debug!(
                    anchor = %anchor,
                    images = members.len(),
                    max_distance,
                    "duplicate group"
                );
                groups.push(
                    DuplicateGroup::new(members.into_iter().collect(), max_distance)
                        .with_similarity(similarity),
                );
            }
        }

        Ok(groups)
    }
}

fn exact_groups(buckets: &FingerprintBuckets) -> Vec<DuplicateGroup> {
    buckets
        .iter()
        .filter(|(_, paths)| paths.len() > 1)
        .map(|(_, paths)| {
            let mut images = paths.to_vec();
            images.sort();
            DuplicateGroup::new(images, 0)
        })
        .collect()
}
