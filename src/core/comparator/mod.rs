//! # Comparator Module
//!
//! Turns fingerprinted images into duplicate groups.
//!
//! ## How It Works
//! 1. Bucket images by identical fingerprint
//! 2. With radius 0, every bucket of two or more images is a group
//! 3. Otherwise index the distinct fingerprints and let each ungrouped
//!    fingerprint claim everything within the radius
//!
//! ## Match Classification
//! | Distance | Classification |
//! |----------|---------------|
//! | 0        | Exact match   |
//! | 1-4      | Near-exact    |
//! | 5-10     | Similar       |
//! | 11+      | Possibly similar |

mod buckets;
mod grouper;

pub use buckets::FingerprintBuckets;
pub use grouper::RadiusGrouper;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Classification of match types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchType {
    /// Distance = 0, identical perceptual content
    Exact,
    /// Distance 1-4, virtually identical
    NearExact,
    /// Distance 5-10, likely duplicates
    Similar,
    /// Distance 11+, possibly related
    MaybeSimilar,
}

impl MatchType {
    /// Classify based on Hamming distance
    pub fn from_distance(distance: u32) -> Self {
        match distance {
            0 => MatchType::Exact,
            1..=4 => MatchType::NearExact,
            5..=10 => MatchType::Similar,
            _ => MatchType::MaybeSimilar,
        }
    }
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchType::Exact => write!(f, "Exact Match"),
            MatchType::NearExact => write!(f, "Near-Exact Match"),
            MatchType::Similar => write!(f, "Similar"),
            MatchType::MaybeSimilar => write!(f, "Possibly Similar"),
        }
    }
}

/// A group of duplicate images
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// All images in the group, sorted
    pub images: Vec<PathBuf>,
    /// The image to keep when duplicates are removed
    pub representative: PathBuf,
    /// The type of match for this group
    pub match_type: MatchType,
    /// Largest distance from the anchoring fingerprint
    pub max_distance: u32,
    /// Lowest similarity to the anchoring fingerprint, as a percentage
    pub similarity_percent: f64,
    /// Total file size of duplicates (excluding representative)
    pub duplicate_size_bytes: u64,
}

impl DuplicateGroup {
    /// Create a group; the first image stands in as representative until
    /// file sizes are known.
    pub fn new(images: Vec<PathBuf>, max_distance: u32) -> Self {
        let representative = images.first().cloned().unwrap_or_default();
        Self {
            images,
            representative,
            match_type: MatchType::from_distance(max_distance),
            max_distance,
            similarity_percent: 100.0,
            duplicate_size_bytes: 0,
        }
    }

    /// Record the lowest similarity seen while forming the group
    pub fn with_similarity(mut self, percent: f64) -> Self {
        self.similarity_percent = percent;
        self
    }

    /// Get the number of duplicates (excluding the representative)
    pub fn duplicate_count(&self) -> usize {
        self.images.len().saturating_sub(1)
    }

    /// Every image other than the representative
    pub fn duplicates(&self) -> impl Iterator<Item = &PathBuf> {
        self.images.iter().filter(move |p| **p != self.representative)
    }
}

/// Totals over a set of groups
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupingStats {
    pub groups: usize,
    pub grouped_images: usize,
    pub duplicates: usize,
    pub reclaimable_bytes: u64,
}

impl GroupingStats {
    pub fn from_groups(groups: &[DuplicateGroup]) -> Self {
        groups.iter().fold(Self::default(), |mut stats, group| {
            stats.groups += 1;
            stats.grouped_images += group.images.len();
            stats.duplicates += group.duplicate_count();
            stats.reclaimable_bytes += group.duplicate_size_bytes;
            stats
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_type_from_distance() {
        assert_eq!(MatchType::from_distance(0), MatchType::Exact);
        assert_eq!(MatchType::from_distance(3), MatchType::NearExact);
        assert_eq!(MatchType::from_distance(7), MatchType::Similar);
        assert_eq!(MatchType::from_distance(15), MatchType::MaybeSimilar);
    }

    #[test]
    fn new_group_defaults_representative_to_first_image() {
        let group = DuplicateGroup::new(
            vec![PathBuf::from("/a.png"), PathBuf::from("/b.png")],
            2,
        );
        assert_eq!(group.representative, PathBuf::from("/a.png"));
        assert_eq!(group.match_type, MatchType::NearExact);
        assert_eq!(group.duplicate_count(), 1);
        assert_eq!(
            group.duplicates().collect::<Vec<_>>(),
            vec![&PathBuf::from("/b.png")]
        );
    }

    #[test]
    fn stats_sum_over_groups() {
        let mut first = DuplicateGroup::new(
            vec![PathBuf::from("/a"), PathBuf::from("/b"), PathBuf::from("/c")],
            0,
        );
        first.duplicate_size_bytes = 300;
        let second = DuplicateGroup::new(vec![PathBuf::from("/d"), PathBuf::from("/e")], 1);

        let stats = GroupingStats::from_groups(&[first, second]);
        assert_eq!(
            stats,
            GroupingStats {
                groups: 2,
                grouped_images: 5,
                duplicates: 3,
                reclaimable_bytes: 300,
            }
        );
    }
}
