//! Images bucketed by identical fingerprint.

use crate::core::hasher::Fingerprint;
use std::collections::HashMap;
use std::path::PathBuf;

/// Fingerprint -> images, iterated in the order fingerprints were first seen.
#[derive(Debug, Clone, Default)]
pub struct FingerprintBuckets {
    order: Vec<Fingerprint>,
    images: HashMap<Fingerprint, Vec<PathBuf>>,
}

impl FingerprintBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an image under its fingerprint
    pub fn insert(&mut self, fingerprint: Fingerprint, path: PathBuf) {
        match self.images.get_mut(&fingerprint) {
            Some(paths) => paths.push(path),
            None => {
                self.order.push(fingerprint.clone());
                self.images.insert(fingerprint, vec![path]);
            }
        }
    }

    /// Images sharing `fingerprint`
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&[PathBuf]> {
        self.images.get(fingerprint).map(Vec::as_slice)
    }

    /// Buckets in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&Fingerprint, &[PathBuf])> {
        self.order
            .iter()
            .map(move |fp| (fp, self.images[fp].as_slice()))
    }

    /// Distinct fingerprints, in first-seen order
    pub fn fingerprints(&self) -> &[Fingerprint] {
        &self.order
    }

    /// Number of distinct fingerprints
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of images across all buckets
    pub fn image_count(&self) -> usize {
        self.images.values().map(Vec::len).sum()
    }
}

impl FromIterator<(Fingerprint, PathBuf)> for FingerprintBuckets {
    fn from_iter<I: IntoIterator<Item = (Fingerprint, PathBuf)>>(iter: I) -> Self {
        let mut buckets = Self::new();
        for (fingerprint, path) in iter {
            buckets.insert(fingerprint, path);
        }
        buckets
    }
}
