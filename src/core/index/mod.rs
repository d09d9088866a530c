//! # Index Module
//!
//! A vantage-point tree for proximity search over fingerprints.
//!
//! ## How It Works
//! 1. Pick a vantage point at random and measure the distance to every other point
//! 2. Split the rest at the median distance: closer points go inside, the others outside
//! 3. Recurse on both halves
//!
//! At query time the triangle inequality decides whether the ball of radius
//! `tau` around the query can reach each half; halves it cannot reach are
//! skipped entirely.
//!
//! ## Queries
//! - `range_query` - every point strictly closer than a fixed bound
//! - `k_nearest` - the `k` closest points, with a bound that shrinks as results arrive
//!
//! The metric must be symmetric and obey the triangle inequality, otherwise
//! pruning drops valid results. Hamming distance does both.

mod neighbors;
mod vptree;

pub use vptree::VpTree;

use crate::core::hasher::Fingerprint;
use crate::error::IndexError;

/// A distance function over points of type `P`
pub trait Metric<P> {
    fn distance(&self, a: &P, b: &P) -> Result<u32, IndexError>;
}

/// Hamming distance between fingerprints
#[derive(Debug, Clone, Copy, Default)]
pub struct Hamming;

impl Metric<Fingerprint> for Hamming {
    fn distance(&self, a: &Fingerprint, b: &Fingerprint) -> Result<u32, IndexError> {
        Ok(a.distance(b)?)
    }
}
