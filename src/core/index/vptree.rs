//! Vantage-point tree construction and search.

use super::neighbors::Neighbors;
use super::Metric;
use crate::error::IndexError;
use rand::Rng;
use std::collections::VecDeque;

/// One partition of the point set.
///
/// Every point below `inner` is closer than `radius` to the vantage point,
/// every point below `outer` is at least `radius` away. Leaves have no
/// radius and no children.
#[derive(Debug)]
struct Node<P> {
    vantage_point: P,
    radius: Option<u32>,
    inner: Option<usize>,
    outer: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
enum Side {
    Inner,
    Outer,
}

/// An immutable metric tree over an owned set of points.
///
/// Nodes live in a flat arena; the root is at index 0.
#[derive(Debug)]
pub struct VpTree<P, M> {
    nodes: Vec<Node<P>>,
    metric: M,
}

impl<P, M: Metric<P>> VpTree<P, M> {
    /// Build a tree, picking vantage points with the thread-local RNG.
    pub fn build(points: Vec<P>, metric: M) -> Result<Self, IndexError> {
        Self::build_with_rng(points, metric, &mut rand::rng())
    }

    /// Build a tree, picking vantage points with `rng`.
    ///
    /// Takes ownership of every point; duplicates are kept as separate
    /// nodes. Vantage selection only affects balance, never results, so a
    /// seeded RNG gives reproducible trees without changing query answers.
    pub fn build_with_rng<R: Rng + ?Sized>(
        points: Vec<P>,
        metric: M,
        rng: &mut R,
    ) -> Result<Self, IndexError> {
        if points.is_empty() {
            return Err(IndexError::EmptyInput);
        }

        let mut nodes: Vec<Node<P>> = Vec::with_capacity(points.len());
        // Explicit stack: identical points chain through `outer` and can nest
        // as deep as the input is long.
        let mut pending: Vec<(Vec<P>, Option<(usize, Side)>)> = vec![(points, None)];

        while let Some((mut points, parent)) = pending.pop() {
            let pick = rng.random_range(0..points.len());
            let vantage_point = points.swap_remove(pick);
            let index = nodes.len();

            let mut radius = None;
            let mut inner_points = Vec::new();
            let mut outer_points = Vec::new();

            if !points.is_empty() {
                let distances = points
                    .iter()
                    .map(|p| metric.distance(&vantage_point, p))
                    .collect::<Result<Vec<u32>, _>>()?;

                let mut sorted = distances.clone();
                sorted.sort_unstable();
                let median = sorted[sorted.len() / 2];
                radius = Some(median);

                for (point, distance) in points.into_iter().zip(distances) {
                    if distance < median {
                        inner_points.push(point);
                    } else {
                        outer_points.push(point);
                    }
                }
            }

            nodes.push(Node {
                vantage_point,
                radius,
                inner: None,
                outer: None,
            });

            if let Some((parent, side)) = parent {
                match side {
                    Side::Inner => nodes[parent].inner = Some(index),
                    Side::Outer => nodes[parent].outer = Some(index),
                }
            }

            if !inner_points.is_empty() {
                pending.push((inner_points, Some((index, Side::Inner))));
            }
            if !outer_points.is_empty() {
                pending.push((outer_points, Some((index, Side::Outer))));
            }
        }

        Ok(Self { nodes, metric })
    }

    /// Every point strictly closer than `tau` to `query`, with its distance.
    ///
    /// Results come in traversal order. `tau = 0` matches nothing.
    pub fn range_query(&self, query: &P, tau: u32) -> Result<Vec<(u32, &P)>, IndexError> {
        let mut found = Vec::new();
        self.search(query, |distance, point| {
            if distance < tau {
                found.push((distance, point));
            }
            tau
        })?;
        Ok(found)
    }

    /// The `k` points closest to `query`, closest first.
    ///
    /// Returns `min(k, len)` results. Equal distances are ordered by the
    /// order in which the search reached them.
    pub fn k_nearest(&self, query: &P, k: usize) -> Result<Vec<(u32, &P)>, IndexError> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut best = Neighbors::new(k);
        self.search(query, |distance, point| {
            best.offer(distance, point);
            best.bound()
        })?;
        Ok(best.into_sorted_vec())
    }

    /// Breadth-first walk with triangle-inequality pruning.
    ///
    /// `visit` sees every reached vantage point and returns the bound to
    /// prune that node's children with.
    fn search<'a, F>(&'a self, query: &P, mut visit: F) -> Result<(), IndexError>
    where
        F: FnMut(u32, &'a P) -> u32,
    {
        let mut work = VecDeque::from([0usize]);

        while let Some(index) = work.pop_front() {
            let node = &self.nodes[index];
            let distance = self.metric.distance(query, &node.vantage_point)?;
            let tau = visit(distance, &node.vantage_point);

            let Some(radius) = node.radius else {
                continue;
            };

            let reach_inner = distance < radius.saturating_add(tau);
            let reach_outer = distance >= radius.saturating_sub(tau);

            let order = if distance < radius {
                [(node.inner, reach_inner), (node.outer, reach_outer)]
            } else {
                [(node.outer, reach_outer), (node.inner, reach_inner)]
            };

            for (child, reachable) in order {
                if let (Some(child), true) = (child, reachable) {
                    work.push_back(child);
                }
            }
        }

        Ok(())
    }
}

impl<P, M> VpTree<P, M> {
    /// Number of indexed points
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: construction rejects empty input
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All indexed points, in arena order
    pub fn points(&self) -> impl Iterator<Item = &P> {
        self.nodes.iter().map(|n| &n.vantage_point)
    }

    /// Longest root-to-leaf path, counted in nodes
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(0usize, 1usize)];
        while let Some((index, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            let node = &self.nodes[index];
            for child in [node.inner, node.outer].into_iter().flatten() {
                stack.push((child, depth + 1));
            }
        }
        deepest
    }
}
