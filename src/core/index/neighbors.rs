//! Bounded best-k accumulator for nearest-neighbour search.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A result candidate ordered by distance, then by arrival.
struct Candidate<'a, P> {
    distance: u32,
    sequence: u64,
    point: &'a P,
}

impl<P> Candidate<'_, P> {
    fn key(&self) -> (u32, u64) {
        (self.distance, self.sequence)
    }
}

impl<P> PartialEq for Candidate<'_, P> {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl<P> Eq for Candidate<'_, P> {}

impl<P> PartialOrd for Candidate<'_, P> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<P> Ord for Candidate<'_, P> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Max-heap holding at most `capacity` candidates.
///
/// The worst candidate sits on top so it can be evicted in `O(log k)`.
/// Equal distances keep the earlier arrival.
pub(crate) struct Neighbors<'a, P> {
    capacity: usize,
    heap: BinaryHeap<Candidate<'a, P>>,
    next_sequence: u64,
}

impl<'a, P> Neighbors<'a, P> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            heap: BinaryHeap::with_capacity(capacity + 1),
            next_sequence: 0,
        }
    }

    /// Current pruning bound: the worst kept distance once full, unbounded before.
    pub(crate) fn bound(&self) -> u32 {
        if self.heap.len() < self.capacity {
            return u32::MAX;
        }
        self.heap.peek().map_or(u32::MAX, |worst| worst.distance)
    }

    /// Keep `point` if it beats the current bound.
    pub(crate) fn offer(&mut self, distance: u32, point: &'a P) {
        if self.capacity == 0 || distance >= self.bound() {
            return;
        }

        self.heap.push(Candidate {
            distance,
            sequence: self.next_sequence,
            point,
        });
        self.next_sequence += 1;

        if self.heap.len() > self.capacity {
            self.heap.pop();
        }
    }

    /// Kept candidates, closest first.
    pub(crate) fn into_sorted_vec(self) -> Vec<(u32, &'a P)> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|c| (c.distance, c.point))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_the_closest() {
        let points = ["a", "b", "c", "d"];
        let mut neighbors = Neighbors::new(2);
        neighbors.offer(5, &points[0]);
        neighbors.offer(1, &points[1]);
        neighbors.offer(3, &points[2]);
        neighbors.offer(9, &points[3]);

        let kept = neighbors.into_sorted_vec();
        assert_eq!(kept, vec![(1, &"b"), (3, &"c")]);
    }

    #[test]
    fn bound_is_unbounded_until_full() {
        let points = [0u8; 3];
        let mut neighbors = Neighbors::new(2);
        assert_eq!(neighbors.bound(), u32::MAX);
        neighbors.offer(4, &points[0]);
        assert_eq!(neighbors.bound(), u32::MAX);
        neighbors.offer(7, &points[1]);
        assert_eq!(neighbors.bound(), 7);
        neighbors.offer(2, &points[2]);
        assert_eq!(neighbors.bound(), 4);
    }

    #[test]
    fn ties_keep_earlier_arrival() {
        let points = ["first", "second", "third"];
        let mut neighbors = Neighbors::new(2);
        neighbors.offer(3, &points[0]);
        neighbors.offer(3, &points[1]);
        neighbors.offer(3, &points[2]);

        let kept = neighbors.into_sorted_vec();
        assert_eq!(kept, vec![(3, &"first"), (3, &"second")]);
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let points = [1u8];
        let mut neighbors = Neighbors::new(0);
        neighbors.offer(0, &points[0]);
        assert!(neighbors.into_sorted_vec().is_empty());
    }
}
