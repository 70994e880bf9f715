/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Neighbor cap and deterministic ordering of radius-query results

use super::index::RawNeighbor;
use std::cmp::Ordering;

/// Total order used for neighbor selection
///
/// Ascending distance, then ascending target atom index, then cell shift in
/// lexicographic order. Independent of the order the index produced results.
pub fn compare_neighbors(a: &RawNeighbor, b: &RawNeighbor) -> Ordering {
    a.distance
        .total_cmp(&b.distance)
        .then(a.index.cmp(&b.index))
        .then(a.shift.cmp(&b.shift))
}

/// Applies the per-atom neighbor cap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighborSelector {
    max_neighbors: usize,
}

impl NeighborSelector {
    /// Create a selector keeping at most `max_neighbors` entries per atom
    pub fn new(max_neighbors: usize) -> Self {
        Self { max_neighbors }
    }

    /// Create a selector from a signed cap; zero or negative keeps nothing
    pub fn from_signed(max_neighbors: i64) -> Self {
        Self::new(usize::try_from(max_neighbors).unwrap_or(0))
    }

    /// The neighbor cap
    pub fn max_neighbors(&self) -> usize {
        self.max_neighbors
    }

    /// Sort raw neighbors and keep the first `max_neighbors`
    pub fn select(&self, mut raw: Vec<RawNeighbor>) -> Vec<RawNeighbor> {
        if self.max_neighbors == 0 {
            return Vec::new();
        }
        raw.sort_by(compare_neighbors);
        raw.truncate(self.max_neighbors);
        raw
    }
}

/// Select with a signed cap, see [`NeighborSelector::from_signed`]
pub fn select(raw: Vec<RawNeighbor>, max_neighbors: i64) -> Vec<RawNeighbor> {
    NeighborSelector::from_signed(max_neighbors).select(raw)
}
