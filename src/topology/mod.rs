/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Topological descriptors of local atomic environments
//!
//! Each atom's neighbor cloud is turned into a Vietoris–Rips filtration and
//! summarised by statistics over its persistence diagrams. The resulting
//! per-atom rows can be appended to [`CrystalGraph`](crate::graph::CrystalGraph)
//! node features.

pub mod betti;
pub mod errors;
pub mod persistence;

pub use betti::{
    atom_betti_features, compute_statistics, load_betti_features, save_betti_features,
    structure_betti_features, BettiStatistics, PairValue, BETTI_FEATURE_DIM,
};
pub use errors::{Result, TopologyError};
pub use persistence::{compute_persistence, PersistenceDiagram, PersistencePair, PersistenceResult};
