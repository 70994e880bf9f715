/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Neighbor graph construction
//!
//! A [`PeriodicNeighborIndex`] answers radius queries over periodic images,
//! the [`NeighborSelector`] caps and orders each atom's neighbors, and the
//! [`GraphAssembler`] flattens the result into a directed [`Graph`].

pub mod assembler;
pub mod config;
pub mod crystal;
pub mod errors;
pub mod features;
pub mod index;
pub mod selector;

pub use assembler::{Edge, Graph, GraphArrays, GraphAssembler};
pub use config::{GraphConfig, ImagePolicy, RbfConfig};
pub use crystal::CrystalGraph;
pub use errors::{GraphError, Result};
pub use features::GaussianRbf;
pub use index::{
    required_shell_depth, IndexOptions, PeriodicNeighborIndex, PeriodicShift, RawNeighbor,
};
pub use selector::{compare_neighbors, select, NeighborSelector};
