/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! # crystal-graph
//!
//! Turns a periodic crystal structure into a neighbor graph for graph-based
//! learning.
//!
//! The pipeline parses POSCAR-style structure text into a [`Structure`],
//! indexes every atom's periodic images in a k-d tree, selects a capped,
//! deterministically ordered set of neighbors per atom and flattens them into
//! a directed [`Graph`] with per-edge distances, displacements and an optional
//! Gaussian radial-basis encoding. The [`topology`] module summarises each
//! atom's local environment by persistent homology.
//!
//! ```no_run
//! use crystal_graph::GraphSession;
//!
//! let text = std::fs::read_to_string("POSCAR").unwrap();
//! let mut session = GraphSession::new();
//! if session.load_structure(&text) {
//!     session.build_graph(6.0, 12).unwrap();
//!     println!("{} edges", session.num_edges());
//! }
//! ```

pub mod cli;
pub mod graph;
pub mod io;
pub mod session;
pub mod structure;
pub mod topology;

pub use graph::{Graph, GraphConfig, GraphError};
pub use session::{GraphSession, SessionState};
pub use structure::{parse_structure, Structure, StructureFormatError};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
