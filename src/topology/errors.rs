/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for the topology module

use crate::graph::GraphError;
use std::io;
use thiserror::Error;

/// Errors raised while computing or storing topological descriptors
#[derive(Error, Debug)]
pub enum TopologyError {
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid feature file: {0}")]
    Format(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for topology operations
pub type Result<T> = std::result::Result<T, TopologyError>;
