/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for the graph module

use thiserror::Error;

/// Errors raised while indexing a structure or assembling its graph
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("No structure loaded")]
    NotLoaded,

    #[error("Spatial index error: {0}")]
    Index(String),

    #[error("No embedding for species '{0}'")]
    MissingEmbedding(String),
}

/// Result type for graph operations
pub type Result<T> = std::result::Result<T, GraphError>;
