/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for auxiliary data files

use std::io;
use thiserror::Error;

/// Errors that can occur while reading embedding tables and datasets
#[derive(Error, Debug)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// Result type for data file operations
pub type Result<T> = std::result::Result<T, DataError>;
