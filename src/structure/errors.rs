/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for the structure module

use thiserror::Error;

/// Errors raised while reading a structure description
///
/// Every variant carries the 1-based line number that caused the failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StructureFormatError {
    #[error("line {line}: missing {expected}")]
    MissingLine { line: usize, expected: String },

    #[error("line {line}: invalid number '{field}'")]
    InvalidNumber { line: usize, field: String },

    #[error("line {line}: non-finite value '{field}'")]
    NonFinite { line: usize, field: String },

    #[error("line {line}: expected {expected} values, found {found}")]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: {species} species symbols but {counts} atom counts")]
    SpeciesCountMismatch {
        line: usize,
        species: usize,
        counts: usize,
    },

    #[error("line {line}: invalid atom count '{field}'")]
    InvalidCount { line: usize, field: String },

    #[error("line {line}: unknown coordinate mode '{found}'")]
    InvalidCoordinateMode { line: usize, found: String },

    #[error("line {line}: lattice matrix is singular (determinant {determinant:e})")]
    SingularLattice { line: usize, determinant: f64 },

    #[error("line {line}: structure contains no atoms")]
    Empty { line: usize },
}

impl StructureFormatError {
    /// Line number the error refers to
    pub fn line(&self) -> usize {
        match self {
            Self::MissingLine { line, .. }
            | Self::InvalidNumber { line, .. }
            | Self::NonFinite { line, .. }
            | Self::FieldCount { line, .. }
            | Self::SpeciesCountMismatch { line, .. }
            | Self::InvalidCount { line, .. }
            | Self::InvalidCoordinateMode { line, .. }
            | Self::SingularLattice { line, .. }
            | Self::Empty { line } => *line,
        }
    }
}

/// Result type for structure operations
pub type Result<T> = std::result::Result<T, StructureFormatError>;
