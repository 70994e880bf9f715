/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Auxiliary data files: element embeddings and labelled defect datasets

pub mod dataset;
pub mod embeddings;
pub mod errors;

pub use dataset::{parse_defect_csv, read_defect_csv, DefectEntry};
pub use embeddings::AtomEmbeddings;
pub use errors::{DataError, Result};
