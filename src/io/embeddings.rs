/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Per-element embedding vectors used as node features
//!
//! The table is a JSON object keyed by atomic number:
//!
//! ```json
//! { "1": [0.0, 1.0, ...], "8": [1.0, 0.0, ...] }
//! ```

use super::errors::{DataError, Result};
use log::debug;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

/// Embedding table indexed by atomic number
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AtomEmbeddings {
    dims: usize,
    table: BTreeMap<i32, Vec<f64>>,
}

impl AtomEmbeddings {
    /// Parse the JSON table from text
    ///
    /// All vectors must share one dimension and every key must be an
    /// atomic number.
    pub fn from_json(text: &str) -> Result<Self> {
        let raw: HashMap<String, Vec<f64>> = serde_json::from_str(text)?;

        let mut table = BTreeMap::new();
        for (key, vector) in raw {
            let z: i32 = key.trim().parse().map_err(|_| DataError::Parse {
                line: 0,
                message: format!("embedding key '{}' is not an atomic number", key),
            })?;
            table.insert(z, vector);
        }

        let dims = table.values().next().map(Vec::len).unwrap_or(0);
        if let Some((z, v)) = table.iter().find(|(_, v)| v.len() != dims) {
            return Err(DataError::Parse {
                line: 0,
                message: format!(
                    "embedding for Z={} has {} values, expected {}",
                    z,
                    v.len(),
                    dims
                ),
            });
        }

        debug!("Loaded {} atom embeddings of dimension {}", table.len(), dims);
        Ok(Self { dims, table })
    }

    /// Read the JSON table from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Embedding dimension
    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Number of elements in the table
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// True when the table has no entries
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Embedding for atomic number `z`
    pub fn get(&self, z: i32) -> Option<&[f64]> {
        self.table.get(&z).map(Vec::as_slice)
    }
}
