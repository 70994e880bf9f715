/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Defect dataset records
//!
//! Comma-separated rows of
//! `pris_idx,vac_idx,energy,vac_type,formation_energy` after one header row.
//! Each row labels a defective structure with its formation energy, which is
//! the regression target attached to a crystal graph.

use super::errors::{DataError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// One labelled defect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefectEntry {
    /// Index of the pristine host structure
    pub pris_idx: i32,
    /// Index of the vacancy site / defective structure
    pub vac_idx: i32,
    /// Total energy of the defective cell (eV)
    pub energy: f64,
    /// Species removed to create the vacancy
    pub vac_type: String,
    /// Vacancy formation energy (eV)
    pub formation_energy: f64,
}

impl DefectEntry {
    /// File name of the defective structure, `<pris_idx>_<vac_idx>.vasp`
    pub fn structure_file_name(&self) -> String {
        format!("{}_{}.vasp", self.pris_idx, self.vac_idx)
    }
}

fn parse_field<T: FromStr>(field: Option<&str>, name: &str, line: usize) -> Result<T> {
    let text = field.map(str::trim).ok_or_else(|| DataError::Parse {
        line,
        message: format!("missing column '{}'", name),
    })?;
    text.parse().map_err(|_| DataError::Parse {
        line,
        message: format!("invalid {} '{}'", name, text),
    })
}

/// Parse the defect table from CSV text; blank lines are skipped
pub fn parse_defect_csv(text: &str) -> Result<Vec<DefectEntry>> {
    let mut entries = Vec::new();

    for (i, line) in text.lines().enumerate().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        let line_number = i + 1;
        let mut fields = line.split(',');

        let entry = DefectEntry {
            pris_idx: parse_field(fields.next(), "pris_idx", line_number)?,
            vac_idx: parse_field(fields.next(), "vac_idx", line_number)?,
            energy: parse_field(fields.next(), "energy", line_number)?,
            vac_type: parse_field(fields.next(), "vac_type", line_number)?,
            formation_energy: parse_field(fields.next(), "formation_energy", line_number)?,
        };
        let extra = fields.count();
        if extra > 0 {
            return Err(DataError::Parse {
                line: line_number,
                message: format!("expected 5 columns, found {}", 5 + extra),
            });
        }
        entries.push(entry);
    }

    Ok(entries)
}

/// Read the defect table from a file
pub fn read_defect_csv<P: AsRef<Path>>(path: P) -> Result<Vec<DefectEntry>> {
    let text = fs::read_to_string(path)?;
    parse_defect_csv(&text)
}
