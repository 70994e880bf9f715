/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Per-atom Betti descriptors and their binary storage
//!
//! Every atom contributes one row: statistics of the dimension-0 death
//! times, then statistics of the dimension-1 persistences, births and
//! deaths of its local neighbor cloud.

use super::errors::{Result, TopologyError};
use super::persistence::{compute_persistence, PersistencePair};
use crate::graph::{
    compare_neighbors, required_shell_depth, ImagePolicy, IndexOptions, PeriodicNeighborIndex,
    RawNeighbor,
};
use crate::structure::{Structure, Vector3D};
use log::debug;
use ndarray::Array2;
use rayon::prelude::*;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Statistics per value set
const STAT_COUNT: usize = 5;

/// Columns per atom: one block for dimension 0, three for dimension 1
pub const BETTI_FEATURE_DIM: usize = 4 * STAT_COUNT;

/// Summary of one value set drawn from a diagram
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BettiStatistics {
    pub mean: f64,
    /// Population standard deviation
    pub std: f64,
    pub max: f64,
    pub min: f64,
    /// Sum of the values scaled by the caller's weight
    pub weighted_sum: f64,
}

impl BettiStatistics {
    /// Values in column order
    pub fn to_array(self) -> [f64; STAT_COUNT] {
        [self.mean, self.std, self.max, self.min, self.weighted_sum]
    }
}

/// Which coordinate of a pair to summarise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairValue {
    Birth,
    Death,
    Persistence,
}

impl PairValue {
    fn of(self, pair: &PersistencePair) -> f64 {
        match self {
            PairValue::Birth => pair.birth,
            PairValue::Death => pair.death,
            PairValue::Persistence => pair.persistence(),
        }
    }
}

/// Statistics of `value` over the finite pairs of `diagram`
///
/// Essential pairs are skipped. An empty selection gives all zeros.
pub fn compute_statistics(
    diagram: &[PersistencePair],
    value: PairValue,
    weight: f64,
) -> BettiStatistics {
    let values: Vec<f64> = diagram
        .iter()
        .filter(|p| !p.is_essential())
        .map(|p| value.of(p))
        .collect();
    if values.is_empty() {
        return BettiStatistics::default();
    }

    let n = values.len() as f64;
    let sum: f64 = values.iter().sum();
    let mean = sum / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    BettiStatistics {
        mean,
        std: variance.sqrt(),
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        weighted_sum: sum * weight,
    }
}

/// Feature row of one atom from its neighbors within `r_cutoff`
///
/// The cloud is the atom itself plus every neighbor image. Sums are
/// weighted by the inverse count of the atom's species.
pub fn atom_betti_features(
    structure: &Structure,
    atom_index: usize,
    neighbors: &[RawNeighbor],
    r_cutoff: f64,
) -> Result<Vec<f64>> {
    let site = structure.site(atom_index).ok_or_else(|| {
        TopologyError::InvalidParameter(format!(
            "atom index {} out of range ({} atoms)",
            atom_index,
            structure.num_atoms()
        ))
    })?;
    let center = *site.cartesian();

    let mut cloud: Vec<Vector3D> = Vec::with_capacity(neighbors.len() + 1);
    cloud.push(center);
    cloud.extend(neighbors.iter().map(|n| center + n.displacement));
    let diagrams = compute_persistence(&cloud, r_cutoff);

    let weight = 1.0 / structure.count(site.species()).max(1) as f64;
    let mut row = Vec::with_capacity(BETTI_FEATURE_DIM);
    row.extend(compute_statistics(&diagrams.dim0, PairValue::Death, weight).to_array());
    for value in [PairValue::Persistence, PairValue::Birth, PairValue::Death] {
        row.extend(compute_statistics(&diagrams.dim1, value, weight).to_array());
    }
    Ok(row)
}

/// Betti feature matrix of a structure, one row per atom
pub fn structure_betti_features(
    structure: &Structure,
    r_cutoff: f64,
    parallel: bool,
) -> Result<Array2<f64>> {
    if !(r_cutoff.is_finite() && r_cutoff > 0.0) {
        return Err(TopologyError::InvalidParameter(format!(
            "cutoff must be positive and finite, got {}",
            r_cutoff
        )));
    }

    let options = IndexOptions {
        shell_depth: required_shell_depth(structure.lattice(), r_cutoff),
        image_policy: ImagePolicy::AllImages,
        parallel,
    };
    let index = PeriodicNeighborIndex::build(structure, options)?;
    let mut neighbors = index.query_all(r_cutoff)?;
    for list in &mut neighbors {
        list.sort_by(compare_neighbors);
    }
    debug!(
        "Betti features for {} atoms, cutoff {:.3} Å, shell depth {}",
        structure.num_atoms(),
        r_cutoff,
        index.shell_depth()
    );

    let row_for = |(i, list): (usize, &Vec<RawNeighbor>)| {
        atom_betti_features(structure, i, list, r_cutoff)
    };
    let rows: Vec<Vec<f64>> = if parallel {
        neighbors.par_iter().enumerate().map(row_for).collect::<Result<_>>()?
    } else {
        neighbors.iter().enumerate().map(row_for).collect::<Result<_>>()?
    };

    Array2::from_shape_vec((rows.len(), BETTI_FEATURE_DIM), rows.concat())
        .map_err(|e| TopologyError::Format(e.to_string()))
}

/// Write a feature matrix as `i32` rows, `i32` cols, then column-major `f64`
///
/// All values are little-endian.
pub fn save_betti_features<P: AsRef<Path>>(path: P, features: &Array2<f64>) -> Result<()> {
    let (rows, cols) = features.dim();
    let header = |n: usize| {
        i32::try_from(n)
            .map_err(|_| TopologyError::Format(format!("dimension {} does not fit in i32", n)))
    };
    let (rows, cols) = (header(rows)?, header(cols)?);

    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(&rows.to_le_bytes())?;
    writer.write_all(&cols.to_le_bytes())?;
    for value in features.t().iter() {
        writer.write_all(&value.to_le_bytes())?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a matrix written by [`save_betti_features`]
pub fn load_betti_features<P: AsRef<Path>>(path: P) -> Result<Array2<f64>> {
    let bytes = fs::read(path)?;
    if bytes.len() < 8 {
        return Err(TopologyError::Format(format!(
            "{} bytes is too short for the header",
            bytes.len()
        )));
    }
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[0..4]);
    let rows = i32::from_le_bytes(word);
    word.copy_from_slice(&bytes[4..8]);
    let cols = i32::from_le_bytes(word);
    let (rows, cols) = match (usize::try_from(rows), usize::try_from(cols)) {
        (Ok(r), Ok(c)) => (r, c),
        _ => {
            return Err(TopologyError::Format(format!(
                "negative dimensions {} x {}",
                rows, cols
            )))
        }
    };

    let body = &bytes[8..];
    let expected = rows.checked_mul(cols).and_then(|n| n.checked_mul(8));
    if expected != Some(body.len()) {
        return Err(TopologyError::Format(format!(
            "{} x {} matrix does not match {} data bytes",
            rows,
            cols,
            body.len()
        )));
    }

    let data: Vec<f64> = body
        .chunks_exact(8)
        .map(|chunk| {
            let mut value = [0u8; 8];
            value.copy_from_slice(chunk);
            f64::from_le_bytes(value)
        })
        .collect();
    let transposed = Array2::from_shape_vec((cols, rows), data)
        .map_err(|e| TopologyError::Format(e.to_string()))?;
    Ok(transposed.reversed_axes())
}
