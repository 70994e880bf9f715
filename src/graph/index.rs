/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Spatial index over the periodic images of a structure
//!
//! Every atom is replicated over the integer cell shifts of a replication
//! shell (depth 1 gives the 3×3×3 = 27 image layout) and the images are put
//! in a k-d tree. A radius query around a home-cell atom then finds neighbors
//! across cell boundaries directly, without relying on the minimum-image
//! convention.

use super::config::ImagePolicy;
use super::errors::{GraphError, Result};
use crate::structure::{shift_vector, Lattice, Structure, Vector3D};
use kdtree::distance::squared_euclidean;
use kdtree::KdTree;
use log::debug;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fmt;

/// Integer cell translation (in units of the lattice vectors)
pub type PeriodicShift = [i32; 3];

/// Relative slack on the tree search radius so boundary points survive rounding
const SEARCH_SLACK: f64 = 1e-9;

/// A neighbor found by a radius query, before selection
#[derive(Debug, Clone, PartialEq)]
pub struct RawNeighbor {
    /// Index of the neighboring atom in the home cell
    pub index: usize,
    /// Distance from the query atom in Å
    pub distance: f64,
    /// Cartesian vector from the query atom to the neighbor image
    pub displacement: Vector3D,
    /// Cell shift of the neighbor image
    pub shift: PeriodicShift,
}

/// Options controlling index construction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexOptions {
    /// Number of cells replicated on each side of the home cell
    pub shell_depth: u32,
    /// Treatment of multiple images of one target atom
    pub image_policy: ImagePolicy,
    /// Generate images and answer bulk queries with rayon
    pub parallel: bool,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            shell_depth: 1,
            image_policy: ImagePolicy::AllImages,
            parallel: false,
        }
    }
}

/// One periodic image stored in the tree
#[derive(Debug, Clone)]
struct ImageEntry {
    atom: usize,
    shift: PeriodicShift,
    position: Vector3D,
}

/// Shell depth whose images cover every neighbor within `r_cutoff`
///
/// Atoms live in the home cell, so images out to `n` cells on each side reach
/// at least `n` times the smallest perpendicular cell height.
pub fn required_shell_depth(lattice: &Lattice, r_cutoff: f64) -> u32 {
    let h_min = lattice.min_perpendicular_height();
    ((r_cutoff / h_min).ceil() as u32).max(1)
}

/// All shifts in {-depth..depth}³, in lexicographic order
fn shell_shifts(depth: u32) -> Vec<PeriodicShift> {
    let n = depth as i32;
    let mut shifts = Vec::with_capacity((2 * depth as usize + 1).pow(3));
    for a in -n..=n {
        for b in -n..=n {
            for c in -n..=n {
                shifts.push([a, b, c]);
            }
        }
    }
    shifts
}

/// Periodic neighbor index for one structure
pub struct PeriodicNeighborIndex {
    tree: KdTree<f64, usize, [f64; 3]>,
    entries: Vec<ImageEntry>,
    home: Vec<Vector3D>,
    options: IndexOptions,
    reach: f64,
}

impl PeriodicNeighborIndex {
    /// Build the index over all images of `structure` within the shell
    ///
    /// The index is fully constructed before it is returned, so no query can
    /// observe a partial tree even when images are generated in parallel.
    pub fn build(structure: &Structure, options: IndexOptions) -> Result<Self> {
        if options.shell_depth == 0 {
            return Err(GraphError::InvalidParameter(
                "shell depth must be at least 1".to_string(),
            ));
        }

        let lattice = structure.lattice();
        let home = structure.cartesian_positions();
        let shifts = shell_shifts(options.shell_depth);

        let images_for = |shift: &PeriodicShift| -> Vec<ImageEntry> {
            let offset = shift_vector(lattice, *shift);
            home.iter()
                .enumerate()
                .map(|(atom, position)| ImageEntry {
                    atom,
                    shift: *shift,
                    position: *position + offset,
                })
                .collect()
        };

        let blocks: Vec<Vec<ImageEntry>> = if options.parallel {
            shifts.par_iter().map(images_for).collect()
        } else {
            shifts.iter().map(images_for).collect()
        };
        let entries: Vec<ImageEntry> = blocks.into_iter().flatten().collect();

        let mut tree = KdTree::new(3);
        for (i, entry) in entries.iter().enumerate() {
            tree.add(entry.position.to_array(), i)
                .map_err(|e| GraphError::Index(e.to_string()))?;
        }

        let reach = options.shell_depth as f64 * lattice.min_perpendicular_height();
        debug!(
            "Built periodic index: {} atoms, shell depth {}, {} images, reach {:.3} Å",
            home.len(),
            options.shell_depth,
            entries.len(),
            reach
        );

        Ok(Self {
            tree,
            entries,
            home,
            options,
            reach,
        })
    }

    /// Number of atoms in the home cell
    pub fn num_atoms(&self) -> usize {
        self.home.len()
    }

    /// Number of periodic images stored in the tree
    pub fn num_images(&self) -> usize {
        self.entries.len()
    }

    /// Replication depth the index was built with
    pub fn shell_depth(&self) -> u32 {
        self.options.shell_depth
    }

    /// Options the index was built with
    pub fn options(&self) -> &IndexOptions {
        &self.options
    }

    /// Largest cutoff the index answers exactly
    ///
    /// This is half the replication shell width, `shell_depth × h_min` where
    /// `h_min` is the smallest perpendicular cell height.
    pub fn max_cutoff(&self) -> f64 {
        self.reach
    }

    fn check_cutoff(&self, r_cutoff: f64) -> Result<()> {
        if !(r_cutoff.is_finite() && r_cutoff > 0.0) {
            return Err(GraphError::InvalidParameter(format!(
                "cutoff must be positive, got {}",
                r_cutoff
            )));
        }
        if r_cutoff > self.reach {
            return Err(GraphError::InvalidParameter(format!(
                "cutoff {:.4} Å exceeds the {:.4} Å reach of a depth-{} replication shell",
                r_cutoff, self.reach, self.options.shell_depth
            )));
        }
        Ok(())
    }

    /// All images within `r_cutoff` of atom `atom_index`
    ///
    /// The atom's own zero-shift image is excluded; its other images are
    /// ordinary neighbors. Results are unordered.
    pub fn query(&self, atom_index: usize, r_cutoff: f64) -> Result<Vec<RawNeighbor>> {
        self.check_cutoff(r_cutoff)?;
        let center = *self.home.get(atom_index).ok_or_else(|| {
            GraphError::InvalidParameter(format!(
                "atom index {} out of range ({} atoms)",
                atom_index,
                self.home.len()
            ))
        })?;

        let search_radius = r_cutoff * (1.0 + SEARCH_SLACK);
        let matches = self
            .tree
            .within(
                &center.to_array(),
                search_radius * search_radius,
                &squared_euclidean,
            )
            .map_err(|e| GraphError::Index(e.to_string()))?;

        let mut neighbors = Vec::with_capacity(matches.len());
        for (_, &entry_idx) in matches {
            let entry = &self.entries[entry_idx];
            if entry.atom == atom_index && entry.shift == [0, 0, 0] {
                continue;
            }
            let displacement = entry.position - center;
            let distance = displacement.length();
            if distance <= r_cutoff {
                neighbors.push(RawNeighbor {
                    index: entry.atom,
                    distance,
                    displacement,
                    shift: entry.shift,
                });
            }
        }

        if self.options.image_policy == ImagePolicy::ClosestImage {
            neighbors = closest_images(neighbors);
        }

        Ok(neighbors)
    }

    /// Query every atom of the home cell, in atom order
    pub fn query_all(&self, r_cutoff: f64) -> Result<Vec<Vec<RawNeighbor>>> {
        self.check_cutoff(r_cutoff)?;
        if self.options.parallel {
            (0..self.home.len())
                .into_par_iter()
                .map(|i| self.query(i, r_cutoff))
                .collect()
        } else {
            (0..self.home.len())
                .map(|i| self.query(i, r_cutoff))
                .collect()
        }
    }
}

/// Keep only the closest image per target atom, ties going to the smaller shift
fn closest_images(neighbors: Vec<RawNeighbor>) -> Vec<RawNeighbor> {
    let mut best: BTreeMap<usize, RawNeighbor> = BTreeMap::new();
    for neighbor in neighbors {
        let replace = match best.get(&neighbor.index) {
            Some(current) => current
                .distance
                .total_cmp(&neighbor.distance)
                .then(current.shift.cmp(&neighbor.shift))
                .is_gt(),
            None => true,
        };
        if replace {
            best.insert(neighbor.index, neighbor);
        }
    }
    best.into_values().collect()
}

impl fmt::Debug for PeriodicNeighborIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeriodicNeighborIndex")
            .field("num_atoms", &self.home.len())
            .field("num_images", &self.entries.len())
            .field("options", &self.options)
            .field("reach", &self.reach)
            .finish_non_exhaustive()
    }
}
