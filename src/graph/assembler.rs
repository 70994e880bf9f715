/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Assembly of selected neighbors into a directed edge list

use super::errors::{GraphError, Result};
use super::features::GaussianRbf;
use super::index::{PeriodicShift, RawNeighbor};
use super::selector::compare_neighbors;
use crate::structure::{Structure, Vector3D};
use log::debug;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One directed edge of the neighbor graph
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// Source atom index
    pub source: usize,
    /// Target atom index (home-cell index of the neighbor image)
    pub target: usize,
    /// Edge length in Å
    pub distance: f64,
    /// Cartesian vector from source to the target image
    pub displacement: Vector3D,
    /// Cell shift of the target image relative to the source's cell
    pub shift: PeriodicShift,
}

/// Directed neighbor graph for one (structure, cutoff, cap) triple
///
/// Edges are atom-major, and distance-ascending within one source atom.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    num_atoms: usize,
    r_cutoff: f64,
    max_neighbors: usize,
    edges: Vec<Edge>,
    rbf: Option<Array2<f64>>,
}

/// Flattened graph arrays, as handed to a caller or written to JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphArrays {
    pub num_atoms: usize,
    pub r_cutoff: f64,
    pub max_neighbors: usize,
    pub sources: Vec<usize>,
    pub targets: Vec<usize>,
    pub distances: Vec<f64>,
    /// x, y, z interleaved per edge
    pub displacements: Vec<f64>,
    pub shifts: Vec<PeriodicShift>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rbf: Option<Vec<Vec<f64>>>,
}

impl Graph {
    /// Number of atoms (nodes)
    pub fn num_atoms(&self) -> usize {
        self.num_atoms
    }

    /// Number of directed edges
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Cutoff the graph was built with
    pub fn r_cutoff(&self) -> f64 {
        self.r_cutoff
    }

    /// Neighbor cap the graph was built with
    pub fn max_neighbors(&self) -> usize {
        self.max_neighbors
    }

    /// All edges in order
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Source atom of every edge
    pub fn sources(&self) -> Vec<usize> {
        self.edges.iter().map(|e| e.source).collect()
    }

    /// Target atom of every edge
    pub fn targets(&self) -> Vec<usize> {
        self.edges.iter().map(|e| e.target).collect()
    }

    /// Length of every edge
    pub fn distances(&self) -> Vec<f64> {
        self.edges.iter().map(|e| e.distance).collect()
    }

    /// Displacements flattened to x, y, z per edge
    pub fn displacements(&self) -> Vec<f64> {
        self.edges
            .iter()
            .flat_map(|e| e.displacement.to_array())
            .collect()
    }

    /// Cell shift of every edge's target image
    pub fn shifts(&self) -> Vec<PeriodicShift> {
        self.edges.iter().map(|e| e.shift).collect()
    }

    /// Per-edge RBF features (edges × centers), when they were computed
    pub fn rbf_features(&self) -> Option<&Array2<f64>> {
        self.rbf.as_ref()
    }

    /// Number of outgoing edges of every atom
    pub fn out_degrees(&self) -> Vec<usize> {
        let mut degrees = vec![0; self.num_atoms];
        for edge in &self.edges {
            degrees[edge.source] += 1;
        }
        degrees
    }

    /// Index of the edge going back along `edge`, if the graph contains it
    ///
    /// The reverse of i→j with shift s is j→i with shift -s and displacement -d.
    /// It can be missing when the neighbor cap truncated j's list.
    pub fn reverse_edge(&self, edge: usize) -> Option<usize> {
        let e = self.edges.get(edge)?;
        let back_shift = [-e.shift[0], -e.shift[1], -e.shift[2]];
        self.edges
            .iter()
            .position(|r| r.source == e.target && r.target == e.source && r.shift == back_shift)
    }

    /// Edges without a reverse partner, a side effect of per-atom truncation
    pub fn unpaired_edges(&self) -> Vec<usize> {
        let present: HashSet<(usize, usize, PeriodicShift)> = self
            .edges
            .iter()
            .map(|e| (e.source, e.target, e.shift))
            .collect();
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, e)| {
                let back_shift = [-e.shift[0], -e.shift[1], -e.shift[2]];
                !present.contains(&(e.target, e.source, back_shift))
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// Copy the graph into flat arrays
    pub fn to_arrays(&self) -> GraphArrays {
        GraphArrays {
            num_atoms: self.num_atoms,
            r_cutoff: self.r_cutoff,
            max_neighbors: self.max_neighbors,
            sources: self.sources(),
            targets: self.targets(),
            distances: self.distances(),
            displacements: self.displacements(),
            shifts: self.shifts(),
            rbf: self
                .rbf
                .as_ref()
                .map(|m| m.rows().into_iter().map(|r| r.to_vec()).collect()),
        }
    }
}

/// Turns per-atom neighbor selections into a [`Graph`]
#[derive(Debug, Clone)]
pub struct GraphAssembler {
    r_cutoff: f64,
    max_neighbors: usize,
    rbf: Option<GaussianRbf>,
}

impl GraphAssembler {
    /// Create an assembler for the given build parameters
    pub fn new(r_cutoff: f64, max_neighbors: usize) -> Self {
        Self {
            r_cutoff,
            max_neighbors,
            rbf: None,
        }
    }

    /// Also compute the RBF encoding of every edge distance
    pub fn with_rbf(mut self, rbf: GaussianRbf) -> Self {
        self.rbf = Some(rbf);
        self
    }

    /// Flatten `selected[i]`, the neighbors chosen for atom `i`, into a graph
    pub fn assemble(&self, structure: &Structure, selected: Vec<Vec<RawNeighbor>>) -> Result<Graph> {
        if selected.len() != structure.num_atoms() {
            return Err(GraphError::InvalidParameter(format!(
                "{} neighbor lists for {} atoms",
                selected.len(),
                structure.num_atoms()
            )));
        }

        let total: usize = selected.iter().map(Vec::len).sum();
        let mut edges = Vec::with_capacity(total);
        for (source, mut neighbors) in selected.into_iter().enumerate() {
            neighbors.sort_by(compare_neighbors);
            for n in neighbors {
                if n.index >= structure.num_atoms() {
                    return Err(GraphError::InvalidParameter(format!(
                        "neighbor index {} out of range",
                        n.index
                    )));
                }
                edges.push(Edge {
                    source,
                    target: n.index,
                    distance: n.distance,
                    displacement: n.displacement,
                    shift: n.shift,
                });
            }
        }

        let rbf = self.rbf.as_ref().map(|rbf| {
            let distances: Vec<f64> = edges.iter().map(|e| e.distance).collect();
            rbf.expand_all(&distances)
        });

        debug!(
            "Assembled graph: {} atoms, {} edges, cutoff {:.3} Å, cap {}",
            structure.num_atoms(),
            edges.len(),
            self.r_cutoff,
            self.max_neighbors
        );

        Ok(Graph {
            num_atoms: structure.num_atoms(),
            r_cutoff: self.r_cutoff,
            max_neighbors: self.max_neighbors,
            edges,
            rbf,
        })
    }
}
