/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Stateful load/build/read session
//!
//! A [`GraphSession`] owns at most one structure, the periodic index built
//! for it and the last graph. Loading replaces all three; building replaces
//! the graph and reuses the index while the structure is unchanged. Read
//! accessors return copies and fall back to empty results before a
//! successful load or build.

use crate::graph::{
    required_shell_depth, GaussianRbf, Graph, GraphArrays, GraphAssembler, GraphConfig,
    GraphError, IndexOptions, NeighborSelector, PeriodicNeighborIndex,
};
use crate::structure::{ParserConfig, Structure, StructureFormatError, StructureParser};
use log::{debug, info, warn};
use rayon::prelude::*;

/// Lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing loaded yet
    Empty,
    /// A structure is loaded, no graph built for it
    Loaded,
    /// A graph has been built for the loaded structure
    GraphBuilt,
}

/// Structure → neighbor graph session
#[derive(Debug, Default)]
pub struct GraphSession {
    config: GraphConfig,
    parser: StructureParser,
    structure: Option<Structure>,
    index: Option<PeriodicNeighborIndex>,
    graph: Option<Graph>,
}

impl GraphSession {
    /// Create an empty session with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty session with the given configurations
    pub fn with_config(config: GraphConfig, parser_config: ParserConfig) -> Self {
        Self {
            config,
            parser: StructureParser::new(parser_config),
            ..Self::default()
        }
    }

    /// Graph configuration in use
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        match (&self.structure, &self.graph) {
            (None, _) => SessionState::Empty,
            (Some(_), None) => SessionState::Loaded,
            (Some(_), Some(_)) => SessionState::GraphBuilt,
        }
    }

    /// Parse `text` and make it the current structure
    ///
    /// On success the previous structure, index and graph are discarded. On
    /// failure the session is left exactly as it was.
    pub fn try_load_structure(&mut self, text: &str) -> Result<(), StructureFormatError> {
        let structure = self.parser.parse(text)?;
        info!("Loaded structure: {}", structure);
        self.structure = Some(structure);
        self.index = None;
        self.graph = None;
        Ok(())
    }

    /// Parse `text` and make it the current structure, reporting only success
    pub fn load_structure(&mut self, text: &str) -> bool {
        match self.try_load_structure(text) {
            Ok(()) => true,
            Err(e) => {
                warn!("Rejected structure: {}", e);
                false
            }
        }
    }

    /// Build the neighbor graph of the loaded structure
    ///
    /// Parameters are validated before any index work. A cap of zero or less
    /// yields an empty graph. On error the previous graph is kept.
    pub fn build_graph(&mut self, r_cutoff: f64, max_neighbors: i64) -> Result<(), GraphError> {
        let structure = self.structure.as_ref().ok_or(GraphError::NotLoaded)?;

        if !(r_cutoff.is_finite() && r_cutoff > 0.0) {
            return Err(GraphError::InvalidParameter(format!(
                "cutoff must be positive, got {}",
                r_cutoff
            )));
        }
        let depth = required_shell_depth(structure.lattice(), r_cutoff);
        if depth > self.config.max_shell_depth {
            return Err(GraphError::InvalidParameter(format!(
                "cutoff {:.4} Å needs replication depth {}, limit is {}",
                r_cutoff, depth, self.config.max_shell_depth
            )));
        }
        let rbf = if self.config.rbf.enabled {
            Some(GaussianRbf::from_config(&self.config.rbf, r_cutoff)?)
        } else {
            None
        };

        let half_height = 0.5 * structure.lattice().min_perpendicular_height();
        if r_cutoff > half_height {
            debug!(
                "Cutoff {:.3} Å exceeds the minimum-image radius {:.3} Å; using explicit images",
                r_cutoff, half_height
            );
        }

        let parallel = self.config.use_parallel(structure.num_atoms());
        let reusable = self
            .index
            .as_ref()
            .is_some_and(|index| index.shell_depth() >= depth);
        if !reusable {
            let options = IndexOptions {
                shell_depth: depth,
                image_policy: self.config.image_policy,
                parallel,
            };
            self.index = Some(PeriodicNeighborIndex::build(structure, options)?);
        }
        let index = self.index.as_ref().ok_or(GraphError::NotLoaded)?;

        let selector = NeighborSelector::from_signed(max_neighbors);
        let raw = index.query_all(r_cutoff)?;
        let selected: Vec<_> = if parallel {
            raw.into_par_iter().map(|n| selector.select(n)).collect()
        } else {
            raw.into_iter().map(|n| selector.select(n)).collect()
        };

        let mut assembler = GraphAssembler::new(r_cutoff, selector.max_neighbors());
        if let Some(rbf) = rbf {
            assembler = assembler.with_rbf(rbf);
        }
        let graph = assembler.assemble(structure, selected)?;

        info!(
            "Built graph: {} atoms, {} edges (cutoff {:.3} Å, max {} neighbors)",
            graph.num_atoms(),
            graph.num_edges(),
            r_cutoff,
            selector.max_neighbors()
        );
        self.graph = Some(graph);
        Ok(())
    }

    /// Loaded structure, if any
    pub fn structure(&self) -> Option<&Structure> {
        self.structure.as_ref()
    }

    /// Current graph, if any
    pub fn graph(&self) -> Option<&Graph> {
        self.graph.as_ref()
    }

    /// Cached periodic index, if any
    pub fn index(&self) -> Option<&PeriodicNeighborIndex> {
        self.index.as_ref()
    }

    /// Number of atoms, 0 before a load
    pub fn num_atoms(&self) -> usize {
        self.structure.as_ref().map_or(0, Structure::num_atoms)
    }

    /// Number of directed edges, 0 before a build
    pub fn num_edges(&self) -> usize {
        self.graph.as_ref().map_or(0, Graph::num_edges)
    }

    /// Cartesian positions, x, y, z interleaved per atom
    pub fn positions(&self) -> Vec<f64> {
        self.structure
            .as_ref()
            .map(|s| s.sites().iter().flat_map(|site| site.cartesian().to_array()).collect())
            .unwrap_or_default()
    }

    /// Species index of every atom
    pub fn atom_types(&self) -> Vec<usize> {
        self.structure
            .as_ref()
            .map(Structure::atom_types)
            .unwrap_or_default()
    }

    /// Species symbols in first-seen order
    pub fn elements(&self) -> Vec<String> {
        self.structure
            .as_ref()
            .map(|s| s.species().to_vec())
            .unwrap_or_default()
    }

    /// Atom count per species, aligned with [`GraphSession::elements`]
    pub fn element_counts(&self) -> Vec<usize> {
        self.structure
            .as_ref()
            .map(|s| s.element_counts().to_vec())
            .unwrap_or_default()
    }

    /// Lattice matrix, row-major
    pub fn lattice_vectors(&self) -> Vec<f64> {
        self.structure
            .as_ref()
            .map(|s| s.lattice().to_flat().to_vec())
            .unwrap_or_default()
    }

    /// Source atom of every edge
    pub fn edge_sources(&self) -> Vec<usize> {
        self.graph.as_ref().map(Graph::sources).unwrap_or_default()
    }

    /// Target atom of every edge
    pub fn edge_targets(&self) -> Vec<usize> {
        self.graph.as_ref().map(Graph::targets).unwrap_or_default()
    }

    /// Length of every edge in Å
    pub fn edge_distances(&self) -> Vec<f64> {
        self.graph.as_ref().map(Graph::distances).unwrap_or_default()
    }

    /// Source → target displacement per edge, x, y, z interleaved
    pub fn edge_displacements(&self) -> Vec<f64> {
        self.graph
            .as_ref()
            .map(Graph::displacements)
            .unwrap_or_default()
    }

    /// RBF features flattened row-major (edges × centers), empty when disabled
    pub fn edge_rbf_features(&self) -> Vec<f64> {
        self.graph
            .as_ref()
            .and_then(Graph::rbf_features)
            .map(|m| m.iter().copied().collect())
            .unwrap_or_default()
    }

    /// All graph arrays in one serializable value
    pub fn graph_arrays(&self) -> Option<GraphArrays> {
        self.graph.as_ref().map(Graph::to_arrays)
    }
}
