/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Feature matrices for graph-based learning
//!
//! Combines a neighbor [`Graph`] with per-element embeddings into the
//! node-feature / edge-index / edge-attribute triple a message-passing
//! network consumes.

use super::assembler::Graph;
use super::errors::{GraphError, Result};
use super::features::GaussianRbf;
use crate::io::AtomEmbeddings;
use crate::structure::Structure;
use ndarray::{concatenate, Array2, Axis};

/// Learning-ready representation of one crystal
#[derive(Debug, Clone, PartialEq)]
pub struct CrystalGraph {
    node_features: Array2<f64>,
    edge_index: Array2<usize>,
    edge_attr: Array2<f64>,
    target: f64,
}

impl CrystalGraph {
    /// Build node features from `embeddings` and edge attributes from `rbf`
    ///
    /// Every species must resolve to an atomic number present in the table.
    pub fn new(
        structure: &Structure,
        graph: &Graph,
        embeddings: &AtomEmbeddings,
        rbf: &GaussianRbf,
    ) -> Result<Self> {
        let numbers = structure.atomic_numbers();
        let mut species_rows = Vec::with_capacity(numbers.len());
        for (symbol, z) in structure.species().iter().zip(&numbers) {
            let row = z
                .and_then(|z| embeddings.get(z))
                .ok_or_else(|| GraphError::MissingEmbedding(symbol.clone()))?;
            species_rows.push(row);
        }

        let mut node_features = Array2::<f64>::zeros((structure.num_atoms(), embeddings.dims()));
        for (mut row, site) in node_features.rows_mut().into_iter().zip(structure.sites()) {
            for (value, &e) in row.iter_mut().zip(species_rows[site.species()]) {
                *value = e;
            }
        }

        let mut edge_index = Array2::<usize>::zeros((2, graph.num_edges()));
        for (k, edge) in graph.edges().iter().enumerate() {
            edge_index[[0, k]] = edge.source;
            edge_index[[1, k]] = edge.target;
        }

        // Always expand with the caller's basis; the graph may carry a different one
        let edge_attr = rbf.expand_all(&graph.distances());

        Ok(Self {
            node_features,
            edge_index,
            edge_attr,
            target: 0.0,
        })
    }

    /// Node feature matrix (atoms × embedding dimension)
    pub fn node_features(&self) -> &Array2<f64> {
        &self.node_features
    }

    /// Edge index matrix (2 × edges): row 0 sources, row 1 targets
    pub fn edge_index(&self) -> &Array2<usize> {
        &self.edge_index
    }

    /// Edge attribute matrix (edges × RBF centers)
    pub fn edge_attr(&self) -> &Array2<f64> {
        &self.edge_attr
    }

    /// Regression target
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Set the regression target
    pub fn set_target(&mut self, y: f64) {
        self.target = y;
    }

    /// Append per-atom topological descriptors as extra node-feature columns
    ///
    /// `topo` must have one row per node, in atom order.
    pub fn add_topo_features(&mut self, topo: &Array2<f64>) -> Result<()> {
        if topo.nrows() != self.num_nodes() {
            return Err(GraphError::InvalidParameter(format!(
                "{} rows of topological features for {} nodes",
                topo.nrows(),
                self.num_nodes()
            )));
        }
        self.node_features = concatenate(Axis(1), &[self.node_features.view(), topo.view()])
            .map_err(|e| GraphError::InvalidParameter(e.to_string()))?;
        Ok(())
    }

    /// Number of nodes
    pub fn num_nodes(&self) -> usize {
        self.node_features.nrows()
    }

    /// Number of directed edges
    pub fn num_edges(&self) -> usize {
        self.edge_index.ncols()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::graph::assembler::GraphAssembler;
    use crate::graph::index::RawNeighbor;
    use crate::structure::{Lattice, Vector3D};

    fn water_like() -> Structure {
        Structure::new(
            "OH",
            Lattice::cubic(6.0),
            &["O".to_string(), "H".to_string()],
            &[0, 1],
            &[Vector3D::origin(), Vector3D::new(0.16, 0.0, 0.0)],
        )
        .unwrap()
    }

    fn one_edge_graph(structure: &Structure) -> Graph {
        let neighbor = RawNeighbor {
            index: 1,
            distance: 0.96,
            displacement: Vector3D::new(0.96, 0.0, 0.0),
            shift: [0, 0, 0],
        };
        GraphAssembler::new(2.0, 4)
            .assemble(structure, vec![vec![neighbor], vec![]])
            .unwrap()
    }

    #[test]
    fn test_feature_matrices() {
        let structure = water_like();
        let graph = one_edge_graph(&structure);
        let embeddings =
            AtomEmbeddings::from_json(r#"{"1": [0.0, 1.0, 0.0], "8": [1.0, 0.0, 0.5]}"#).unwrap();
        let rbf = GaussianRbf::new(2.0, 4, 0.5).unwrap();

        let mut crystal = CrystalGraph::new(&structure, &graph, &embeddings, &rbf).unwrap();
        assert_eq!(crystal.num_nodes(), 2);
        assert_eq!(crystal.num_edges(), 1);
        assert_eq!(crystal.node_features().row(0).to_vec(), vec![1.0, 0.0, 0.5]);
        assert_eq!(crystal.node_features().row(1).to_vec(), vec![0.0, 1.0, 0.0]);
        assert_eq!(crystal.edge_index()[[0, 0]], 0);
        assert_eq!(crystal.edge_index()[[1, 0]], 1);
        assert_eq!(crystal.edge_attr().dim(), (1, 4));

        crystal.set_target(1.25);
        assert_eq!(crystal.target(), 1.25);
    }

    #[test]
    fn test_missing_embedding() {
        let structure = water_like();
        let graph = one_edge_graph(&structure);
        let embeddings = AtomEmbeddings::from_json(r#"{"8": [1.0]}"#).unwrap();
        let rbf = GaussianRbf::new(2.0, 4, 0.5).unwrap();

        assert_eq!(
            CrystalGraph::new(&structure, &graph, &embeddings, &rbf),
            Err(GraphError::MissingEmbedding("H".to_string()))
        );
    }

    #[test]
    fn test_edge_attr_uses_given_basis() {
        let structure = water_like();
        let neighbor = RawNeighbor {
            index: 1,
            distance: 0.96,
            displacement: Vector3D::new(0.96, 0.0, 0.0),
            shift: [0, 0, 0],
        };
        let graph = GraphAssembler::new(3.0, 4)
            .with_rbf(GaussianRbf::new(3.0, 4, 0.5).unwrap())
            .assemble(&structure, vec![vec![neighbor], vec![]])
            .unwrap();
        let embeddings = AtomEmbeddings::from_json(r#"{"1": [0.0], "8": [1.0]}"#).unwrap();

        let wide = GaussianRbf::new(3.0, 4, 2.0).unwrap();
        let crystal = CrystalGraph::new(&structure, &graph, &embeddings, &wide).unwrap();
        let expected = wide.expand(0.96);
        for (value, e) in crystal.edge_attr().row(0).iter().zip(&expected) {
            assert_relative_eq!(*value, *e, epsilon = 1e-12);
        }
        assert!((crystal.edge_attr()[[0, 0]] - graph.rbf_features().unwrap()[[0, 0]]).abs() > 0.1);
    }

    #[test]
    fn test_add_topo_features() {
        let structure = water_like();
        let graph = one_edge_graph(&structure);
        let embeddings =
            AtomEmbeddings::from_json(r#"{"1": [0.0, 1.0], "8": [1.0, 0.0]}"#).unwrap();
        let rbf = GaussianRbf::new(2.0, 4, 0.5).unwrap();
        let mut crystal = CrystalGraph::new(&structure, &graph, &embeddings, &rbf).unwrap();

        let topo = Array2::from_shape_vec((2, 3), vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6]).unwrap();
        crystal.add_topo_features(&topo).unwrap();
        assert_eq!(crystal.node_features().dim(), (2, 5));
        assert_eq!(crystal.node_features().row(1).to_vec(), vec![0.0, 1.0, 0.4, 0.5, 0.6]);

        let wrong = Array2::<f64>::zeros((3, 1));
        assert!(matches!(
            crystal.add_topo_features(&wrong),
            Err(GraphError::InvalidParameter(_))
        ));
        assert_eq!(crystal.node_features().ncols(), 5);
    }
}
