/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

use approx::assert_relative_eq;
use crystal_graph::graph::{GraphConfig, ImagePolicy, RbfConfig};
use crystal_graph::structure::ParserConfig;
use crystal_graph::{GraphError, GraphSession, SessionState};

const SIMPLE_CUBIC: &str = "simple cubic
1.0
5.0 0.0 0.0
0.0 5.0 0.0
0.0 0.0 5.0
Po
1
Direct
0.0 0.0 0.0
";

const ROCK_SALT: &str = "NaCl rock salt
1.0
5.64 0.00 0.00
0.00 5.64 0.00
0.00 0.00 5.64
Na Cl
4 4
Direct
0.0 0.0 0.0
0.0 0.5 0.5
0.5 0.0 0.5
0.5 0.5 0.0
0.5 0.0 0.0
0.0 0.5 0.0
0.0 0.0 0.5
0.5 0.5 0.5
";

#[test]
fn test_read_accessors_before_load() {
    let session = GraphSession::new();
    assert_eq!(session.state(), SessionState::Empty);
    assert_eq!(session.num_atoms(), 0);
    assert_eq!(session.num_edges(), 0);
    assert!(session.positions().is_empty());
    assert!(session.atom_types().is_empty());
    assert!(session.elements().is_empty());
    assert!(session.lattice_vectors().is_empty());
    assert!(session.edge_sources().is_empty());
    assert!(session.edge_rbf_features().is_empty());
    assert!(session.graph_arrays().is_none());
}

#[test]
fn test_structure_accessors() {
    let mut session = GraphSession::new();
    assert!(session.load_structure(ROCK_SALT));

    assert_eq!(session.num_atoms(), 8);
    assert_eq!(session.elements(), vec!["Na".to_string(), "Cl".to_string()]);
    assert_eq!(session.element_counts(), vec![4, 4]);
    assert_eq!(session.atom_types(), vec![0, 0, 0, 0, 1, 1, 1, 1]);

    let lattice = session.lattice_vectors();
    assert_eq!(lattice.len(), 9);
    assert_relative_eq!(lattice[0], 5.64, epsilon = 1e-12);
    assert_relative_eq!(lattice[4], 5.64, epsilon = 1e-12);
    assert_relative_eq!(lattice[1], 0.0, epsilon = 1e-12);

    let positions = session.positions();
    assert_eq!(positions.len(), 24);
    assert_relative_eq!(positions[21], 2.82, epsilon = 1e-12);

    // Loaded but not built: edge arrays are empty
    assert_eq!(session.state(), SessionState::Loaded);
    assert!(session.edge_targets().is_empty());
}

#[test]
fn test_edge_accessors_are_aligned() {
    let mut session = GraphSession::new();
    assert!(session.load_structure(ROCK_SALT));
    session.build_graph(4.5, 10).unwrap();

    let e = session.num_edges();
    assert!(e > 0);
    assert_eq!(session.edge_sources().len(), e);
    assert_eq!(session.edge_targets().len(), e);
    assert_eq!(session.edge_distances().len(), e);
    assert_eq!(session.edge_displacements().len(), 3 * e);

    for (k, d) in session.edge_distances().iter().enumerate() {
        let disp = &session.edge_displacements()[3 * k..3 * k + 3];
        let length = (disp[0] * disp[0] + disp[1] * disp[1] + disp[2] * disp[2]).sqrt();
        assert_relative_eq!(length, *d, epsilon = 1e-12);
        assert!(*d <= 4.5);
    }
}

#[test]
fn test_single_atom_needs_wider_shell() {
    let mut session = GraphSession::new();
    assert!(session.load_structure(SIMPLE_CUBIC));

    session.build_graph(6.0, 100).unwrap();
    assert_eq!(session.num_edges(), 6);

    session.build_graph(9.0, 100).unwrap();
    assert_eq!(session.num_edges(), 26);
    assert_eq!(session.index().unwrap().shell_depth(), 2);
    assert!(session.edge_distances().iter().all(|&d| d > 0.0));
    assert!(session.edge_targets().iter().all(|&t| t == 0));
}

#[test]
fn test_cutoff_beyond_shell_limit() {
    let config = GraphConfig {
        max_shell_depth: 1,
        ..GraphConfig::default()
    };
    let mut session = GraphSession::with_config(config, ParserConfig::default());
    assert!(session.load_structure(SIMPLE_CUBIC));

    assert!(session.build_graph(5.0, 12).is_ok());
    assert!(matches!(
        session.build_graph(5.5, 12),
        Err(GraphError::InvalidParameter(_))
    ));
    assert_eq!(session.num_edges(), 6);
}

#[test]
fn test_cutoff_below_nearest_neighbor() {
    let mut session = GraphSession::new();
    assert!(session.load_structure(ROCK_SALT));
    assert!(session.build_graph(2.0, 12).is_ok());
    assert_eq!(session.state(), SessionState::GraphBuilt);
    assert_eq!(session.num_edges(), 0);
}

#[test]
fn test_non_positive_cap_builds_empty_graph() {
    let mut session = GraphSession::new();
    assert!(session.load_structure(ROCK_SALT));

    for cap in [0, -1, -100] {
        assert!(session.build_graph(4.0, cap).is_ok());
        assert_eq!(session.num_edges(), 0);
        assert_eq!(session.state(), SessionState::GraphBuilt);
    }
}

#[test]
fn test_malformed_load_leaves_empty_session() {
    let mut session = GraphSession::new();
    let missing_row = "bad\n1.0\n5.0 0.0 0.0\n0.0 5.0 0.0\nPo\n1\nDirect\n0 0 0\n";

    assert!(!session.load_structure(missing_row));
    assert_eq!(session.num_atoms(), 0);
    assert_eq!(session.state(), SessionState::Empty);
    assert!(session.try_load_structure(missing_row).is_err());
}

#[test]
fn test_builds_are_deterministic() {
    let build = || {
        let mut session = GraphSession::new();
        assert!(session.load_structure(ROCK_SALT));
        session.build_graph(6.0, 12).unwrap();
        serde_json::to_string(&session.graph_arrays().unwrap()).unwrap()
    };
    assert_eq!(build(), build());
}

#[test]
fn test_reload_is_idempotent() {
    let mut session = GraphSession::new();
    assert!(session.load_structure(ROCK_SALT));
    session.build_graph(5.0, 12).unwrap();
    let first = session.graph_arrays().unwrap();

    assert!(session.load_structure(ROCK_SALT));
    session.build_graph(5.0, 12).unwrap();
    assert_eq!(session.graph_arrays().unwrap(), first);
}

#[test]
fn test_parallel_and_serial_sessions_agree() {
    let serial = GraphConfig {
        parallel: false,
        ..GraphConfig::default()
    };
    let parallel = GraphConfig {
        parallel: true,
        parallel_threshold: 1,
        ..GraphConfig::default()
    };

    let mut arrays = Vec::new();
    for config in [serial, parallel] {
        let mut session = GraphSession::with_config(config, ParserConfig::default());
        assert!(session.load_structure(ROCK_SALT));
        session.build_graph(6.0, 20).unwrap();
        arrays.push(session.graph_arrays().unwrap());
    }
    assert_eq!(arrays[0], arrays[1]);
}

#[test]
fn test_rbf_features_from_config() {
    let config = GraphConfig {
        rbf: RbfConfig {
            enabled: true,
            num_centers: 8,
            ..RbfConfig::default()
        },
        ..GraphConfig::default()
    };
    let mut session = GraphSession::with_config(config, ParserConfig::default());
    assert!(session.load_structure(ROCK_SALT));
    session.build_graph(3.0, 12).unwrap();

    let features = session.edge_rbf_features();
    assert_eq!(features.len(), session.num_edges() * 8);
    assert!(features.iter().all(|&v| v > 0.0 && v <= 1.0));
}

#[test]
fn test_closest_image_config() {
    let config = GraphConfig::from_json(r#"{"image_policy": "closest_image"}"#).unwrap();
    assert_eq!(config.image_policy, ImagePolicy::ClosestImage);

    let mut session = GraphSession::with_config(config, ParserConfig::default());
    assert!(session.load_structure(SIMPLE_CUBIC));
    session.build_graph(9.0, 100).unwrap();
    assert_eq!(session.num_edges(), 1);
}

#[test]
fn test_untrusted_counts_are_rejected_not_fatal() {
    let mut session = GraphSession::new();
    assert!(session.load_structure(SIMPLE_CUBIC));

    let overflowing_sum = "bad\n1.0\n5 0 0\n0 5 0\n0 0 5\nH O\n18446744073709551615 1\nDirect\n0 0 0\n";
    let huge_count = "bad\n1.0\n5 0 0\n0 5 0\n0 0 5\nH\n9223372036854775807\nDirect\n0 0 0\n";
    assert!(!session.load_structure(overflowing_sum));
    assert!(!session.load_structure(huge_count));

    // The previously loaded structure is untouched
    assert_eq!(session.num_atoms(), 1);
    assert_eq!(session.elements(), vec!["Po".to_string()]);
}
