/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

use approx::assert_relative_eq;
use crystal_graph::graph::{
    required_shell_depth, CrystalGraph, GaussianRbf, GraphAssembler, ImagePolicy, IndexOptions,
    NeighborSelector, PeriodicNeighborIndex,
};
use crystal_graph::io::AtomEmbeddings;
use crystal_graph::structure::parse_structure;
use crystal_graph::topology::{
    load_betti_features, save_betti_features, structure_betti_features, TopologyError,
    BETTI_FEATURE_DIM,
};
use rstest::rstest;
use tempfile::TempDir;

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

const SHIFTED_ROCK_SALT: &str = "NaCl rock salt, shifted origin
1.0
5.64 0.00 0.00
0.00 5.64 0.00
0.00 0.00 5.64
Na Cl
4 4
Direct
0.1 0.2 0.3
0.1 0.7 0.8
0.6 0.2 0.8
0.6 0.7 0.3
0.6 0.2 0.3
0.1 0.7 0.3
0.1 0.2 0.8
0.6 0.7 0.8
";

const TRICLINIC: &str = "triclinic test cell
1.0
4.2 0.0 0.0
0.9 3.8 0.0
0.4 -0.6 4.5
Si O
1 2
Direct
0.10 0.20 0.30
0.55 0.45 0.80
0.90 0.70 0.15
";

#[test]
fn test_rock_salt_star_environment() {
    // Within 3 Å every ion sees its six counter-ions and none of them see
    // each other, so each cloud is a six-spoke star
    let structure = parse_structure(ROCK_SALT).unwrap();
    let features = structure_betti_features(&structure, 3.0, false).unwrap();
    assert_eq!(features.dim(), (8, BETTI_FEATURE_DIM));

    for row in features.rows() {
        assert_relative_eq!(row[0], 2.82, epsilon = 1e-9);
        assert_relative_eq!(row[1], 0.0, epsilon = 1e-9);
        assert_relative_eq!(row[2], 2.82, epsilon = 1e-9);
        assert_relative_eq!(row[3], 2.82, epsilon = 1e-9);
        // Six deaths weighted by 1/4 for four ions of each species
        assert_relative_eq!(row[4], 6.0 * 2.82 / 4.0, epsilon = 1e-9);
        assert!(row.iter().skip(5).all(|&v| v == 0.0));
    }
}

#[rstest]
#[case::serial(false)]
#[case::parallel(true)]
fn test_features_ignore_origin(#[case] parallel: bool) {
    let reference = parse_structure(ROCK_SALT).unwrap();
    let shifted = parse_structure(SHIFTED_ROCK_SALT).unwrap();
    let a = structure_betti_features(&reference, 4.5, parallel).unwrap();
    let b = structure_betti_features(&shifted, 4.5, parallel).unwrap();

    assert_eq!(a.dim(), b.dim());
    for (x, y) in a.iter().zip(b.iter()) {
        assert_relative_eq!(x, y, epsilon = 1e-9);
    }
    // First and second shell ions form squares that fill at 3.99 Å
    assert!(a.row(0).iter().skip(5).any(|&v| v > 0.0));
}

#[test]
fn test_serial_and_parallel_agree() {
    let structure = parse_structure(TRICLINIC).unwrap();
    let serial = structure_betti_features(&structure, 5.0, false).unwrap();
    let parallel = structure_betti_features(&structure, 5.0, true).unwrap();
    assert_eq!(serial, parallel);
    assert!(serial.iter().all(|v| v.is_finite()));
}

#[rstest]
#[case::zero(0.0)]
#[case::negative(-1.0)]
#[case::nan(f64::NAN)]
fn test_rejects_bad_cutoff(#[case] cutoff: f64) {
    let structure = parse_structure(ROCK_SALT).unwrap();
    assert!(matches!(
        structure_betti_features(&structure, cutoff, false),
        Err(TopologyError::InvalidParameter(_))
    ));
}

#[test]
fn test_saved_features_extend_node_features() {
    let structure = parse_structure(ROCK_SALT).unwrap();
    let features = structure_betti_features(&structure, 3.0, false).unwrap();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("betti.bin");
    save_betti_features(&path, &features).unwrap();
    let loaded = load_betti_features(&path).unwrap();
    assert_eq!(loaded, features);

    let index = PeriodicNeighborIndex::build(
        &structure,
        IndexOptions {
            shell_depth: required_shell_depth(structure.lattice(), 3.0),
            image_policy: ImagePolicy::AllImages,
            parallel: false,
        },
    )
    .unwrap();
    let selector = NeighborSelector::new(12);
    let neighbors = index
        .query_all(3.0)
        .unwrap()
        .into_iter()
        .map(|n| selector.select(n))
        .collect::<Vec<_>>();
    let graph = GraphAssembler::new(3.0, 12)
        .assemble(&structure, neighbors)
        .unwrap();

    let embeddings = AtomEmbeddings::from_json(r#"{"11": [1.0, 0.0], "17": [0.0, 1.0]}"#).unwrap();
    let rbf = GaussianRbf::new(3.0, 4, 0.5).unwrap();
    let mut crystal = CrystalGraph::new(&structure, &graph, &embeddings, &rbf).unwrap();
    crystal.add_topo_features(&loaded).unwrap();
    assert_eq!(crystal.node_features().dim(), (8, 2 + BETTI_FEATURE_DIM));
    assert_eq!(crystal.node_features()[[4, 1]], 1.0);
    assert_relative_eq!(crystal.node_features()[[4, 2]], 2.82, epsilon = 1e-9);

    let too_short = loaded.slice(ndarray::s![..4, ..]).to_owned();
    assert!(crystal.add_topo_features(&too_short).is_err());
}
