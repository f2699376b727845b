//! Spectral invariants checked end to end on synthetic graphs.

use spectra_core::eigen::{EigenSolver, SolverOptions};
use spectra_core::error::{GraphError, SpectraError};
use spectra_core::laplacian::LaplacianBuilder;
use spectra_core::symmetrize::ConnectivityMatrix;
use spectra_core::topology::DependencyGraph;
use spectra_runtime::community::{partition_by_sign, BisectionConfig, CommunityAssigner};
use spectra_runtime::ranking::DegreeRanker;
use spectra_runtime::topology_impl::PetDependencyGraph;

fn laplacian_of(graph: &PetDependencyGraph) -> LaplacianBuilder {
    let index = graph.node_index();
    LaplacianBuilder::new(ConnectivityMatrix::from_graph(graph, &index).unwrap())
}

/// `count` disjoint directed cycles of `size` nodes each.
fn cycles(count: usize, size: usize) -> PetDependencyGraph {
    let mut g = PetDependencyGraph::new();
    for c in 0..count {
        for i in 0..size {
            let from = format!("c{}n{}", c, i);
            let to = format!("c{}n{}", c, (i + 1) % size);
            g.add_edge(&from, &to);
        }
    }
    g
}

fn near_zero_eigenvalues(graph: &PetDependencyGraph, k: usize) -> usize {
    let laplacian = laplacian_of(graph).laplacian().unwrap();
    // L is only semi-definite; shift below zero so L - τI is definite
    let solver = EigenSolver::new(SolverOptions::default().with_target(-0.05));
    let pairs = solver.smallest(&laplacian, k).unwrap();
    pairs.values.iter().filter(|v| v.abs() < 1e-6).count()
}

#[test]
fn connected_graph_has_constant_null_vector() {
    let mut g = PetDependencyGraph::new();
    for i in 0..29 {
        g.add_edge(&format!("n{}", i), &format!("n{}", i + 1));
    }
    g.add_edge("n0", "n15");
    g.add_edge("n7", "n22");
    g.add_edge("n29", "n3");

    let solver = EigenSolver::new(SolverOptions::default().with_target(-0.05));
    let pairs = solver.smallest(&laplacian_of(&g).laplacian().unwrap(), 2).unwrap();
    assert!(pairs.values[0].abs() < 1e-8, "λ0 = {}", pairs.values[0]);
    assert!(pairs.values[1] > 1e-3, "λ1 = {}", pairs.values[1]);

    let expected = 1.0 / (30.0_f64).sqrt();
    for x in &pairs.vectors[0] {
        assert!((x - expected).abs() < 1e-5, "entry {} vs {}", x, expected);
    }
}

#[test]
fn zero_multiplicity_matches_component_count() {
    for components in [1, 2, 5] {
        let g = cycles(components, 12);
        assert_eq!(g.connected_components(), components);
        assert_eq!(
            near_zero_eigenvalues(&g, components + 1),
            components,
            "{} components",
            components
        );
    }
}

#[test]
fn fiedler_split_is_sign_invariant() {
    // Two 5-cycles joined by a single edge
    let mut g = cycles(2, 5);
    g.add_edge("c0n0", "c1n0");
    let builder = laplacian_of(&g);
    let affinity = builder.affinity(0.5).unwrap();
    let pairs = EigenSolver::default().smallest(&affinity, 2).unwrap();
    let scale = builder.inverse_sqrt_degree_values();
    let fiedler: Vec<f64> = pairs.vectors[1].iter().zip(&scale).map(|(v, s)| v * s).collect();
    let flipped: Vec<f64> = fiedler.iter().map(|x| -x).collect();

    let members: Vec<usize> = (0..fiedler.len()).collect();
    let (left, right) = partition_by_sign(&members, &fiedler);
    assert_eq!((left.clone(), right.clone()), partition_by_sign(&members, &flipped));

    // the cut falls on the bridge: each cycle lands on one side
    let mut sides = [left, right];
    sides.sort();
    assert_eq!(sides[0], vec![0, 1, 2, 3, 4]);
    assert_eq!(sides[1], vec![5, 6, 7, 8, 9]);
}

#[test]
fn two_triangles_two_communities() {
    let g = PetDependencyGraph::from_edges([
        ("a", "b"), ("b", "c"), ("c", "a"),
        ("x", "y"), ("y", "z"), ("z", "x"),
    ]);
    let index = g.node_index();
    let connectivity = ConnectivityMatrix::from_graph(&g, &index).unwrap();
    let assignment = CommunityAssigner::new(BisectionConfig {
        communities: 2,
        ..Default::default()
    })
    .assign(&connectivity)
    .unwrap();

    let labels = assignment.assignments(&index).unwrap();
    assert_eq!(labels["a"], labels["b"]);
    assert_eq!(labels["b"], labels["c"]);
    assert_eq!(labels["x"], labels["y"]);
    assert_eq!(labels["y"], labels["z"]);
    assert_ne!(labels["a"], labels["x"]);
    assert!((assignment.modularity - 0.5).abs() < 1e-12);
}

#[test]
fn removal_updates_degrees_and_invalidates_indices() {
    let mut g = PetDependencyGraph::from_edges([
        ("app", "serde"),
        ("app", "log"),
        ("cli", "serde"),
        ("web", "app"),
    ]);
    let before = g.node_index();
    assert_eq!(g.in_degree("serde").unwrap(), 2);
    assert_eq!(g.in_degree("log").unwrap(), 1);

    assert_eq!(g.remove_node("app").unwrap(), 3);
    assert_eq!(g.in_degree("serde").unwrap(), 1);
    assert_eq!(g.in_degree("log").unwrap(), 0);

    let ranked = DegreeRanker::new(&g).rank_by_in_degree();
    assert!(ranked.iter().all(|r| r.name != "app"));
    assert!(!g.node_index().names().iter().any(|n| n == "app"));

    let err = ConnectivityMatrix::from_graph(&g, &before).unwrap_err();
    assert!(matches!(err, SpectraError::Graph(GraphError::StaleIndex { .. })));
}

#[test]
fn top_n_breaks_ties_by_insertion() {
    let mut g = PetDependencyGraph::new();
    for name in ["a", "b", "c", "d"] {
        g.add_node(name);
    }
    for i in 0..5 {
        let source = format!("s{}", i);
        g.add_edge(&source, "a");
        g.add_edge(&source, "b");
        if i < 3 {
            g.add_edge(&source, "c");
        }
        if i < 1 {
            g.add_edge(&source, "d");
        }
    }
    let ranker = DegreeRanker::new(&g);
    assert_eq!(ranker.in_degree("a").unwrap(), 5);
    assert_eq!(ranker.in_degree("d").unwrap(), 1);
    assert_eq!(ranker.top_n(3), vec!["a", "b", "c"]);
}
