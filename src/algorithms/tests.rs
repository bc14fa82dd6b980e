//! Cross-algorithm tests: the two reduction methods against the shared
//! closure computation, on fixed scenarios, seeded random graphs and
//! proptest-generated DAGs.

use std::collections::VecDeque;

use ahash::AHashSet;
use proptest::prelude::*;
use rand::{rngs::SmallRng, Rng, SeedableRng};
use similar_asserts::assert_eq;

use crate::graph::{LabelGraph, VertexId};

fn build(directed: bool, vertices: &[&str], edges: &[(&str, &str)]) -> LabelGraph {
    let mut g = LabelGraph::new(vertices.len(), vertices.len(), directed);
    for v in vertices {
        g.add_vertex(v).unwrap();
    }
    for (a, b) in edges {
        g.add_edge(a, b).unwrap();
    }
    g
}

/// Per-vertex reachable sets, computed on a scratch copy so the input graph
/// (and its closures, if any) stay untouched.
fn reachable_sets(graph: &LabelGraph) -> Vec<AHashSet<VertexId>> {
    let mut scratch = graph.clone_structure();
    scratch.compute_closures().unwrap();
    scratch
        .vertex_ids()
        .map(|v| scratch.closure(v).iter().copied().collect())
        .collect()
}

/// Reachability by plain breadth-first search, independent of the
/// stack-driven closure under test.
fn bfs_reachable(graph: &LabelGraph, source: VertexId) -> AHashSet<VertexId> {
    let mut seen = AHashSet::new();
    let mut queue = VecDeque::from([source]);
    while let Some(v) = queue.pop_front() {
        for &w in graph.neighbors(v) {
            if seen.insert(w) {
                queue.push_back(w);
            }
        }
    }
    seen
}

/// A directed graph over `n` vertices whose edges all point from earlier to
/// later vertices, so it is acyclic by construction. `pick` decides, pair
/// by pair
/// in lexicographic order, whether the edge exists.
fn dag_from_choices(n: usize, mut pick: impl FnMut() -> bool) -> LabelGraph {
    let labels: Vec<String> = (0..n).map(|i| format!("v{i}")).collect();
    let mut g = LabelGraph::new(n, n, true);
    for label in &labels {
        g.add_vertex(label).unwrap();
    }
    for i in 0..n {
        for j in (i + 1)..n {
            if pick() {
                g.add_edge(&labels[i], &labels[j]).unwrap();
            }
        }
    }
    g
}

#[test]
fn scenario_pipeline_snapshot() {
    let mut g = build(
        true,
        &["a", "b", "c"],
        &[("a", "b"), ("b", "c"), ("a", "c")],
    );
    g.compute_closures().unwrap();
    insta::assert_snapshot!(g.closure_display(), @r"
    a => b, c
    b => c
    c => ∅
    ");

    let walked = g.walk_reduction().unwrap();
    insta::assert_snapshot!(walked.to_string(), @r"
    a -> b
    b -> c
    c -> ∅
    ");

    let permuted = g.permutation_reduction().unwrap();
    insta::assert_snapshot!(permuted.to_string(), @r"
    a -> b
    b -> c
    c -> ∅
    ");
}

#[test]
fn both_methods_are_reachability_equivalent() {
    // the methods may disagree on which edges survive, so only the
    // reachability relation is compared
    let graphs = [
        build(
            true,
            &["a", "b", "c"],
            &[("a", "b"), ("b", "c"), ("a", "c")],
        ),
        build(
            false,
            &["a", "b", "c"],
            &[("a", "b"), ("b", "c"), ("a", "c")],
        ),
        build(
            true,
            &["a", "b", "c", "d"],
            &[("a", "b"), ("b", "c"), ("c", "d"), ("a", "c"), ("a", "d")],
        ),
    ];

    for g in &graphs {
        let original = reachable_sets(g);
        let walked = g.walk_reduction().unwrap();
        let permuted = g.permutation_reduction().unwrap();
        assert_eq!(reachable_sets(&walked), original);
        assert_eq!(reachable_sets(&permuted), original);
    }
}

#[test]
fn walk_restores_iff_reachability_changes() {
    // a -> b is load-bearing (the only way to reach b), a -> c is not:
    // exactly the former is restored after its trial removal
    let g = build(
        true,
        &["a", "b", "c"],
        &[("a", "b"), ("b", "c"), ("a", "c")],
    );
    let reduced = g.walk_reduction().unwrap();
    let a = reduced.find_vertex("a").unwrap();
    let b = reduced.find_vertex("b").unwrap();
    let c = reduced.find_vertex("c").unwrap();
    assert!(reduced.has_edge(a, b));
    assert!(reduced.has_edge(b, c));
    assert!(!reduced.has_edge(a, c));
}

#[test]
fn already_minimal_graph_survives_the_walk_intact() {
    // every edge is the only route somewhere, so all four must be restored
    let g = build(
        true,
        &["a", "b", "c", "d"],
        &[("a", "b"), ("c", "b"), ("d", "a"), ("d", "c")],
    );
    let reduced = g.walk_reduction().unwrap();
    assert_eq!(reduced.n_edges(), 4);
    assert_eq!(reachable_sets(&reduced), reachable_sets(&g));
}

#[test]
fn seeded_random_dag_walk_reduction() {
    // deterministic fixture: dense-ish DAG on 8 vertices
    let mut rng = SmallRng::seed_from_u64(0x5eed);
    let g = dag_from_choices(8, || rng.gen_bool(0.4));
    let original = reachable_sets(&g);

    let reduced = g.walk_reduction().unwrap();
    assert!(reduced.n_edges() <= g.n_edges());
    assert_eq!(reachable_sets(&reduced), original);
}

proptest! {
    #[test]
    fn closure_matches_bfs_reachability(choices in proptest::collection::vec(any::<bool>(), 15)) {
        let mut picks = choices.into_iter();
        let g = dag_from_choices(6, || picks.next().unwrap_or(false));
        let closures = reachable_sets(&g);
        for v in g.vertex_ids() {
            prop_assert_eq!(&closures[v.0], &bfs_reachable(&g, v));
        }
    }

    #[test]
    fn walk_reduction_preserves_reachability(choices in proptest::collection::vec(any::<bool>(), 15)) {
        let mut picks = choices.into_iter();
        let g = dag_from_choices(6, || picks.next().unwrap_or(false));
        let original = reachable_sets(&g);

        let reduced = g.walk_reduction().unwrap();
        prop_assert!(reduced.n_edges() <= g.n_edges());
        prop_assert_eq!(reachable_sets(&reduced), original);
    }
}
