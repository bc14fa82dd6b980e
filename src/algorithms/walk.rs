//! Transitive reduction by greedy trial edge removal.
//!
//! Every edge is removed once, in row order; if the removal changes any
//! vertex's reachable set the edge was load-bearing and is reinserted at the
//! end of its row, otherwise it stays gone. Because edges are tested in a
//! single pass with no backtracking, the surviving edge set depends on the
//! insertion order; on graphs with several minimum reductions it is not
//! guaranteed to match the permutation method's result, only to be
//! reachability-equivalent to the input.

use ahash::AHashSet;

use crate::graph::{GraphError, LabelGraph, VertexId};

impl LabelGraph {
    /// Transitive reduction by the walk method.
    ///
    /// Works on a [`clone_structure`](Self::clone_structure) working copy
    /// and leaves `self` untouched. For every vertex the row length is
    /// snapshotted up front and the row head is trial-removed that many
    /// times (a kept edge is reinserted at the tail, so the row rotates and
    /// every original entry is tested exactly once). The test recomputes the
    /// working closure and compares the per-vertex reachable *sets* against
    /// the input's, not just their sizes.
    ///
    /// Assumes directed input is acyclic; see [`crate::algorithms::cycle`].
    /// The returned graph has empty closure storage.
    pub fn walk_reduction(&self) -> Result<LabelGraph, GraphError> {
        let mut reference = self.clone_structure();
        reference.compute_closures()?;
        let reference_sets = closure_sets(&reference);

        let mut working = self.clone_structure();
        for i in 0..self.n_vertices() {
            let vertex = VertexId(i);
            let trials = working.neighbors(vertex).len();
            for _ in 0..trials {
                let Some(removed) = working.remove_edge(vertex, 0) else {
                    break;
                };
                let mut mirror = None;
                if !working.is_directed() {
                    if let Some(position) = working.neighbor_position(removed, vertex) {
                        working.remove_edge(removed, position);
                        mirror = Some(removed);
                    }
                }

                working.compute_closures()?;
                if closure_sets(&working) != reference_sets {
                    // load-bearing: put it back at the end of the row
                    working.push_neighbor(vertex, removed);
                    if let Some(neighbor) = mirror {
                        working.push_neighbor(neighbor, vertex);
                    }
                }
            }
        }

        working.clear_closures();
        Ok(working)
    }
}

/// Per-vertex reachable sets, in vertex order.
fn closure_sets(graph: &LabelGraph) -> Vec<AHashSet<VertexId>> {
    graph
        .vertex_ids()
        .map(|v| graph.closure(v).iter().copied().collect())
        .collect()
}

#[cfg(test)]
mod tests {
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

    fn edge_labels(graph: &LabelGraph) -> Vec<(String, String)> {
        let mut edges = Vec::new();
        for v in graph.vertex_ids() {
            for w in graph.neighbor_labels(v) {
                edges.push((graph.label(v).unwrap().to_owned(), w.to_owned()));
            }
        }
        edges
    }

    #[test]
    fn shortcut_edge_is_removed() {
        let g = build(
            true,
            &["a", "b", "c"],
            &[("a", "b"), ("b", "c"), ("a", "c")],
        );
        let reduced = g.walk_reduction().unwrap();

        assert_eq!(
            edge_labels(&reduced),
            vec![
                ("a".to_owned(), "b".to_owned()),
                ("b".to_owned(), "c".to_owned())
            ]
        );
    }

    #[test]
    fn load_bearing_edges_survive() {
        let g = build(true, &["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        let reduced = g.walk_reduction().unwrap();
        assert_eq!(reduced.n_edges(), 2);
    }

    #[test]
    fn undirected_triangle_loses_exactly_one_edge() {
        let g = build(
            false,
            &["a", "b", "c"],
            &[("a", "b"), ("b", "c"), ("a", "c")],
        );
        let mut reduced = g.walk_reduction().unwrap();
        assert_eq!(reduced.n_edges(), 2);

        // still one connected component
        reduced.compute_closures().unwrap();
        for v in reduced.vertex_ids() {
            assert_eq!(reduced.closure(v).len(), 2);
        }
    }

    #[test]
    fn input_graph_is_left_untouched() {
        let g = build(
            true,
            &["a", "b", "c"],
            &[("a", "b"), ("b", "c"), ("a", "c")],
        );
        let _ = g.walk_reduction().unwrap();
        assert_eq!(g.n_edges(), 3);
        assert_eq!(g.neighbors(VertexId(0)), &[VertexId(1), VertexId(2)]);
        // the reduction computes closures only on its own copies
        assert!(g.closure(VertexId(0)).is_empty());
    }

    #[test]
    fn result_has_empty_closures() {
        let g = build(true, &["a", "b"], &[("a", "b")]);
        let reduced = g.walk_reduction().unwrap();
        assert!(reduced.closure(VertexId(0)).is_empty());
    }
}
