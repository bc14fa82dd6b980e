//! Topological ordering and the acyclicity precondition gate.
//!
//! Both reduction algorithms assume directed input is acyclic; their
//! behaviour on directed cycles is unspecified. The check stays *outside*
//! the reductions: callers gate on
//! [`is_cyclic`](crate::graph::LabelGraph::is_cyclic) (the CLI harness does)
//! before invoking either one. Undirected graphs are exempt: an acyclic
//! undirected graph is a forest with no redundant edges, so the interesting
//! undirected inputs are exactly the cyclic ones.

use std::collections::VecDeque;

use bitvec::bitvec;
use thiserror::Error;

use crate::graph::{LabelGraph, VertexId};

/// Failure of the topological sort, i.e. proof of a cycle.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TopoError {
    #[error("not a DAG: ordered {ordered} of {total} vertices; vertices left with in-degree > 0: {remaining:?}")]
    NotDag {
        ordered: usize,
        total: usize,
        remaining: Vec<(VertexId, usize)>,
    },
}

impl LabelGraph {
    /// Topological order of a directed graph via Kahn's algorithm.
    ///
    /// Fails with [`TopoError::NotDag`] when a cycle prevents every vertex
    /// from being ordered; the error carries the vertices whose in-degree
    /// never reached zero. Calling this on an undirected graph with at least
    /// one edge always fails, since every stored edge pair is a two-cycle to
    /// Kahn's algorithm.
    pub fn topo_order(&self) -> Result<Vec<VertexId>, TopoError> {
        let n = self.n_vertices();
        let mut in_degree = vec![0usize; n];
        for v in self.vertex_ids() {
            for &w in self.neighbors(v) {
                in_degree[w.0] += 1;
            }
        }

        let mut queue: VecDeque<VertexId> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, &d)| d == 0)
            .map(|(i, _)| VertexId(i))
            .collect();

        let mut order = Vec::with_capacity(n);
        while let Some(v) = queue.pop_front() {
            order.push(v);
            for &w in self.neighbors(v) {
                in_degree[w.0] -= 1;
                if in_degree[w.0] == 0 {
                    queue.push_back(w);
                }
            }
        }

        if order.len() != n {
            let remaining = in_degree
                .iter()
                .enumerate()
                .filter(|(_, &d)| d > 0)
                .map(|(i, &d)| (VertexId(i), d))
                .collect();
            return Err(TopoError::NotDag {
                ordered: order.len(),
                total: n,
                remaining,
            });
        }
        Ok(order)
    }

    /// Whether the graph contains a cycle.
    ///
    /// Directed graphs are checked with [`topo_order`](Self::topo_order);
    /// undirected graphs with a parent-tracking DFS, where the mirror entry
    /// of the edge just taken is not a cycle but any other way back to a
    /// visited vertex is.
    pub fn is_cyclic(&self) -> bool {
        if self.is_directed() {
            self.topo_order().is_err()
        } else {
            self.has_undirected_cycle()
        }
    }

    fn has_undirected_cycle(&self) -> bool {
        let n = self.n_vertices();
        let mut visited = bitvec![0; n];

        for start in 0..n {
            if visited[start] {
                continue;
            }
            let mut stack = vec![(VertexId(start), None::<VertexId>)];
            while let Some((v, parent)) = stack.pop() {
                if visited[v.0] {
                    // reached twice within one component
                    return true;
                }
                visited.set(v.0, true);
                for &w in self.neighbors(v) {
                    if Some(w) == parent {
                        continue;
                    }
                    if visited[w.0] {
                        return true;
                    }
                    stack.push((w, Some(v)));
                }
            }
        }
        false
    }
}
