//! Transitive closure by iterative depth-first search.
//!
//! For every vertex, in insertion order, a DFS seeded with that vertex runs
//! on a [`BoundedStack`] work-list: pop a vertex, scan its adjacency row, and
//! push every neighbour not yet visited in this run, recording it in the
//! source's closure at push time. The closure order is therefore
//! DFS-discovery order, not sorted order; consumers comparing closures should
//! compare the reachable *set* unless the order itself is under test.
//!
//! The visited mask is vertex-indexed and reset between runs, and the seed is
//! marked visited up front, so a closure never contains its own vertex.
//! Overall cost is O(V·(V+E)): one full traversal per source vertex.

use bitvec::bitvec;

use crate::graph::{GraphError, LabelGraph, VertexId};
use crate::stack::BoundedStack;

impl LabelGraph {
    /// Fills in the transitive closure of every vertex.
    ///
    /// Any previously computed closures are discarded first, so this is safe
    /// to call repeatedly on a graph whose edges change in between; the walk
    /// reduction does exactly that after every trial removal.
    pub fn compute_closures(&mut self) -> Result<(), GraphError> {
        let n = self.n_vertices();
        self.clear_closures();

        let mut worklist = BoundedStack::with_capacity(self.vertex_capacity());
        let mut visited = bitvec![0; n];

        for source in 0..n {
            visited.fill(false);
            visited.set(source, true);
            worklist.clear();
            worklist.push(VertexId(source))?;

            let mut discovered = Vec::new();
            while !worklist.is_empty() {
                let current = worklist.pop()?;
                for &next in self.neighbors(current) {
                    if !visited[next.0] {
                        worklist.push(next)?;
                        visited.set(next.0, true);
                        discovered.push(next);
                    }
                }
            }
            self.set_closure(VertexId(source), discovered);
        }
        Ok(())
    }
}
