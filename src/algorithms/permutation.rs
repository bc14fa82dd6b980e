//! Transitive reduction by exhaustive simple-path enumeration.
//!
//! For every vertex pair the method enumerates *all* candidate simple paths
//! between the endpoints (every permutation of every subset of the other
//! vertices, spliced between origin and destination), validates each one
//! against the live working graph, and keeps the valid ones in a
//! [`PathSet`]. When a pair has more than one valid path, the paths judged
//! disjoint from the longest one lose their edges.
//!
//! ## Enumeration order
//!
//! Candidates are generated by swap-and-restore backtracking, smallest
//! intermediate count first ([`CandidatePaths`] makes that order explicit).
//! The order is load-bearing: the longest-path slot is only replaced on a
//! strictly greater edge count, so among equally long paths the *first
//! enumerated* wins.
//!
//! ## Cost and limits
//!
//! The candidate count is a sum of falling factorials
//! ([`possible_path_count`]), factorial in the vertex count. That is
//! acceptable for the small fixed-capacity graphs this crate targets and is
//! the price of enumerating paths instead of probing reachability.
//!
//! The disjointness test is a heuristic inherited from the method itself:
//! path A is "disjoint" from the longest path B when no edge of A is
//! reproduced, in order, inside B's vertex sequence (B's final vertex is
//! never inspected, so edges into the shared destination never count as
//! shared). On graphs with parallel alternate routes of the same length it
//! can both over- and under-delete. Callers wanting a reduction that is
//! verified edge-by-edge should use
//! [`walk_reduction`](LabelGraph::walk_reduction) instead.

use itertools::Itertools;
use thiserror::Error;

use crate::graph::{GraphError, LabelGraph, VertexId};

/// A simple path as an ordered vertex sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Path {
    vertices: Vec<VertexId>,
}

impl Path {
    pub fn new(vertices: Vec<VertexId>) -> Self {
        Path { vertices }
    }

    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    /// Number of edges: one less than the vertex count.
    pub fn edge_count(&self) -> usize {
        self.vertices.len().saturating_sub(1)
    }

    /// Consecutive vertex pairs.
    pub fn edges(&self) -> impl Iterator<Item = (VertexId, VertexId)> + '_ {
        self.vertices.iter().copied().tuple_windows()
    }
}

/// Error type for [`PathSet`] insertion.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathSetError {
    #[error("path set capacity ({capacity}) exhausted")]
    CapacityExceeded { capacity: usize },
}

impl From<PathSetError> for GraphError {
    fn from(err: PathSetError) -> Self {
        let PathSetError::CapacityExceeded { capacity } = err;
        GraphError::CapacityExceeded { capacity }
    }
}

/// A capacity-bounded collection of candidate paths between one vertex pair,
/// tracking the longest path seen.
///
/// The set is cleared and reused between vertex pairs; the capacity is sized
/// once, up front, from [`possible_path_count`].
#[derive(Debug, Clone)]
pub struct PathSet {
    paths: Vec<Path>,
    capacity: usize,
    longest: Option<usize>,
}

impl PathSet {
    pub fn with_capacity(capacity: usize) -> Self {
        PathSet {
            paths: Vec::new(),
            capacity,
            longest: None,
        }
    }

    /// Inserts a path, updating the longest-path index.
    ///
    /// The comparison is strictly greater, so the first of several equally
    /// long paths keeps the longest slot: enumeration order decides ties.
    pub fn insert(&mut self, path: Path) -> Result<(), PathSetError> {
        if self.paths.len() >= self.capacity {
            return Err(PathSetError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        match self.longest {
            Some(best) if path.edge_count() <= self.paths[best].edge_count() => {}
            _ => self.longest = Some(self.paths.len()),
        }
        self.paths.push(path);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, index: usize) -> Option<&Path> {
        self.paths.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter()
    }

    pub fn longest_index(&self) -> Option<usize> {
        self.longest
    }

    pub fn longest(&self) -> Option<&Path> {
        self.longest.and_then(|i| self.paths.get(i))
    }

    /// Empties the set for the next vertex pair, keeping the capacity.
    pub fn clear(&mut self) {
        self.paths.clear();
        self.longest = None;
    }

    /// The disjointness heuristic: whether the path at `index` shares no
    /// edge, in matching consecutive order, with the longest path.
    ///
    /// For each edge `(a, b)` of the shorter path, `a` is looked up among
    /// the longest path's vertices *excluding its final one*; if present,
    /// and `b` occurs anywhere later in that same window, the edge counts as
    /// shared and the paths are not disjoint. Both paths span the same
    /// endpoints, so the final-vertex exclusion means edges into the shared
    /// destination never count as shared, a quirk of the method that is
    /// kept as-is. See the module docs for the consequences.
    pub fn is_disjoint_from_longest(&self, index: usize) -> bool {
        let (Some(best), Some(shorter)) = (self.longest(), self.get(index)) else {
            return false;
        };
        let window = &best.vertices()[..best.edge_count()];
        for (a, b) in shorter.edges() {
            if let Some(position) = window.iter().position(|&v| v == a) {
                if window[position + 1..].contains(&b) {
                    return false;
                }
            }
        }
        true
    }
}

/// Closed-form count of all candidate paths between one vertex pair in a
/// graph of `n_vertices` vertices: the direct edge plus, for every
/// intermediate count `k`, the number of ways to arrange `k` of the
/// remaining `n_vertices - 2` vertices between the endpoints.
pub fn possible_path_count(n_vertices: usize) -> usize {
    let between = n_vertices.saturating_sub(2);
    let mut total = 1;
    for k in 1..=between {
        let mut arrangements = 1;
        for i in 0..k {
            arrangements *= between - i;
        }
        total += arrangements;
    }
    total
}

/// Enumerates every candidate path from `origin` to `destination` through a
/// sequence of eligible intermediate vertices.
///
/// Candidates are produced for intermediate counts `0..=sequence.len()`,
/// and within one count by swap-and-restore backtracking over the sequence:
/// at each depth the cursor position is swapped with each later position in
/// turn, descending in between and swapping back afterwards. The recursion
/// is flattened into an explicit frame stack (one saved loop index per
/// depth) so the iterator can yield one candidate at a time; the enumeration
/// order is exactly that of the recursive formulation, which the longest-path
/// tie-breaking in [`PathSet`] depends on.
#[derive(Debug, Clone)]
pub struct CandidatePaths {
    origin: VertexId,
    destination: VertexId,
    sequence: Vec<VertexId>,
    intermediates: usize,
    frames: Vec<usize>,
    started: bool,
    done: bool,
}

impl CandidatePaths {
    pub fn new(origin: VertexId, destination: VertexId, sequence: Vec<VertexId>) -> Self {
        CandidatePaths {
            origin,
            destination,
            sequence,
            intermediates: 0,
            frames: Vec::new(),
            started: false,
            done: false,
        }
    }

    /// The candidate at the current cursor: origin, the first
    /// `intermediates` sequence entries, destination.
    fn emit(&self) -> Vec<VertexId> {
        let mut path = Vec::with_capacity(self.intermediates + 2);
        path.push(self.origin);
        path.extend_from_slice(&self.sequence[..self.intermediates]);
        path.push(self.destination);
        path
    }

    /// Opens a frame for every remaining depth. The first loop iteration at
    /// depth `d` swaps position `d` with itself, so no swap is recorded.
    fn descend(&mut self) {
        while self.frames.len() < self.intermediates {
            self.frames.push(self.frames.len());
        }
    }
}

impl Iterator for CandidatePaths {
    type Item = Vec<VertexId>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
            self.descend();
            return Some(self.emit());
        }
        loop {
            match self.frames.pop() {
                None => {
                    // every frame restored its swap on the way up, so the
                    // sequence is back in input order for the next count
                    self.intermediates += 1;
                    if self.intermediates > self.sequence.len() {
                        self.done = true;
                        return None;
                    }
                    self.descend();
                    return Some(self.emit());
                }
                Some(cursor) => {
                    let depth = self.frames.len();
                    self.sequence.swap(depth, cursor);
                    let next = cursor + 1;
                    if next < self.sequence.len() {
                        self.sequence.swap(depth, next);
                        self.frames.push(next);
                        self.descend();
                        return Some(self.emit());
                    }
                }
            }
        }
    }
}

impl LabelGraph {
    /// Transitive reduction by the permutation method.
    ///
    /// Works on a [`clone_structure`](Self::clone_structure) working copy
    /// and leaves `self` untouched. Vertex pairs are visited in insertion
    /// order (`i` before `j`); for directed graphs a second pass visits
    /// every pair in the reverse order to cover the transpose direction.
    /// For each pair, all candidate paths are enumerated and validated
    /// against the live working graph; if more than one valid path exists,
    /// the paths disjoint from the longest lose their edges (and the
    /// mirrored entries, for undirected graphs).
    ///
    /// Assumes directed input is acyclic; see [`crate::algorithms::cycle`].
    /// The disjointness rule is a documented heuristic; see the
    /// [module docs](self). The returned graph has empty closure storage.
    pub fn permutation_reduction(&self) -> Result<LabelGraph, GraphError> {
        let mut working = self.clone_structure();
        let mut paths = PathSet::with_capacity(possible_path_count(self.n_vertices()));

        let n = self.n_vertices();
        for i in 0..n {
            for j in (i + 1)..n {
                reduce_between(&mut working, &mut paths, VertexId(i), VertexId(j))?;
            }
        }
        if self.is_directed() {
            for i in (1..n).rev() {
                for j in (0..i).rev() {
                    reduce_between(&mut working, &mut paths, VertexId(i), VertexId(j))?;
                }
            }
        }
        Ok(working)
    }
}

/// Runs one vertex pair: enumerate, validate, collect, delete, clear.
fn reduce_between(
    working: &mut LabelGraph,
    paths: &mut PathSet,
    origin: VertexId,
    destination: VertexId,
) -> Result<(), GraphError> {
    let sequence: Vec<VertexId> = working
        .vertex_ids()
        .filter(|&v| v != origin && v != destination)
        .collect();

    for candidate in CandidatePaths::new(origin, destination, sequence) {
        if path_exists(working, &candidate) {
            paths.insert(Path::new(candidate))?;
        }
    }

    if paths.len() > 1 {
        delete_disjoint_paths(working, paths);
    }
    paths.clear();
    Ok(())
}

/// Whether every consecutive pair of the candidate is an edge of the graph.
fn path_exists(graph: &LabelGraph, vertices: &[VertexId]) -> bool {
    vertices
        .iter()
        .copied()
        .tuple_windows()
        .all(|(a, b)| graph.has_edge(a, b))
}

/// Deletes from the working graph every edge of every path disjoint from
/// the longest one. Edges already gone (shared with an earlier deleted
/// path) are skipped.
fn delete_disjoint_paths(working: &mut LabelGraph, paths: &PathSet) {
    let Some(best) = paths.longest_index() else {
        return;
    };
    for index in 0..paths.len() {
        if index == best || !paths.is_disjoint_from_longest(index) {
            continue;
        }
        let Some(path) = paths.get(index) else {
            continue;
        };
        for (a, b) in path.edges() {
            if let Some(position) = working.neighbor_position(a, b) {
                working.remove_edge(a, position);
                if !working.is_directed() {
                    if let Some(mirror) = working.neighbor_position(b, a) {
                        working.remove_edge(b, mirror);
                    }
                }
            }
        }
    }
}
