//! # Labelled Graphs
//!
//! This module provides [`LabelGraph`], a capacity-bounded adjacency-list
//! graph over string-labelled vertices, directed or undirected.
//!
//! ## Representation
//!
//! Vertices are identified externally by their label and internally by a
//! [`VertexId`], the position of the label in insertion order. The label to
//! id bijection is held in an [`IndexSet`] so that insertion order *is* the
//! index space and label lookup never scans. All algorithms in
//! [`crate::algorithms`] operate on ids; labels only cross the construction
//! and display boundary.
//!
//! Each vertex owns an ordered **adjacency row** of neighbour ids and a
//! **closure row** filled in by
//! [`compute_closures`](LabelGraph::compute_closures). For undirected graphs
//! every edge is stored as a symmetric pair of row entries; the pair is
//! inserted atomically but *not* removed atomically: callers of
//! [`remove_edge`](LabelGraph::remove_edge) handling undirected graphs must
//! remove the mirror entry themselves, which is exactly what the reduction
//! algorithms do.
//!
//! ## Capacities
//!
//! Both the vertex count and the per-vertex row length are bounded by
//! capacities fixed at construction. Exceeding either is a hard
//! [`GraphError::CapacityExceeded`], never silent truncation, and every
//! failing operation leaves the graph untouched.

use std::fmt;

use ahash::RandomState;
use indexmap::IndexSet;
use itertools::Itertools;
use thiserror::Error;

use crate::stack::StackError;

/// Index of a vertex in insertion order.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    derive_more::From,
    derive_more::Into,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VertexId(pub usize);

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error types for graph construction and mutation.
///
/// Every operation that can fail detects the failure before any
/// state-changing side effect executes, so a returned error always means the
/// graph is exactly as it was before the call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A fixed capacity (vertex count, row length, or path-set size) is
    /// exhausted.
    #[error("capacity ({capacity}) exhausted")]
    CapacityExceeded { capacity: usize },

    /// The label is already present as a vertex.
    #[error("vertex `{0}` is already present")]
    DuplicateVertex(String),

    /// The edge (or, for undirected graphs, either of its directions) is
    /// already present.
    #[error("edge `{origin}` -> `{destination}` is already present")]
    DuplicateEdge { origin: String, destination: String },

    /// An endpoint label does not name an inserted vertex.
    #[error("vertex `{0}` was not found in the graph")]
    VertexNotFound(String),

    /// The DFS work-list misbehaved during closure computation.
    #[error(transparent)]
    Stack(#[from] StackError),
}

/// A capacity-bounded graph over string-labelled vertices.
///
/// See the [module documentation](self) for the representation. Construction
/// fixes the vertex capacity, the per-vertex adjacency row capacity and the
/// direction flag; vertices and edges are then appended through
/// [`add_vertex`](Self::add_vertex) and [`add_edge`](Self::add_edge).
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LabelGraph {
    directed: bool,
    vertex_capacity: usize,
    row_capacity: usize,
    labels: IndexSet<String, RandomState>,
    rows: Vec<Vec<VertexId>>,
    closures: Vec<Vec<VertexId>>,
}

impl LabelGraph {
    /// Creates an empty graph with the given capacities and direction flag.
    pub fn new(vertex_capacity: usize, row_capacity: usize, directed: bool) -> Self {
        LabelGraph {
            directed,
            vertex_capacity,
            row_capacity,
            labels: IndexSet::with_capacity_and_hasher(vertex_capacity, RandomState::new()),
            rows: Vec::with_capacity(vertex_capacity),
            closures: Vec::with_capacity(vertex_capacity),
        }
    }

    /// Appends a vertex and allocates its empty adjacency row.
    ///
    /// Fails with [`GraphError::DuplicateVertex`] if the label is already
    /// present and with [`GraphError::CapacityExceeded`] once the vertex
    /// capacity is reached. On success returns the id of the new vertex,
    /// which is also its position in insertion order.
    pub fn add_vertex(&mut self, label: &str) -> Result<VertexId, GraphError> {
        if self.labels.contains(label) {
            return Err(GraphError::DuplicateVertex(label.to_owned()));
        }
        if self.labels.len() == self.vertex_capacity {
            return Err(GraphError::CapacityExceeded {
                capacity: self.vertex_capacity,
            });
        }
        self.labels.insert(label.to_owned());
        self.rows.push(Vec::new());
        self.closures.push(Vec::new());
        Ok(VertexId(self.labels.len() - 1))
    }

    /// Inserts an edge between two existing vertices.
    ///
    /// Fails with [`GraphError::VertexNotFound`] if either label is absent.
    /// For undirected graphs the edge is stored as the symmetric pair
    /// `source -> destination` *and* `destination -> source`; the insertion
    /// is atomic, and [`GraphError::DuplicateEdge`] is raised if either
    /// direction already exists. For directed graphs only
    /// `source -> destination` is stored and only that direction is checked.
    ///
    /// Row capacity is validated for every row the insertion would touch
    /// before any entry lands, so a [`GraphError::CapacityExceeded`] failure
    /// never leaves a half-inserted undirected edge behind.
    pub fn add_edge(&mut self, source: &str, destination: &str) -> Result<(), GraphError> {
        let u = self
            .find_vertex(source)
            .ok_or_else(|| GraphError::VertexNotFound(source.to_owned()))?;
        let v = self
            .find_vertex(destination)
            .ok_or_else(|| GraphError::VertexNotFound(destination.to_owned()))?;

        let duplicate = || GraphError::DuplicateEdge {
            origin: source.to_owned(),
            destination: destination.to_owned(),
        };
        let full = GraphError::CapacityExceeded {
            capacity: self.row_capacity,
        };

        if self.directed {
            if self.neighbor_position(u, v).is_some() {
                return Err(duplicate());
            }
            if self.rows[u.0].len() == self.row_capacity {
                return Err(full);
            }
            self.rows[u.0].push(v);
        } else {
            if self.neighbor_position(u, v).is_some() || self.neighbor_position(v, u).is_some() {
                return Err(duplicate());
            }
            // A self-loop lands both entries in the same row.
            let needed = if u == v { 2 } else { 1 };
            if self.rows[u.0].len() + needed > self.row_capacity {
                return Err(full);
            }
            if u != v && self.rows[v.0].len() == self.row_capacity {
                return Err(full);
            }
            self.rows[u.0].push(v);
            self.rows[v.0].push(u);
        }
        Ok(())
    }

    /// Looks up the id of a label.
    pub fn find_vertex(&self, label: &str) -> Option<VertexId> {
        self.labels.get_index_of(label).map(VertexId)
    }

    /// The label of a vertex, if the id is in range.
    pub fn label(&self, vertex: VertexId) -> Option<&str> {
        self.labels.get_index(vertex.0).map(String::as_str)
    }

    /// Position of `neighbor` in the adjacency row of `vertex`.
    ///
    /// A linear scan: rows are short and ordered, and the position is what
    /// [`remove_edge`](Self::remove_edge) consumes.
    pub fn neighbor_position(&self, vertex: VertexId, neighbor: VertexId) -> Option<usize> {
        self.rows.get(vertex.0)?.iter().position(|&w| w == neighbor)
    }

    /// Whether the row of `source` contains `destination`.
    pub fn has_edge(&self, source: VertexId, destination: VertexId) -> bool {
        self.neighbor_position(source, destination).is_some()
    }

    /// Removes one adjacency entry, shifting the rest of the row left.
    ///
    /// Returns the removed neighbour, or `None` if the position is out of
    /// range. The undirected mirror entry is deliberately *not* removed;
    /// callers working on undirected graphs issue the second call.
    pub fn remove_edge(&mut self, vertex: VertexId, position: usize) -> Option<VertexId> {
        let row = self.rows.get_mut(vertex.0)?;
        (position < row.len()).then(|| row.remove(position))
    }

    /// Re-appends a neighbour at the end of a row.
    ///
    /// Only reachable from the reduction algorithms, which restore an entry
    /// they removed moments earlier, so the row is guaranteed to have room.
    pub(crate) fn push_neighbor(&mut self, vertex: VertexId, neighbor: VertexId) {
        self.rows[vertex.0].push(neighbor);
    }

    /// Deep copy of the structure: vertices, adjacency rows and direction
    /// flag, with fully independent storage and **empty** closure rows.
    ///
    /// This is the working copy the reduction algorithms mutate; the source
    /// graph is never touched through a clone.
    pub fn clone_structure(&self) -> Self {
        LabelGraph {
            directed: self.directed,
            vertex_capacity: self.vertex_capacity,
            row_capacity: self.row_capacity,
            labels: self.labels.clone(),
            rows: self.rows.clone(),
            closures: vec![Vec::new(); self.rows.len()],
        }
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn vertex_capacity(&self) -> usize {
        self.vertex_capacity
    }

    pub fn row_capacity(&self) -> usize {
        self.row_capacity
    }

    pub fn n_vertices(&self) -> usize {
        self.labels.len()
    }

    /// Number of edges, counting each undirected pair once.
    pub fn n_edges(&self) -> usize {
        let entries: usize = self.rows.iter().map(Vec::len).sum();
        if self.directed {
            entries
        } else {
            entries / 2
        }
    }

    /// Vertex ids in insertion order.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> {
        (0..self.labels.len()).map(VertexId)
    }

    /// Labels in insertion order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    /// The adjacency row of a vertex, empty for an out-of-range id.
    pub fn neighbors(&self, vertex: VertexId) -> &[VertexId] {
        self.rows.get(vertex.0).map_or(&[], Vec::as_slice)
    }

    /// The adjacency row of a vertex as labels.
    pub fn neighbor_labels(&self, vertex: VertexId) -> impl Iterator<Item = &str> {
        self.neighbors(vertex).iter().filter_map(|&w| self.label(w))
    }

    /// The transitive closure of a vertex in DFS-discovery order.
    ///
    /// Empty until [`compute_closures`](Self::compute_closures) has run on
    /// this graph (clones always start empty).
    pub fn closure(&self, vertex: VertexId) -> &[VertexId] {
        self.closures.get(vertex.0).map_or(&[], Vec::as_slice)
    }

    /// The transitive closure of a vertex as labels.
    pub fn closure_labels(&self, vertex: VertexId) -> impl Iterator<Item = &str> {
        self.closure(vertex).iter().filter_map(|&w| self.label(w))
    }

    pub(crate) fn set_closure(&mut self, vertex: VertexId, closure: Vec<VertexId>) {
        self.closures[vertex.0] = closure;
    }

    /// Resets every closure row to empty.
    pub fn clear_closures(&mut self) {
        for closure in &mut self.closures {
            closure.clear();
        }
    }

    /// Renders the per-vertex closures as label sequences, one vertex per
    /// line, `∅` for an empty closure.
    pub fn closure_display(&self) -> String {
        let mut out = String::new();
        for v in self.vertex_ids() {
            let Some(label) = self.label(v) else { continue };
            if self.closure(v).is_empty() {
                out.push_str(&format!("{label} => ∅\n"));
            } else {
                out.push_str(&format!("{label} => {}\n", self.closure_labels(v).join(", ")));
            }
        }
        out
    }
}

/// One vertex per line: the label, an arrow matching the direction flag, and
/// the adjacency row as labels (`∅` when empty).
impl fmt::Display for LabelGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arrow = if self.directed { "->" } else { "--" };
        for v in self.vertex_ids() {
            let Some(label) = self.label(v) else { continue };
            if self.neighbors(v).is_empty() {
                writeln!(f, "{label} {arrow} ∅")?;
            } else {
                writeln!(f, "{label} {arrow} {}", self.neighbor_labels(v).join(", "))?;
            }
        }
        Ok(())
    }
}
