//! Adjacency index over the sampled edges
//!
//! Maps every vertex with at least one sampled edge to its neighbor map
//! (neighbor -> slot reference). Both directions of an edge are always
//! present and point at the same slot; a vertex whose neighbor map becomes
//! empty is removed.

use super::types::{SlotRef, VertexId};
use rustc_hash::FxHashMap;

/// Neighbor map of a single vertex
pub type NeighborMap = FxHashMap<VertexId, SlotRef>;

/// Symmetric adjacency over the sampled subgraph
#[derive(Debug, Default, Clone)]
pub struct AdjacencyIndex {
    vertices: FxHashMap<VertexId, NeighborMap>,
    /// Number of distinct undirected edges currently indexed
    edge_count: usize,
}

impl AdjacencyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the edge `(u, v)` in both directions, overwriting any existing entry
    pub fn record_edge(&mut self, u: VertexId, v: VertexId, slot: SlotRef) {
        debug_assert_ne!(u, v, "self-loops never reach the adjacency index");
        let previous = self.vertices.entry(u).or_default().insert(v, slot);
        self.vertices.entry(v).or_default().insert(u, slot);
        if previous.is_none() {
            self.edge_count += 1;
        }
    }

    /// Remove the edge `(u, v)` in both directions.
    ///
    /// Returns the slot reference the edge pointed at, if it was indexed.
    pub fn remove_edge(&mut self, u: VertexId, v: VertexId) -> Option<SlotRef> {
        let removed = Self::remove_direction(&mut self.vertices, u, v);
        Self::remove_direction(&mut self.vertices, v, u);
        if removed.is_some() {
            self.edge_count -= 1;
        }
        removed
    }

    fn remove_direction(
        vertices: &mut FxHashMap<VertexId, NeighborMap>,
        from: VertexId,
        to: VertexId,
    ) -> Option<SlotRef> {
        let map = vertices.get_mut(&from)?;
        let removed = map.remove(&to);
        if map.is_empty() {
            vertices.remove(&from);
        }
        removed
    }

    /// Neighbor map of `u`, or `None` if `u` has no sampled edge
    pub fn neighbors_of(&self, u: VertexId) -> Option<&NeighborMap> {
        self.vertices.get(&u)
    }

    /// Slot reference of the edge `(u, v)`, if sampled
    pub fn slot_of(&self, u: VertexId, v: VertexId) -> Option<SlotRef> {
        self.vertices.get(&u).and_then(|m| m.get(&v)).copied()
    }

    pub fn contains_vertex(&self, u: VertexId) -> bool {
        self.vertices.contains_key(&u)
    }

    pub fn degree(&self, u: VertexId) -> usize {
        self.vertices.get(&u).map_or(0, |m| m.len())
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.edge_count = 0;
    }

    /// Replace the whole index with the given edges
    pub fn rebuild_from<I>(&mut self, edges: I)
    where
        I: IntoIterator<Item = (VertexId, VertexId, SlotRef)>,
    {
        self.clear();
        for (u, v, slot) in edges {
            self.record_edge(u, v, slot);
        }
    }

    /// Iterate over `(vertex, neighbor map)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&VertexId, &NeighborMap)> {
        self.vertices.iter()
    }

    /// Check the symmetry invariant. Used by tests and debug assertions.
    pub fn is_symmetric(&self) -> bool {
        self.vertices.iter().all(|(u, neighbors)| {
            !neighbors.is_empty()
                && neighbors.iter().all(|(v, slot)| {
                    u != v && self.slot_of(*v, *u) == Some(*slot)
                })
        })
    }
}
