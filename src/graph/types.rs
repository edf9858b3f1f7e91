//! Core type definitions for the sampled graph

use serde::{Deserialize, Serialize};
use std::fmt;

/// Vertex identifier as it appears in the edge stream
pub type VertexId = u64;

/// Eviction round counter. Round 1 is the initial fill of the reservoir.
pub type Round = u32;

/// An undirected edge between two distinct vertices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub src: VertexId,
    pub dst: VertexId,
}

impl Edge {
    /// Create an edge. Returns `None` for a self-loop.
    pub fn new(src: VertexId, dst: VertexId) -> Option<Self> {
        if src == dst {
            None
        } else {
            Some(Edge { src, dst })
        }
    }

    /// Endpoints in a canonical (smaller, larger) order
    pub fn canonical(&self) -> (VertexId, VertexId) {
        if self.src < self.dst {
            (self.src, self.dst)
        } else {
            (self.dst, self.src)
        }
    }

    pub fn endpoints(&self) -> (VertexId, VertexId) {
        (self.src, self.dst)
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.src, self.dst)
    }
}

/// Index of a reservoir slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct SlotId(pub usize);

impl SlotId {
    pub fn new(index: usize) -> Self {
        SlotId(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SlotId({})", self.0)
    }
}

impl From<usize> for SlotId {
    fn from(index: usize) -> Self {
        SlotId(index)
    }
}

/// Where a sampled edge currently lives.
///
/// Stored as the value of every adjacency entry, so membership and location
/// are answered by the same lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotRef {
    /// Held by a reservoir slot
    Reservoir(SlotId),
    /// Staged in the waiting room, not yet handled by the reservoir
    WaitingRoom,
}

impl SlotRef {
    pub fn slot(&self) -> Option<SlotId> {
        match self {
            SlotRef::Reservoir(slot) => Some(*slot),
            SlotRef::WaitingRoom => None,
        }
    }

    pub fn is_staged(&self) -> bool {
        matches!(self, SlotRef::WaitingRoom)
    }
}

/// A reservoir occupant together with its sampling metadata
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampledEdge {
    pub edge: Edge,
    /// Inclusion probability at the time the edge was admitted
    pub probability: f64,
    /// Round in which the edge was admitted
    pub round: Round,
}
