//! Sampled-graph storage
//!
//! - `AdjacencyIndex`: symmetric neighbor maps keyed by vertex
//! - `ReservoirStore`: fixed-capacity slot array with per-slot metadata
//! - `SampledGraph`: both of the above, mutated together

pub mod adjacency;
pub mod reservoir;
pub mod sampled;
pub mod types;

// Re-export main types
pub use adjacency::{AdjacencyIndex, NeighborMap};
pub use reservoir::ReservoirStore;
pub use sampled::SampledGraph;
pub use types::{Edge, Round, SampledEdge, SlotId, SlotRef, VertexId};
