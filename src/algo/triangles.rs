//! Online triangle detection against the sampled graph
//!
//! Triangles closed by an arriving edge `(u, v)` are the common neighbors
//! of `u` and `v` in the sample. Detection runs before the edge itself is
//! admitted, so it only ever sees older edges.

use crate::graph::{Edge, ReservoirStore, Round, SampledGraph, SlotRef, VertexId};
use crate::policy::EdgeStamp;

/// One triangle `(u, v, apex)` seen through the sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleObservation {
    /// The common neighbor closing the triangle
    pub apex: VertexId,
    /// Stamp of the sampled edge `(u, apex)`
    pub first: EdgeStamp,
    /// Stamp of the sampled edge `(v, apex)`
    pub second: EdgeStamp,
}

/// Resolve an adjacency slot reference to its sampling metadata
pub fn resolve_stamp(slot: SlotRef, reservoir: &ReservoirStore, current: Round) -> EdgeStamp {
    match slot {
        SlotRef::WaitingRoom => EdgeStamp {
            probability: 1.0,
            round: current,
            staged: true,
        },
        SlotRef::Reservoir(id) => match reservoir.slot_at(id) {
            Some(sampled) => EdgeStamp {
                probability: sampled.probability,
                round: sampled.round,
                staged: false,
            },
            None => {
                debug_assert!(false, "adjacency points at empty {}", id);
                EdgeStamp::certain(current)
            }
        },
    }
}

/// Collect every triangle the arriving `edge` closes in `graph` into `out`.
///
/// Returns the number of triangles found. `out` is cleared first.
pub fn detect_triangles(
    graph: &SampledGraph,
    edge: Edge,
    current: Round,
    out: &mut Vec<TriangleObservation>,
) -> usize {
    out.clear();
    let adjacency = graph.adjacency();

    // A vertex outside the sample cannot close a sampled triangle
    let (Some(u_neighbors), Some(v_neighbors)) =
        (adjacency.neighbors_of(edge.src), adjacency.neighbors_of(edge.dst))
    else {
        return 0;
    };

    // Probe the larger map while walking the smaller one
    let swapped = u_neighbors.len() > v_neighbors.len();
    let (small, large) = if swapped {
        (v_neighbors, u_neighbors)
    } else {
        (u_neighbors, v_neighbors)
    };

    let reservoir = graph.reservoir();
    for (&apex, &small_slot) in small {
        let Some(&large_slot) = large.get(&apex) else {
            continue;
        };
        let (u_slot, v_slot) = if swapped {
            (large_slot, small_slot)
        } else {
            (small_slot, large_slot)
        };
        out.push(TriangleObservation {
            apex,
            first: resolve_stamp(u_slot, reservoir, current),
            second: resolve_stamp(v_slot, reservoir, current),
        });
    }
    out.len()
}
