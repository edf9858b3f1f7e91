//! The sampled subgraph: reservoir slots plus the adjacency index over them
//!
//! Every mutation goes through this type so the two structures can never
//! disagree about which slot holds an edge.

use super::adjacency::AdjacencyIndex;
use super::reservoir::ReservoirStore;
use super::types::{Edge, Round, SampledEdge, SlotId, SlotRef, VertexId};

#[derive(Debug, Clone)]
pub struct SampledGraph {
    reservoir: ReservoirStore,
    adjacency: AdjacencyIndex,
}

impl SampledGraph {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            reservoir: ReservoirStore::with_capacity(capacity),
            adjacency: AdjacencyIndex::new(),
        }
    }

    pub fn reservoir(&self) -> &ReservoirStore {
        &self.reservoir
    }

    pub fn adjacency(&self) -> &AdjacencyIndex {
        &self.adjacency
    }

    pub fn capacity(&self) -> usize {
        self.reservoir.capacity()
    }

    /// Number of distinct sampled edges visible to triangle detection
    pub fn sampled_edges(&self) -> usize {
        self.adjacency.edge_count()
    }

    /// Write `edge` into `slot`, unlinking whatever occupied the slot before
    pub fn admit(
        &mut self,
        slot: SlotId,
        edge: Edge,
        probability: f64,
        round: Round,
    ) -> Option<SampledEdge> {
        let displaced = self.reservoir.occupy(slot, edge, probability, round);
        if let Some(old) = &displaced {
            self.unlink(old.edge, SlotRef::Reservoir(slot));
        }
        self.adjacency
            .record_edge(edge.src, edge.dst, SlotRef::Reservoir(slot));
        displaced
    }

    /// Empty `slot` and drop its edge from the index
    pub fn evict(&mut self, slot: SlotId) -> Option<SampledEdge> {
        let removed = self.reservoir.vacate(slot)?;
        self.unlink(removed.edge, SlotRef::Reservoir(slot));
        Some(removed)
    }

    /// Empty every slot in `slots`, then rebuild the index from what remains.
    ///
    /// Cheaper than unlinking one edge at a time when most of the reservoir
    /// is being discarded.
    pub fn evict_and_rebuild(&mut self, slots: &[SlotId]) {
        for &slot in slots {
            self.reservoir.vacate(slot);
        }

        let mut staged: Vec<(VertexId, VertexId)> = Vec::new();
        for (&u, neighbors) in self.adjacency.iter() {
            for (&v, slot) in neighbors {
                if u < v && slot.is_staged() {
                    staged.push((u, v));
                }
            }
        }

        // Later entries overwrite earlier ones for a repeated edge. A copy
        // the index already points at goes last, otherwise the newest round.
        let mut retained: Vec<_> = self
            .reservoir
            .iter_occupied()
            .map(|(slot, s)| {
                let indexed = self.adjacency.slot_of(s.edge.src, s.edge.dst)
                    == Some(SlotRef::Reservoir(slot));
                ((indexed, s.round), (s.edge.src, s.edge.dst, SlotRef::Reservoir(slot)))
            })
            .collect();
        retained.sort_by_key(|&(key, _)| key);

        let staged = staged
            .into_iter()
            .map(|(u, v)| (u, v, SlotRef::WaitingRoom));

        let entries: Vec<_> = retained
            .into_iter()
            .map(|(_, entry)| entry)
            .chain(staged)
            .collect();
        self.adjacency.rebuild_from(entries);
    }

    /// Index an edge that sits in the waiting room
    pub fn stage(&mut self, edge: Edge) {
        self.adjacency
            .record_edge(edge.src, edge.dst, SlotRef::WaitingRoom);
    }

    /// Drop a staged edge from the index
    pub fn discard_staged(&mut self, edge: Edge) {
        self.unlink(edge, SlotRef::WaitingRoom);
    }

    /// Remove `edge` from the index only if it still points at `expected`.
    ///
    /// A repeated stream edge re-points the index at its newest slot, and an
    /// older copy leaving the sample must not unlink the newer one.
    fn unlink(&mut self, edge: Edge, expected: SlotRef) {
        if self.adjacency.slot_of(edge.src, edge.dst) == Some(expected) {
            self.adjacency.remove_edge(edge.src, edge.dst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(u: u64, v: u64) -> Edge {
        Edge::new(u, v).unwrap()
    }

    #[test]
    fn test_admit_replaces_occupant() {
        let mut graph = SampledGraph::with_capacity(2);
        graph.admit(SlotId(0), edge(1, 2), 1.0, 1);
        graph.admit(SlotId(1), edge(2, 3), 1.0, 1);

        let displaced = graph.admit(SlotId(0), edge(3, 4), 0.5, 2).unwrap();
        assert_eq!(displaced.edge, edge(1, 2));
        assert!(!graph.adjacency().contains_vertex(1));
        assert_eq!(
            graph.adjacency().slot_of(4, 3),
            Some(SlotRef::Reservoir(SlotId(0)))
        );
        assert_eq!(graph.sampled_edges(), 2);
        assert!(graph.adjacency().is_symmetric());
    }

    #[test]
    fn test_evict_older_duplicate_keeps_newer() {
        let mut graph = SampledGraph::with_capacity(3);
        graph.admit(SlotId(0), edge(1, 2), 1.0, 1);
        graph.admit(SlotId(1), edge(2, 1), 1.0, 1);

        graph.evict(SlotId(0));
        assert_eq!(
            graph.adjacency().slot_of(1, 2),
            Some(SlotRef::Reservoir(SlotId(1)))
        );
        assert_eq!(graph.reservoir().len(), 1);
    }

    #[test]
    fn test_evict_and_rebuild_matches_single_evictions() {
        let mut bulk = SampledGraph::with_capacity(4);
        let mut single = SampledGraph::with_capacity(4);
        for (i, (u, v)) in [(1, 2), (2, 3), (3, 1), (3, 4)].iter().enumerate() {
            bulk.admit(SlotId(i), edge(*u, *v), 1.0, 1);
            single.admit(SlotId(i), edge(*u, *v), 1.0, 1);
        }
        bulk.stage(edge(7, 8));
        single.stage(edge(7, 8));

        bulk.evict_and_rebuild(&[SlotId(0), SlotId(3)]);
        single.evict(SlotId(0));
        single.evict(SlotId(3));

        assert_eq!(bulk.sampled_edges(), single.sampled_edges());
        for (u, neighbors) in single.adjacency().iter() {
            for (v, slot) in neighbors {
                assert_eq!(bulk.adjacency().slot_of(*u, *v), Some(*slot));
            }
        }
        assert_eq!(
            bulk.adjacency().slot_of(8, 7),
            Some(SlotRef::WaitingRoom)
        );
    }

    #[test]
    fn test_rebuild_keeps_newest_copy_of_repeated_edge() {
        let mut graph = SampledGraph::with_capacity(4);
        graph.admit(SlotId(3), edge(1, 2), 1.0, 1);
        graph.admit(SlotId(0), edge(5, 6), 1.0, 1);
        graph.admit(SlotId(1), edge(2, 1), 0.5, 2);
        assert_eq!(
            graph.adjacency().slot_of(1, 2),
            Some(SlotRef::Reservoir(SlotId(1)))
        );

        graph.evict_and_rebuild(&[SlotId(0)]);
        assert_eq!(
            graph.adjacency().slot_of(1, 2),
            Some(SlotRef::Reservoir(SlotId(1)))
        );

        // the older copy leaving must not hide the newer one
        graph.evict(SlotId(3));
        assert_eq!(
            graph.adjacency().slot_of(2, 1),
            Some(SlotRef::Reservoir(SlotId(1)))
        );
        assert!(graph.adjacency().is_symmetric());
    }

    #[test]
    fn test_rebuild_falls_back_to_latest_round_copy() {
        let mut graph = SampledGraph::with_capacity(4);
        graph.admit(SlotId(2), edge(1, 2), 1.0, 2);
        graph.admit(SlotId(3), edge(1, 2), 1.0, 1);
        graph.admit(SlotId(0), edge(1, 2), 0.5, 3);

        graph.evict_and_rebuild(&[SlotId(0)]);
        assert_eq!(
            graph.adjacency().slot_of(1, 2),
            Some(SlotRef::Reservoir(SlotId(2)))
        );
    }

    #[test]
    fn test_stage_and_discard() {
        let mut graph = SampledGraph::with_capacity(1);
        graph.stage(edge(5, 6));
        assert_eq!(graph.sampled_edges(), 1);
        assert!(graph.reservoir().is_empty());

        graph.discard_staged(edge(6, 5));
        assert!(graph.adjacency().is_empty());
    }
}
