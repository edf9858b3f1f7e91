//! Fixed-capacity reservoir of sampled edges
//!
//! The store only performs writes; which slot to write is always decided by
//! the eviction policy.

use super::types::{Edge, Round, SampledEdge, SlotId};

#[derive(Debug, Clone)]
pub struct ReservoirStore {
    slots: Vec<Option<SampledEdge>>,
    occupied: usize,
}

impl ReservoirStore {
    /// Create an empty reservoir with exactly `capacity` slots
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
            occupied: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.occupied
    }

    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    pub fn is_full(&self) -> bool {
        self.occupied == self.slots.len()
    }

    /// Write an edge and its metadata into `slot`, returning the displaced occupant
    pub fn occupy(
        &mut self,
        slot: SlotId,
        edge: Edge,
        probability: f64,
        round: Round,
    ) -> Option<SampledEdge> {
        let previous = self.slots[slot.index()].replace(SampledEdge {
            edge,
            probability,
            round,
        });
        if previous.is_none() {
            self.occupied += 1;
        }
        previous
    }

    /// Empty `slot`, returning its occupant
    pub fn vacate(&mut self, slot: SlotId) -> Option<SampledEdge> {
        let previous = self.slots[slot.index()].take();
        if previous.is_some() {
            self.occupied -= 1;
        }
        previous
    }

    pub fn slot_at(&self, slot: SlotId) -> Option<&SampledEdge> {
        self.slots.get(slot.index()).and_then(|s| s.as_ref())
    }

    /// Iterate over occupied slots in index order
    pub fn iter_occupied(&self) -> impl Iterator<Item = (SlotId, &SampledEdge)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|e| (SlotId::new(i), e)))
    }
}
