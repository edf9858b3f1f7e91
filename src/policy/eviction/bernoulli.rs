//! Independent (Bernoulli) edge sampling with a fixed probability

use crate::graph::{Edge, SampledGraph, SlotId};
use crate::policy::{EvictionPolicy, SampleContext};
use rand::rngs::StdRng;
use rand::Rng;
use tracing::warn;

/// Keeps every edge independently with probability `p`.
///
/// Nothing is ever evicted. The reservoir capacity acts as a hard memory
/// ceiling: once it is reached, further admitted edges are dropped.
#[derive(Debug, Clone)]
pub struct BernoulliSampling {
    probability: f64,
    capacity: usize,
    next_slot: usize,
    ceiling_reached: bool,
}

impl BernoulliSampling {
    pub fn new(probability: f64, capacity: usize) -> Self {
        Self {
            probability,
            capacity,
            next_slot: 0,
            ceiling_reached: false,
        }
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Whether an admitted edge has been dropped for lack of space
    pub fn ceiling_reached(&self) -> bool {
        self.ceiling_reached
    }
}

impl EvictionPolicy for BernoulliSampling {
    fn name(&self) -> &'static str {
        "bernoulli"
    }

    fn context(&self, edges_seen: u64) -> SampleContext<'_> {
        SampleContext {
            edges_seen,
            capacity: self.capacity,
            round: 1,
            sampling_probability: self.probability,
            survival: None,
            reservoir_arrivals: self.next_slot as u64,
        }
    }

    fn admit(&mut self, edge: Edge, _edges_seen: u64, graph: &mut SampledGraph, rng: &mut StdRng) {
        if rng.gen::<f64>() >= self.probability {
            return;
        }
        if self.next_slot >= self.capacity {
            if !self.ceiling_reached {
                warn!(
                    "Bernoulli sample reached its ceiling of {} edges; later admissions are dropped",
                    self.capacity
                );
                self.ceiling_reached = true;
            }
            return;
        }
        graph.admit(SlotId::new(self.next_slot), edge, self.probability, 1);
        self.next_slot += 1;
    }
}
