//! Classic per-edge reservoir sampling

use crate::graph::{Edge, SampledGraph, SlotId};
use crate::policy::{EvictionPolicy, SampleContext};
use rand::rngs::StdRng;
use rand::Rng;
use tracing::info;

/// The first `k` edges fill the reservoir. Afterwards edge `t` is admitted
/// with probability `k/t` and replaces a uniformly random occupant.
#[derive(Debug, Clone)]
pub struct ClassicReservoir {
    capacity: usize,
    next_slot: usize,
}

impl ClassicReservoir {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            next_slot: 0,
        }
    }

    fn admission_probability(&self, edges_seen: u64) -> f64 {
        (self.capacity as f64 / edges_seen as f64).min(1.0)
    }
}

impl EvictionPolicy for ClassicReservoir {
    fn name(&self) -> &'static str {
        "reservoir"
    }

    fn context(&self, edges_seen: u64) -> SampleContext<'_> {
        SampleContext {
            edges_seen,
            capacity: self.capacity,
            round: 1,
            sampling_probability: self.admission_probability(edges_seen.max(1)),
            survival: None,
            reservoir_arrivals: edges_seen,
        }
    }

    fn admit(&mut self, edge: Edge, edges_seen: u64, graph: &mut SampledGraph, rng: &mut StdRng) {
        if self.next_slot < self.capacity {
            graph.admit(SlotId::new(self.next_slot), edge, 1.0, 1);
            self.next_slot += 1;
            if self.next_slot == self.capacity {
                info!("Reservoir full after {} edges", edges_seen);
            }
            return;
        }

        let probability = self.admission_probability(edges_seen);
        if rng.gen::<f64>() < probability {
            let slot = SlotId::new(rng.gen_range(0..self.capacity));
            graph.admit(slot, edge, probability, 1);
        }
    }
}
