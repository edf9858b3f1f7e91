//! Waiting-room sampling
//!
//! The memory budget `k` is split into a FIFO waiting room of `w` edges and
//! a reservoir of `k − w` slots. The newest `w` edges are always sampled;
//! only edges pushed out of the waiting room compete for reservoir slots.

use crate::graph::{Edge, SampledGraph, SlotId};
use crate::policy::{EvictionPolicy, SampleContext};
use crate::sampling::WaitingRoom;
use rand::rngs::StdRng;
use rand::Rng;
use tracing::info;

#[derive(Debug, Clone)]
pub struct WaitingRoomSampling {
    reservoir_capacity: usize,
    filled: usize,
    room: WaitingRoom,
    /// Edges that have reached the reservoir stage, filled ones included
    arrivals: u64,
}

impl WaitingRoomSampling {
    /// Split `budget` into a waiting room of `floor(budget·alpha_wr)` edges
    /// and a reservoir holding the rest
    pub fn new(budget: usize, alpha_wr: f64) -> Self {
        let room = Self::room_size(budget, alpha_wr);
        Self {
            reservoir_capacity: budget - room,
            filled: 0,
            room: WaitingRoom::with_capacity(room),
            arrivals: 0,
        }
    }

    pub fn room_size(budget: usize, alpha_wr: f64) -> usize {
        (budget as f64 * alpha_wr).floor() as usize
    }

    pub fn reservoir_capacity(&self) -> usize {
        self.reservoir_capacity
    }

    pub fn waiting_room(&self) -> &WaitingRoom {
        &self.room
    }

    pub fn arrivals(&self) -> u64 {
        self.arrivals
    }
}

impl EvictionPolicy for WaitingRoomSampling {
    fn name(&self) -> &'static str {
        "waiting_room"
    }

    fn context(&self, edges_seen: u64) -> SampleContext<'_> {
        let probability = if self.arrivals == 0 {
            1.0
        } else {
            (self.reservoir_capacity as f64 / self.arrivals as f64).min(1.0)
        };
        SampleContext {
            edges_seen,
            capacity: self.reservoir_capacity,
            round: 1,
            sampling_probability: probability,
            survival: None,
            reservoir_arrivals: self.arrivals,
        }
    }

    fn admit(&mut self, edge: Edge, edges_seen: u64, graph: &mut SampledGraph, rng: &mut StdRng) {
        if self.filled < self.reservoir_capacity {
            graph.admit(SlotId::new(self.filled), edge, 1.0, 1);
            self.filled += 1;
            self.arrivals += 1;
            if self.filled == self.reservoir_capacity {
                info!(
                    "Reservoir full after {} edges, staging through a waiting room of {}",
                    edges_seen,
                    self.room.capacity()
                );
            }
            return;
        }

        let pushed_out = self.room.push(edge);
        let staged = self.room.capacity() > 0;

        if let Some(candidate) = pushed_out {
            self.arrivals += 1;
            let probability = self.reservoir_capacity as f64 / self.arrivals as f64;
            if rng.gen::<f64>() < probability {
                let slot = SlotId::new(rng.gen_range(0..self.reservoir_capacity));
                graph.admit(slot, candidate, probability, 1);
            } else if staged {
                graph.discard_staged(candidate);
            }
        }

        if staged {
            graph.stage(edge);
        }
    }
}
