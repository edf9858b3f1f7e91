//! Pluggable sampling policies
//!
//! The engine is parameterised by two strategies:
//! - an `EvictionPolicy` deciding which edges enter and leave the sample
//! - a `WeightingPolicy` turning one detected triangle into an unbiased
//!   count contribution
//!
//! The eviction policy owns whatever bookkeeping its weights need (round
//! counter, survival cache, arrival counts) and exposes it through
//! `SampleContext`.

pub mod eviction;
pub mod weighting;

use crate::graph::{Edge, Round, SampledGraph};
use crate::sampling::SurvivalCache;
use rand::rngs::StdRng;

pub use eviction::{
    AdaptiveRate, AdmissionRate, BernoulliSampling, ClassicReservoir, DiscardSchedule, FixedRate,
    RoundBatched, RoundReport, RoundStats, WaitingRoomSampling, MAX_DISCARD_RATE,
};
pub use weighting::{ProbabilityRoundWeight, TurnoverWeight, UniformWeight, WaitingRoomWeight};

/// Sampling metadata of one of the two prior edges closing a triangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeStamp {
    /// Inclusion probability when the edge was admitted
    pub probability: f64,
    /// Round in which the edge was admitted
    pub round: Round,
    /// True while the edge is still in the waiting room
    pub staged: bool,
}

impl EdgeStamp {
    /// Stamp of an edge that is deterministically present in `round`
    pub fn certain(round: Round) -> Self {
        Self {
            probability: 1.0,
            round,
            staged: false,
        }
    }
}

/// Sampler state visible to a weighting policy while an edge is processed
#[derive(Debug, Clone, Copy)]
pub struct SampleContext<'a> {
    /// Edges processed so far, including the current one
    pub edges_seen: u64,
    /// Capacity of the reservoir (excluding any waiting room)
    pub capacity: usize,
    /// Current round
    pub round: Round,
    /// Probability with which an edge currently enters the sample
    pub sampling_probability: f64,
    /// Survival products for round-batched policies
    pub survival: Option<&'a SurvivalCache>,
    /// Edges that have reached the reservoir stage (waiting-room policy)
    pub reservoir_arrivals: u64,
}

/// Decides admission and eviction for every streamed edge
pub trait EvictionPolicy: Send {
    /// Short identifier used in logs and reports
    fn name(&self) -> &'static str;

    /// State snapshot for weighting the triangles of the current edge
    fn context(&self, edges_seen: u64) -> SampleContext<'_>;

    /// Called once per detected triangle, before `admit` for the same edge
    fn observe_triangle(&mut self, _first: &EdgeStamp, _second: &EdgeStamp) {}

    /// Called with the running global estimate whenever it changes,
    /// before `admit` for the same edge
    fn observe_estimate(&mut self, _global: f64) {}

    /// Decide whether `edge` enters the sample, evicting as needed
    fn admit(&mut self, edge: Edge, edges_seen: u64, graph: &mut SampledGraph, rng: &mut StdRng);

    /// Current discard rate, for policies that evict in batches
    fn discard_rate(&self) -> Option<f64> {
        None
    }

    /// History of completed eviction rounds, oldest first
    fn round_reports(&self) -> Vec<RoundReport> {
        Vec::new()
    }
}

/// Turns one triangle observation into its inverse-probability weight
pub trait WeightingPolicy: Send + Sync {
    fn name(&self) -> &'static str;

    fn weight(&self, first: &EdgeStamp, second: &EdgeStamp, ctx: &SampleContext<'_>) -> f64;
}
