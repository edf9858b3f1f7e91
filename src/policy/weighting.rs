//! Inverse-probability weights for detected triangles
//!
//! A triangle closed by the current edge is observed only if both of its
//! older edges are in the sample. Each policy returns the reciprocal of
//! that joint probability under the matching eviction scheme.

use super::{EdgeStamp, SampleContext, WeightingPolicy};

/// Every sampled edge shares the same inclusion probability `p`: weight `1/p²`
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformWeight;

impl WeightingPolicy for UniformWeight {
    fn name(&self) -> &'static str {
        "uniform"
    }

    fn weight(&self, _first: &EdgeStamp, _second: &EdgeStamp, ctx: &SampleContext<'_>) -> f64 {
        let p = ctx.sampling_probability;
        1.0 / (p * p)
    }
}

/// Classic reservoir of size `k` after `t` edges: both prior edges are
/// present with probability `(k/t)·((k-1)/(t-1))`
#[derive(Debug, Clone, Copy, Default)]
pub struct TurnoverWeight;

impl WeightingPolicy for TurnoverWeight {
    fn name(&self) -> &'static str {
        "reservoir_turnover"
    }

    fn weight(&self, _first: &EdgeStamp, _second: &EdgeStamp, ctx: &SampleContext<'_>) -> f64 {
        let t = ctx.edges_seen as f64;
        let k = ctx.capacity as f64;
        if t <= k {
            return 1.0;
        }
        1.0 / ((k / t) * ((k - 1.0) / (t - 1.0)))
    }
}

/// Per-edge bookkeeping: admission probability times survival since the
/// admission round, for each of the two edges
#[derive(Debug, Clone, Copy, Default)]
pub struct ProbabilityRoundWeight;

impl ProbabilityRoundWeight {
    fn presence(stamp: &EdgeStamp, ctx: &SampleContext<'_>) -> f64 {
        let survival = ctx
            .survival
            .map_or(1.0, |cache| cache.survival_since(stamp.round));
        stamp.probability * survival
    }
}

impl WeightingPolicy for ProbabilityRoundWeight {
    fn name(&self) -> &'static str {
        "probability_round"
    }

    fn weight(&self, first: &EdgeStamp, second: &EdgeStamp, ctx: &SampleContext<'_>) -> f64 {
        1.0 / (Self::presence(first, ctx) * Self::presence(second, ctx))
    }
}

/// Waiting-room sampling: staged edges are always present, reservoir edges
/// are subject to turnover
#[derive(Debug, Clone, Copy, Default)]
pub struct WaitingRoomWeight;

impl WeightingPolicy for WaitingRoomWeight {
    fn name(&self) -> &'static str {
        "waiting_room"
    }

    fn weight(&self, first: &EdgeStamp, second: &EdgeStamp, ctx: &SampleContext<'_>) -> f64 {
        let arrivals = ctx.reservoir_arrivals as f64;
        let size = ctx.capacity as f64;
        match (first.staged, second.staged) {
            (true, true) => 1.0,
            (false, false) => ((arrivals / size) * ((arrivals - 1.0) / (size - 1.0))).max(1.0),
            _ => (arrivals / size).max(1.0),
        }
    }
}
