//! Triangle estimators
//!
//! `StreamingEstimator` is the single engine, parameterised by an eviction
//! policy and a weighting policy. `TriangleEstimator` is its object-safe
//! facade, and `build_estimator` maps an `EstimatorConfig` onto a boxed
//! engine.

pub mod config;
pub mod engine;

use crate::algo::LocalCounts;
use crate::graph::{Round, VertexId};
use crate::policy::RoundReport;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// Re-export main types
pub use config::{
    build_estimator, ConfigError, ConfigResult, EstimatorConfig, RoundWeighting, SamplingScheme,
};
pub use engine::StreamingEstimator;

/// Point-in-time copy of an estimator's output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateSnapshot {
    pub scheme: String,
    pub global: f64,
    pub discovered_triangles: u64,
    pub edges_processed: u64,
    pub sampled_edges: usize,
    pub round: Round,
    pub discard_rate: Option<f64>,
    /// Local estimates ordered by vertex id
    pub local: BTreeMap<VertexId, f64>,
}

/// Streaming triangle estimator over a fixed edge budget
pub trait TriangleEstimator: Send {
    /// Consume one stream edge. Self-loops are ignored.
    fn process_edge(&mut self, u: VertexId, v: VertexId);

    /// Estimated number of triangles in the stream so far
    fn global_estimate(&self) -> f64;

    /// Estimated triangles incident to `vertex`, 0.0 if it never appeared
    fn local_estimate(&self, vertex: VertexId) -> f64;

    fn local_estimates(&self) -> &LocalCounts;

    /// Triangles detected in the sample, unweighted
    fn discovered_triangles(&self) -> u64;

    /// Edges consumed, self-loops excluded
    fn edges_processed(&self) -> u64;

    /// Edges currently held in memory
    fn sampled_edges(&self) -> usize;

    fn round(&self) -> Round;

    fn discard_rate(&self) -> Option<f64>;

    /// Largest vertex id seen so far
    fn max_vertex(&self) -> Option<VertexId>;

    fn scheme_name(&self) -> &'static str;

    fn round_reports(&self) -> Vec<RoundReport>;

    fn snapshot(&self) -> EstimateSnapshot {
        EstimateSnapshot {
            scheme: self.scheme_name().to_string(),
            global: self.global_estimate(),
            discovered_triangles: self.discovered_triangles(),
            edges_processed: self.edges_processed(),
            sampled_edges: self.sampled_edges(),
            round: self.round(),
            discard_rate: self.discard_rate(),
            local: self
                .local_estimates()
                .iter()
                .map(|(&v, &count)| (v, count))
                .collect(),
        }
    }

    /// Feed every pair of `edges` through `process_edge`
    fn process_stream(&mut self, edges: &mut dyn Iterator<Item = (VertexId, VertexId)>) {
        for (u, v) in edges {
            self.process_edge(u, v);
        }
    }
}
