//! Tristream
//!
//! Fixed-memory triangle estimation over edge streams.
//!
//! A graph arrives one edge at a time. Tristream keeps a sample of at most
//! `k` edges, detects the triangles each new edge closes against that
//! sample, and weights every detection by the inverse probability that its
//! two older edges survived in the sample. The sums are unbiased estimates
//! of the global triangle count and of every vertex's local count.
//!
//! # Sampling schemes
//!
//! - Bernoulli: every edge kept with a fixed probability
//! - Reservoir: classic reservoir sampling, admission probability `k/t`
//! - Round-batched: when the reservoir is full, `floor(k·alpha)` random
//!   slots are freed at once and a new round begins
//! - Adaptive: round-batched with `alpha` driven by how far apart in rounds
//!   recent triangles were sampled
//! - Waiting room: the newest edges are always kept in a FIFO in front of
//!   the reservoir
//!
//! ## Example Usage
//!
//! ```rust
//! use tristream::{build_estimator, EstimatorConfig, SamplingScheme};
//!
//! let config = EstimatorConfig::new(1_000, SamplingScheme::Reservoir).with_seed(7);
//! let mut estimator = build_estimator(&config).unwrap();
//!
//! for (u, v) in [(1, 2), (2, 3), (1, 3)] {
//!     estimator.process_edge(u, v);
//! }
//!
//! assert_eq!(estimator.global_estimate(), 1.0);
//! assert_eq!(estimator.local_estimate(2), 1.0);
//! ```

#![warn(clippy::all)]

pub mod algo;
pub mod estimator;
pub mod graph;
pub mod io;
pub mod policy;
pub mod sampling;

// Re-export main types
pub use algo::{AccuracyReport, LocalCounts};
pub use estimator::{
    build_estimator, ConfigError, EstimateSnapshot, EstimatorConfig, RoundWeighting,
    SamplingScheme, StreamingEstimator, TriangleEstimator,
};
pub use graph::{Edge, Round, VertexId};
pub use io::{EdgeReader, EdgeReaderOptions, IoError};
pub use policy::{AdmissionRate, EvictionPolicy, RoundReport, WeightingPolicy};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
