//! Accuracy metrics against ground-truth triangle counts
//!
//! Both sides are plain `vertex → count` maps; a vertex missing from one
//! side counts as zero there.

use crate::graph::VertexId;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

/// Per-vertex triangle counts
pub type LocalCounts = FxHashMap<VertexId, f64>;

/// Accuracy of an estimate compared with exact counts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccuracyReport {
    /// Vertices in the union of both key sets
    pub vertices: usize,
    /// Local average of `|estimate − truth| / (truth + 1)`
    pub lape: f64,
    pub global_estimate: f64,
    pub global_truth: f64,
    /// `|estimate − truth| / truth`, or the absolute error when the truth is zero
    pub global_relative_error: f64,
}

/// Mean local absolute percentage error over the union of vertices
pub fn local_error(estimates: &LocalCounts, truth: &LocalCounts) -> f64 {
    let vertices: FxHashSet<VertexId> = estimates.keys().chain(truth.keys()).copied().collect();
    if vertices.is_empty() {
        return 0.0;
    }
    let total: f64 = vertices
        .iter()
        .map(|v| {
            let estimate = estimates.get(v).copied().unwrap_or(0.0);
            let exact = truth.get(v).copied().unwrap_or(0.0);
            (estimate - exact).abs() / (exact + 1.0)
        })
        .sum();
    total / vertices.len() as f64
}

/// Global count implied by local counts; every triangle touches three vertices
pub fn global_from_local(counts: &LocalCounts) -> f64 {
    counts.values().sum::<f64>() / 3.0
}

pub fn relative_error(estimate: f64, truth: f64) -> f64 {
    if truth == 0.0 {
        estimate.abs()
    } else {
        (estimate - truth).abs() / truth
    }
}

/// Compare an estimator's output with ground truth
pub fn evaluate(global_estimate: f64, estimates: &LocalCounts, truth: &LocalCounts) -> AccuracyReport {
    let vertices = estimates
        .keys()
        .chain(truth.keys())
        .collect::<FxHashSet<_>>()
        .len();
    let global_truth = global_from_local(truth);
    AccuracyReport {
        vertices,
        lape: local_error(estimates, truth),
        global_estimate,
        global_truth,
        global_relative_error: relative_error(global_estimate, global_truth),
    }
}
