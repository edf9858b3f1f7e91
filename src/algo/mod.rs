//! Triangle algorithms
//!
//! - `triangles`: common-neighbor detection against the sampled graph
//! - `accuracy`: comparison of estimated and exact per-vertex counts

pub mod accuracy;
pub mod triangles;

// Re-export main types
pub use accuracy::{evaluate, global_from_local, local_error, AccuracyReport, LocalCounts};
pub use triangles::{detect_triangles, resolve_stamp, TriangleObservation};
