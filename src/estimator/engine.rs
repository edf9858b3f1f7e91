//! The streaming estimation engine

use super::TriangleEstimator;
use crate::algo::{detect_triangles, LocalCounts, TriangleObservation};
use crate::graph::{Edge, Round, SampledGraph, VertexId};
use crate::policy::{EvictionPolicy, RoundReport, WeightingPolicy};
use rand::rngs::StdRng;
use tracing::trace;

/// Triangle estimator built from an eviction policy and a weighting policy.
///
/// For every edge the engine first detects the triangles it closes in the
/// current sample, weights them, and only then hands the edge to the
/// eviction policy for admission.
pub struct StreamingEstimator<E, W> {
    graph: SampledGraph,
    eviction: E,
    weighting: W,
    rng: StdRng,
    local: LocalCounts,
    global: f64,
    discovered: u64,
    edges_processed: u64,
    max_vertex: Option<VertexId>,
    /// Reused between edges to avoid reallocating per edge
    observations: Vec<TriangleObservation>,
}

impl<E: EvictionPolicy, W: WeightingPolicy> StreamingEstimator<E, W> {
    /// Create an engine whose reservoir holds `capacity` slots
    pub fn new(capacity: usize, eviction: E, weighting: W, rng: StdRng) -> Self {
        Self {
            graph: SampledGraph::with_capacity(capacity),
            eviction,
            weighting,
            rng,
            local: LocalCounts::default(),
            global: 0.0,
            discovered: 0,
            edges_processed: 0,
            max_vertex: None,
            observations: Vec::new(),
        }
    }

    pub fn graph(&self) -> &SampledGraph {
        &self.graph
    }

    pub fn policy(&self) -> &E {
        &self.eviction
    }

    pub fn weighting(&self) -> &W {
        &self.weighting
    }

    fn note_vertex(&mut self, vertex: VertexId) {
        self.local.entry(vertex).or_insert(0.0);
        self.max_vertex = Some(self.max_vertex.map_or(vertex, |max| max.max(vertex)));
    }

    /// Weight every observation and credit the apexes. Returns the weight sum.
    fn credit_triangles(&mut self, edges_seen: u64) -> f64 {
        let ctx = self.eviction.context(edges_seen);
        let mut total = 0.0;
        for observation in &self.observations {
            let weight = self.weighting.weight(&observation.first, &observation.second, &ctx);
            *self.local.entry(observation.apex).or_insert(0.0) += weight;
            total += weight;
        }
        total
    }
}

impl<E: EvictionPolicy, W: WeightingPolicy> TriangleEstimator for StreamingEstimator<E, W> {
    fn process_edge(&mut self, u: VertexId, v: VertexId) {
        let Some(edge) = Edge::new(u, v) else {
            trace!("Skipping self-loop on vertex {}", u);
            return;
        };
        self.edges_processed += 1;
        let t = self.edges_processed;
        self.note_vertex(u);
        self.note_vertex(v);

        let current = self.eviction.context(t).round;
        let found = detect_triangles(&self.graph, edge, current, &mut self.observations);
        if found > 0 {
            let total = self.credit_triangles(t);
            if let Some(count) = self.local.get_mut(&u) {
                *count += total;
            }
            if let Some(count) = self.local.get_mut(&v) {
                *count += total;
            }
            self.global += total;
            self.discovered += found as u64;
            for observation in &self.observations {
                self.eviction
                    .observe_triangle(&observation.first, &observation.second);
            }
            self.eviction.observe_estimate(self.global);
        }

        self.eviction.admit(edge, t, &mut self.graph, &mut self.rng);
    }

    fn global_estimate(&self) -> f64 {
        self.global
    }

    fn local_estimate(&self, vertex: VertexId) -> f64 {
        self.local.get(&vertex).copied().unwrap_or(0.0)
    }

    fn local_estimates(&self) -> &LocalCounts {
        &self.local
    }

    fn discovered_triangles(&self) -> u64 {
        self.discovered
    }

    fn edges_processed(&self) -> u64 {
        self.edges_processed
    }

    fn sampled_edges(&self) -> usize {
        self.graph.sampled_edges()
    }

    fn round(&self) -> Round {
        self.eviction.context(self.edges_processed).round
    }

    fn discard_rate(&self) -> Option<f64> {
        self.eviction.discard_rate()
    }

    fn max_vertex(&self) -> Option<VertexId> {
        self.max_vertex
    }

    fn scheme_name(&self) -> &'static str {
        self.eviction.name()
    }

    fn round_reports(&self) -> Vec<RoundReport> {
        self.eviction.round_reports()
    }
}
