//! Round-batched eviction
//!
//! The reservoir fills with the first `k` edges at probability 1 (round 1).
//! Whenever it is full and another edge arrives, one batch-eviction episode
//! frees `N = floor(k·alpha)` uniformly random slots and opens the next
//! round. Freed slots are refilled by later edges, each admitted with the
//! round's sampling probability, until the reservoir is full again.

use super::schedule::{DiscardSchedule, RoundStats};
use crate::graph::{Edge, Round, SampledGraph, SlotId};
use crate::policy::{EdgeStamp, EvictionPolicy, SampleContext};
use crate::sampling::{SubsetStrategy, SurvivalCache};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, info, trace};

/// Round reports kept for diagnostics
const MAX_ROUND_REPORTS: usize = 1024;

/// How the post-eviction admission probability evolves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionRate {
    /// `p ← p·(1 − alpha)` at every episode
    #[default]
    Decaying,
    /// `p = k/t`, recomputed for every edge
    Turnover,
}

/// Summary of one completed eviction episode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundReport {
    /// Round closed by the episode
    pub round: Round,
    /// Discard rate applied by the episode
    pub alpha: f64,
    /// Slots freed
    pub evicted: usize,
    /// Triangles detected during the closed round
    pub triangles: u64,
    /// Mean discovery interval of those triangles
    pub mean_interval: Option<f64>,
    /// Admission probability for the new round
    pub sampling_probability: f64,
    /// Global estimate when the round closed
    pub global: f64,
    /// Growth of the global estimate during the round
    pub increment: f64,
}

#[derive(Debug, Clone)]
pub struct RoundBatched<D> {
    capacity: usize,
    schedule: D,
    admission: AdmissionRate,
    /// Slots filled during the initial round
    filled: usize,
    /// Slots freed by the last episode and not yet refilled
    free_slots: Vec<SlotId>,
    alpha: f64,
    probability: f64,
    survival: SurvivalCache,
    stats: RoundStats,
    /// Running global estimate, as reported by the engine
    global: f64,
    /// Global estimate at the last closed round
    reported_global: f64,
    reports: VecDeque<RoundReport>,
}

impl<D: DiscardSchedule> RoundBatched<D> {
    pub fn new(capacity: usize, schedule: D, admission: AdmissionRate) -> Self {
        let alpha = schedule.initial_rate();
        Self {
            capacity,
            schedule,
            admission,
            filled: 0,
            free_slots: Vec::new(),
            alpha,
            probability: 1.0,
            survival: SurvivalCache::new(),
            stats: RoundStats::default(),
            global: 0.0,
            reported_global: 0.0,
            reports: VecDeque::new(),
        }
    }

    pub fn round(&self) -> Round {
        self.survival.current_round()
    }

    pub fn survival(&self) -> &SurvivalCache {
        &self.survival
    }

    /// Slots freed by the last episode that are still empty
    pub fn free_slots(&self) -> usize {
        self.free_slots.len()
    }

    fn admission_probability(&self, edges_seen: u64) -> f64 {
        match self.admission {
            AdmissionRate::Decaying => self.probability,
            AdmissionRate::Turnover => (self.capacity as f64 / edges_seen.max(1) as f64).min(1.0),
        }
    }

    /// Run one batch-eviction episode.
    ///
    /// When the rate frees no slot the reservoir stays as it is. A fixed
    /// schedule then stays in its round; an adaptive one still closes the
    /// round with survival rate 1 so its warm-up can end.
    fn run_episode(&mut self, graph: &mut SampledGraph, rng: &mut StdRng) {
        let closing = self.round();
        let alpha = self.schedule.next_rate(closing, &self.stats);
        let evict = (self.capacity as f64 * alpha).floor() as usize;
        self.alpha = alpha;

        if evict == 0 {
            if !self.schedule.closes_empty_rounds() {
                debug!(
                    "Round {}: discard rate {:.4} frees no slot of {}, skipping eviction",
                    closing, alpha, self.capacity
                );
                return;
            }
            trace!(
                "Round {}: discard rate {:.4} frees no slot of {}, closing round empty",
                closing, alpha, self.capacity
            );
            self.survival.advance(1.0);
            self.close_round(closing, 0);
            return;
        }

        self.survival.advance(1.0 - alpha);
        if self.admission == AdmissionRate::Decaying {
            self.probability *= 1.0 - alpha;
        }

        let strategy = SubsetStrategy::for_rate(alpha);
        let slots: Vec<SlotId> = strategy
            .choose(self.capacity, evict, rng)
            .into_iter()
            .map(SlotId::new)
            .collect();
        match strategy {
            SubsetStrategy::Rejection => {
                for &slot in &slots {
                    graph.evict(slot);
                }
            }
            SubsetStrategy::Shuffle => graph.evict_and_rebuild(&slots),
        }
        self.free_slots = slots;
        self.close_round(closing, evict);
    }

    fn close_round(&mut self, closing: Round, evicted: usize) {
        let report = RoundReport {
            round: closing,
            alpha: self.alpha,
            evicted,
            triangles: self.stats.triangles,
            mean_interval: self.stats.mean_interval(),
            sampling_probability: self.probability,
            global: self.global,
            increment: self.global - self.reported_global,
        };
        self.reported_global = self.global;
        if evicted > 0 {
            debug!(
                "Round {} closed: alpha {:.4}, evicted {}, triangles {}, estimate {:.4} (+{:.4})",
                report.round,
                report.alpha,
                report.evicted,
                report.triangles,
                report.global,
                report.increment
            );
        }
        if self.reports.len() == MAX_ROUND_REPORTS {
            self.reports.pop_front();
        }
        self.reports.push_back(report);
        self.stats = RoundStats::default();
    }
}

impl<D: DiscardSchedule> EvictionPolicy for RoundBatched<D> {
    fn name(&self) -> &'static str {
        self.schedule.name()
    }

    fn context(&self, edges_seen: u64) -> SampleContext<'_> {
        SampleContext {
            edges_seen,
            capacity: self.capacity,
            round: self.round(),
            sampling_probability: self.admission_probability(edges_seen),
            survival: Some(&self.survival),
            reservoir_arrivals: edges_seen,
        }
    }

    fn observe_triangle(&mut self, first: &EdgeStamp, second: &EdgeStamp) {
        let current = self.round();
        self.stats.record(current, first.round, second.round);
    }

    fn observe_estimate(&mut self, global: f64) {
        self.global = global;
    }

    fn admit(&mut self, edge: Edge, edges_seen: u64, graph: &mut SampledGraph, rng: &mut StdRng) {
        if self.filled < self.capacity {
            graph.admit(SlotId::new(self.filled), edge, 1.0, 1);
            self.filled += 1;
            if self.filled == self.capacity {
                info!(
                    "Reservoir full after {} edges, batch eviction at rate {:.4} starts",
                    edges_seen, self.alpha
                );
            }
            return;
        }

        if self.free_slots.is_empty() {
            self.run_episode(graph, rng);
        }
        if self.free_slots.is_empty() {
            return;
        }

        let probability = self.admission_probability(edges_seen);
        if rng.gen::<f64>() < probability {
            if let Some(slot) = self.free_slots.pop() {
                let round = self.round();
                graph.admit(slot, edge, probability, round);
            }
        }
    }

    fn discard_rate(&self) -> Option<f64> {
        Some(self.alpha)
    }

    fn round_reports(&self) -> Vec<RoundReport> {
        self.reports.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::eviction::schedule::{AdaptiveRate, FixedRate};
    use rand::SeedableRng;

    fn feed<D: DiscardSchedule>(
        policy: &mut RoundBatched<D>,
        graph: &mut SampledGraph,
        rng: &mut StdRng,
        edges: u64,
    ) {
        for t in 1..=edges {
            policy.admit(Edge::new(t, t + 1_000_000).unwrap(), t, graph, rng);
            assert!(graph.reservoir().len() <= graph.capacity());
        }
    }

    #[test]
    fn test_first_episode_frees_floor_k_alpha() {
        let mut graph = SampledGraph::with_capacity(10);
        let mut policy = RoundBatched::new(10, FixedRate::new(0.3), AdmissionRate::Decaying);
        let mut rng = StdRng::seed_from_u64(1);

        feed(&mut policy, &mut graph, &mut rng, 10);
        assert!(graph.reservoir().is_full());
        assert_eq!(policy.round(), 1);

        // edge 11 triggers the episode
        policy.admit(Edge::new(11, 12).unwrap(), 11, &mut graph, &mut rng);
        assert_eq!(policy.round(), 2);
        let freed = policy.free_slots();
        let occupied = graph.reservoir().len();
        assert!((freed == 3 && occupied == 7) || (freed == 2 && occupied == 8));
        assert!((policy.probability - 0.7).abs() < 1e-12);
        assert_eq!(policy.round_reports().len(), 1);
        assert_eq!(policy.round_reports()[0].evicted, 3);
    }

    #[test]
    fn test_shuffle_path_keeps_index_consistent() {
        let mut graph = SampledGraph::with_capacity(20);
        let mut policy = RoundBatched::new(20, FixedRate::new(0.8), AdmissionRate::Turnover);
        let mut rng = StdRng::seed_from_u64(2);

        feed(&mut policy, &mut graph, &mut rng, 500);
        assert!(policy.round() > 1);
        assert_eq!(graph.sampled_edges(), graph.reservoir().len());
        assert!(graph.adjacency().is_symmetric());
        for (slot, sampled) in graph.reservoir().iter_occupied() {
            assert_eq!(
                graph.adjacency().slot_of(sampled.edge.src, sampled.edge.dst),
                Some(crate::graph::SlotRef::Reservoir(slot))
            );
            assert!(sampled.round <= policy.round());
        }
    }

    #[test]
    fn test_zero_discard_rate_freezes_reservoir() {
        let mut graph = SampledGraph::with_capacity(5);
        let mut policy = RoundBatched::new(5, FixedRate::new(0.0), AdmissionRate::Decaying);
        let mut rng = StdRng::seed_from_u64(3);

        feed(&mut policy, &mut graph, &mut rng, 50);
        assert_eq!(policy.round(), 1);
        assert!(graph.reservoir().is_full());
        assert!(graph.adjacency().contains_vertex(1));
        assert!(!graph.adjacency().contains_vertex(50));
    }

    #[test]
    fn test_adaptive_closes_rounds_that_free_no_slot() {
        // floor(9 · 0.1) = 0 slots per episode
        let mut graph = SampledGraph::with_capacity(9);
        let mut policy = RoundBatched::new(9, AdaptiveRate::new(0.5, 5, 0.1), AdmissionRate::Decaying);
        let mut rng = StdRng::seed_from_u64(6);

        feed(&mut policy, &mut graph, &mut rng, 30);
        assert!(policy.round() > 5, "round {}", policy.round());
        assert!(graph.reservoir().is_full());
        assert_eq!(policy.free_slots(), 0);
        // nothing was evicted, so nothing decays
        assert_eq!(policy.probability, 1.0);
        assert_eq!(policy.survival().survival_since(1), 1.0);

        let reports = policy.round_reports();
        assert_eq!(reports.len() as u32, policy.round() - 1);
        assert!(reports.iter().all(|r| r.evicted == 0));
    }

    #[test]
    fn test_reports_carry_estimate_growth() {
        let mut graph = SampledGraph::with_capacity(4);
        let mut policy = RoundBatched::new(4, FixedRate::new(0.5), AdmissionRate::Decaying);
        let mut rng = StdRng::seed_from_u64(7);

        feed(&mut policy, &mut graph, &mut rng, 4);
        policy.observe_estimate(3.0);
        policy.admit(Edge::new(90, 91).unwrap(), 5, &mut graph, &mut rng);
        assert_eq!(policy.round_reports().len(), 1);
        policy.observe_estimate(7.5);
        let mut t = 6;
        while policy.round_reports().len() < 2 {
            policy.admit(Edge::new(t, t + 1_000_000).unwrap(), t, &mut graph, &mut rng);
            t += 1;
        }

        let reports = policy.round_reports();
        assert_eq!(reports[0].global, 3.0);
        assert_eq!(reports[0].increment, 3.0);
        assert_eq!(reports[1].global, 7.5);
        assert_eq!(reports[1].increment, 4.5);
    }

    #[test]
    fn test_decaying_probability_tracks_survival() {
        let mut graph = SampledGraph::with_capacity(100);
        let mut policy = RoundBatched::new(100, FixedRate::new(0.2), AdmissionRate::Decaying);
        let mut rng = StdRng::seed_from_u64(4);

        feed(&mut policy, &mut graph, &mut rng, 5_000);
        let round = policy.round();
        assert!(round > 2);
        // p = (1 - alpha)^(round - 1) = survival of a round-1 edge
        let expected = 0.8f64.powi(round as i32 - 1);
        assert!((policy.probability - expected).abs() < 1e-9);
        assert!((policy.survival().survival_since(1) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_adaptive_rate_stays_in_bounds() {
        let mut graph = SampledGraph::with_capacity(50);
        let mut policy = RoundBatched::new(50, AdaptiveRate::new(0.3, 2, 0.1), AdmissionRate::Decaying);
        let mut rng = StdRng::seed_from_u64(5);

        for t in 1..=2_000u64 {
            // a few synthetic triangle observations per edge
            let stamp = EdgeStamp::certain(1);
            policy.observe_triangle(&stamp, &stamp);
            policy.admit(Edge::new(t, t + 7).unwrap(), t, &mut graph, &mut rng);
            let alpha = policy.discard_rate().unwrap();
            assert!(alpha >= 0.1 && alpha < 1.0, "alpha {}", alpha);
        }
        assert!(policy.round() > 3);
    }
}
