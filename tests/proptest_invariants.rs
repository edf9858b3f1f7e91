use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use tristream::graph::{SampledGraph, SlotRef};
use tristream::policy::{
    AdaptiveRate, AdmissionRate, BernoulliSampling, ClassicReservoir, EvictionPolicy, FixedRate,
    ProbabilityRoundWeight, RoundBatched, TurnoverWeight, UniformWeight, WaitingRoomSampling,
    WaitingRoomWeight, WeightingPolicy,
};
use tristream::sampling::{choose_random_subset, SurvivalCache};
use tristream::{StreamingEstimator, TriangleEstimator};

/// Every index entry is symmetric and points at a slot that holds the edge
fn assert_consistent(graph: &SampledGraph) {
    let adjacency = graph.adjacency();
    assert!(adjacency.is_symmetric());
    assert!(graph.reservoir().len() <= graph.capacity());
    for (&u, neighbors) in adjacency.iter() {
        assert!(!neighbors.is_empty(), "vertex {} kept without neighbors", u);
        for (&v, slot) in neighbors {
            assert_ne!(u, v);
            if let SlotRef::Reservoir(id) = slot {
                let sampled = graph
                    .reservoir()
                    .slot_at(*id)
                    .expect("index points at an empty slot");
                assert_eq!(sampled.edge.canonical(), (u.min(v), u.max(v)));
            }
        }
    }
}

fn drive<E, W>(
    mut est: StreamingEstimator<E, W>,
    edges: &[(u64, u64)],
    budget: usize,
) -> StreamingEstimator<E, W>
where
    E: EvictionPolicy,
    W: WeightingPolicy,
{
    let mut global = 0.0;
    for &(u, v) in edges {
        est.process_edge(u, v);
        assert!(est.sampled_edges() <= budget);
        assert!(est.global_estimate() >= global);
        global = est.global_estimate();
    }
    assert_consistent(est.graph());
    est
}

fn stream() -> impl Strategy<Value = Vec<(u64, u64)>> {
    prop::collection::vec((0u64..40, 0u64..40), 0..400)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_subset_is_distinct_and_in_range(universe in 1usize..500, rate in 0.0f64..1.0, seed: u64) {
        let size = (universe as f64 * rate).floor() as usize;
        let mut rng = StdRng::seed_from_u64(seed);
        let chosen = choose_random_subset(universe, size, &mut rng);
        prop_assert_eq!(chosen.len(), size);
        let distinct: HashSet<_> = chosen.iter().copied().collect();
        prop_assert_eq!(distinct.len(), size);
        prop_assert!(chosen.iter().all(|&i| i < universe));
    }

    #[test]
    fn prop_survival_is_product_of_rates(rates in prop::collection::vec(0.01f64..1.0, 1..20)) {
        let mut cache = SurvivalCache::new();
        for &rate in &rates {
            cache.advance(rate);
        }
        let current = cache.current_round();
        prop_assert_eq!(current as usize, rates.len() + 1);
        prop_assert_eq!(cache.survival_since(current), 1.0);
        for since in 1..current {
            let expected: f64 = rates[since as usize - 1..].iter().product();
            prop_assert!((cache.survival_since(since) - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn prop_reservoir_invariants(edges in stream(), k in 2usize..30, seed: u64) {
        let est = StreamingEstimator::new(k, ClassicReservoir::new(k), TurnoverWeight, StdRng::seed_from_u64(seed));
        drive(est, &edges, k);
    }

    #[test]
    fn prop_bernoulli_invariants(edges in stream(), k in 2usize..30, p in 0.05f64..1.0, seed: u64) {
        let est = StreamingEstimator::new(k, BernoulliSampling::new(p, k), UniformWeight, StdRng::seed_from_u64(seed));
        drive(est, &edges, k);
    }

    #[test]
    fn prop_round_batched_invariants(
        edges in stream(),
        k in 2usize..30,
        alpha in 0.0f64..0.95,
        turnover: bool,
        seed: u64,
    ) {
        let admission = if turnover { AdmissionRate::Turnover } else { AdmissionRate::Decaying };
        let policy = RoundBatched::new(k, FixedRate::new(alpha), admission);
        let est = StreamingEstimator::new(k, policy, ProbabilityRoundWeight, StdRng::seed_from_u64(seed));
        let est = drive(est, &edges, k);
        for (_, sampled) in est.graph().reservoir().iter_occupied() {
            prop_assert!(sampled.round <= est.round());
            prop_assert!(sampled.probability > 0.0 && sampled.probability <= 1.0);
        }
    }

    #[test]
    fn prop_adaptive_alpha_bounds(
        edges in stream(),
        k in 2usize..30,
        z in 0.05f64..0.95,
        init_alpha in 0.0f64..0.5,
        seed: u64,
    ) {
        let policy = RoundBatched::new(k, AdaptiveRate::new(z, 1, init_alpha), AdmissionRate::Decaying);
        let est = StreamingEstimator::new(k, policy, ProbabilityRoundWeight, StdRng::seed_from_u64(seed));
        let est = drive(est, &edges, k);
        let alpha = est.discard_rate().unwrap();
        prop_assert!(alpha >= init_alpha && alpha < 1.0);
        for report in est.round_reports() {
            prop_assert!(report.alpha >= init_alpha && report.alpha < 1.0);
        }
    }

    #[test]
    fn prop_waiting_room_invariants(edges in stream(), k in 4usize..30, alpha_wr in 0.0f64..0.5, seed: u64) {
        let policy = WaitingRoomSampling::new(k, alpha_wr);
        let reservoir = policy.reservoir_capacity();
        let est = StreamingEstimator::new(reservoir, policy, WaitingRoomWeight, StdRng::seed_from_u64(seed));
        let est = drive(est, &edges, k);
        prop_assert!(est.policy().waiting_room().len() <= WaitingRoomSampling::room_size(k, alpha_wr));
    }
}
