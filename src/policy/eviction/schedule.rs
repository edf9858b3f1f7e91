//! Discard-rate schedules for round-batched eviction

use crate::graph::Round;
use serde::{Deserialize, Serialize};

/// Upper bound on any adaptive discard rate. Keeps at least one slot out of
/// every ten thousand and keeps `1 - alpha` strictly positive.
pub const MAX_DISCARD_RATE: f64 = 0.9999;

/// Triangle statistics collected between two eviction episodes
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundStats {
    /// Triangles detected during the round
    pub triangles: u64,
    /// Sum over those triangles of `2·round − round₁ − round₂`
    pub interval_sum: f64,
}

impl RoundStats {
    pub fn record(&mut self, current: Round, first: Round, second: Round) {
        self.triangles += 1;
        self.interval_sum += 2.0 * current as f64 - first as f64 - second as f64;
    }

    /// Mean triangle discovery interval, undefined when no triangle was seen
    pub fn mean_interval(&self) -> Option<f64> {
        if self.triangles == 0 {
            None
        } else {
            Some(self.interval_sum / self.triangles as f64)
        }
    }
}

/// Supplies the discard rate of each batch-eviction episode
pub trait DiscardSchedule: Send {
    fn name(&self) -> &'static str;

    /// Rate in effect before the first episode
    fn initial_rate(&self) -> f64;

    /// Rate for the episode that closes `closing_round`
    fn next_rate(&mut self, closing_round: Round, stats: &RoundStats) -> f64;

    /// Whether an episode that frees no slot still closes its round.
    ///
    /// Schedules that read the round counter need this to get past their
    /// warm-up rounds when `floor(k·alpha)` is zero.
    fn closes_empty_rounds(&self) -> bool {
        false
    }
}

/// The same discard rate every round
#[derive(Debug, Clone, Copy)]
pub struct FixedRate {
    alpha: f64,
}

impl FixedRate {
    pub fn new(alpha: f64) -> Self {
        Self { alpha }
    }
}

impl DiscardSchedule for FixedRate {
    fn name(&self) -> &'static str {
        "round_batched"
    }

    fn initial_rate(&self) -> f64 {
        self.alpha
    }

    fn next_rate(&mut self, _closing_round: Round, _stats: &RoundStats) -> f64 {
        self.alpha
    }
}

/// Discard rate driven by how far apart in rounds the two prior edges of
/// recently detected triangles were sampled.
///
/// Dense triangle discovery (short intervals) yields aggressive eviction,
/// sparse discovery a conservative one. `init_alpha` is used for the first
/// `round_bound` rounds and is the floor afterwards.
#[derive(Debug, Clone, Copy)]
pub struct AdaptiveRate {
    z: f64,
    round_bound: Round,
    init_alpha: f64,
}

impl AdaptiveRate {
    pub fn new(z: f64, round_bound: Round, init_alpha: f64) -> Self {
        Self {
            z,
            round_bound,
            init_alpha,
        }
    }

    /// `1 − z^(1/mean)`, rounded to four decimals
    pub fn rate_for_interval(&self, mean_interval: f64) -> f64 {
        let retained = self.z.powf(1.0 / mean_interval);
        ((1.0 - retained) * 10_000.0).round() / 10_000.0
    }

    fn clamp(&self, alpha: f64) -> f64 {
        if !alpha.is_finite() {
            return self.init_alpha;
        }
        alpha.max(self.init_alpha).min(MAX_DISCARD_RATE)
    }
}

impl DiscardSchedule for AdaptiveRate {
    fn name(&self) -> &'static str {
        "adaptive"
    }

    fn initial_rate(&self) -> f64 {
        self.init_alpha
    }

    fn closes_empty_rounds(&self) -> bool {
        true
    }

    fn next_rate(&mut self, closing_round: Round, stats: &RoundStats) -> f64 {
        if closing_round <= self.round_bound {
            return self.init_alpha;
        }
        match stats.mean_interval() {
            Some(mean) => self.clamp(self.rate_for_interval(mean)),
            None => self.init_alpha,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(triangles: u64, interval_sum: f64) -> RoundStats {
        RoundStats {
            triangles,
            interval_sum,
        }
    }

    #[test]
    fn test_round_stats_interval() {
        let mut s = RoundStats::default();
        assert_eq!(s.mean_interval(), None);
        s.record(5, 4, 3);
        s.record(5, 5, 5);
        assert_eq!(s.triangles, 2);
        assert_eq!(s.mean_interval(), Some(1.5));
    }

    #[test]
    fn test_fixed_rate() {
        let mut f = FixedRate::new(0.3);
        assert_eq!(f.initial_rate(), 0.3);
        assert_eq!(f.next_rate(9, &stats(10, 3.0)), 0.3);
    }

    #[test]
    fn test_adaptive_uses_init_alpha_during_warmup() {
        let mut a = AdaptiveRate::new(0.5, 3, 0.1);
        assert_eq!(a.next_rate(1, &stats(10, 1.0)), 0.1);
        assert_eq!(a.next_rate(3, &stats(10, 1.0)), 0.1);
    }

    #[test]
    fn test_adaptive_rate_formula() {
        let mut a = AdaptiveRate::new(0.5, 0, 0.01);
        // mean interval 2: 1 - 0.5^(1/2) = 0.29289... -> 0.2929
        assert_eq!(a.next_rate(4, &stats(4, 8.0)), 0.2929);
    }

    #[test]
    fn test_adaptive_falls_back_without_triangles() {
        let mut a = AdaptiveRate::new(0.5, 0, 0.2);
        assert_eq!(a.next_rate(7, &stats(0, 0.0)), 0.2);
    }

    #[test]
    fn test_only_adaptive_closes_empty_rounds() {
        assert!(!FixedRate::new(0.0).closes_empty_rounds());
        assert!(AdaptiveRate::new(0.5, 5, 0.1).closes_empty_rounds());
    }

    #[test]
    fn test_adaptive_bounds() {
        let mut a = AdaptiveRate::new(0.5, 0, 0.1);
        // zero mean interval would give alpha = 1
        assert_eq!(a.next_rate(2, &stats(3, 0.0)), MAX_DISCARD_RATE);
        // huge interval gives a tiny rate, clamped to the floor
        assert_eq!(a.next_rate(2, &stats(1, 1e9)), 0.1);
    }
}
