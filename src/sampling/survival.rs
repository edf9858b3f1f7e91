//! Survival-rate cache for round-batched eviction
//!
//! An edge admitted in round `r` is still sampled in the current round `c`
//! with probability `prod(1 - alpha_i)` over the eviction episodes that
//! opened rounds `r+1 ..= c`. The cache keeps that product for every
//! admission round against the current round, updated once per episode, so
//! a triangle's weight never recomputes a product from scratch.

use crate::graph::Round;

#[derive(Debug, Clone)]
pub struct SurvivalCache {
    /// `column[s]` = product of survival rates of the episodes that opened
    /// rounds `s ..= current`. `column[current + 1]` is always 1.
    column: Vec<f64>,
    /// `rates[r]` = survival rate of the episode that opened round `r`
    rates: Vec<f64>,
    current: Round,
}

impl Default for SurvivalCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SurvivalCache {
    /// Cache positioned at round 1, before any eviction
    pub fn new() -> Self {
        Self {
            column: vec![1.0, 1.0, 1.0],
            rates: vec![1.0, 1.0],
            current: 1,
        }
    }

    pub fn current_round(&self) -> Round {
        self.current
    }

    /// Record an eviction episode with the given survival rate and move to
    /// the next round
    pub fn advance(&mut self, survival_rate: f64) -> Round {
        debug_assert!(survival_rate > 0.0 && survival_rate <= 1.0);
        if survival_rate < 1.0 {
            for product in self.column.iter_mut().skip(1) {
                *product *= survival_rate;
            }
        }
        self.column.push(1.0);
        self.rates.push(survival_rate);
        self.current += 1;
        self.current
    }

    /// Probability that an edge admitted in `round` survived every episode since
    pub fn survival_since(&self, round: Round) -> f64 {
        if round >= self.current {
            return 1.0;
        }
        self.column[round as usize + 1]
    }

    /// Survival rate used by the episode that opened `round`
    pub fn rate_of(&self, round: Round) -> Option<f64> {
        if round < 2 {
            return None;
        }
        self.rates.get(round as usize).copied()
    }
}
