//! Uniform random subsets of slot positions
//!
//! Both strategies return a uniformly distributed subset of `size` distinct
//! positions from `0..universe`. They differ only in cost: rejection sampling
//! is cheap when the subset is small relative to the universe, a partial
//! Fisher-Yates shuffle when most positions are chosen.

use indexmap::IndexSet;
use rand::seq::SliceRandom;
use rand::Rng;

/// Discard rate above which shuffling beats rejection sampling
pub const SHUFFLE_CROSSOVER: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubsetStrategy {
    /// Draw random positions into a set until it is large enough
    Rejection,
    /// Shuffle every position and take a prefix
    Shuffle,
}

impl SubsetStrategy {
    /// Strategy for a batch eviction discarding the fraction `rate`
    pub fn for_rate(rate: f64) -> Self {
        if rate <= SHUFFLE_CROSSOVER {
            SubsetStrategy::Rejection
        } else {
            SubsetStrategy::Shuffle
        }
    }

    /// Strategy for choosing `size` out of `universe` positions
    pub fn for_size(universe: usize, size: usize) -> Self {
        if size * 2 <= universe {
            SubsetStrategy::Rejection
        } else {
            SubsetStrategy::Shuffle
        }
    }

    pub fn choose<R: Rng + ?Sized>(self, universe: usize, size: usize, rng: &mut R) -> Vec<usize> {
        match self {
            SubsetStrategy::Rejection => choose_by_rejection(universe, size, rng),
            SubsetStrategy::Shuffle => choose_by_shuffle(universe, size, rng),
        }
    }
}

/// Choose `size` distinct positions out of `0..universe`, picking the
/// cheaper strategy for the ratio.
pub fn choose_random_subset<R: Rng + ?Sized>(universe: usize, size: usize, rng: &mut R) -> Vec<usize> {
    SubsetStrategy::for_size(universe, size).choose(universe, size, rng)
}

/// Rejection sampling into an insertion-ordered set.
///
/// The output order is the draw order, so the result is reproducible for a
/// given RNG state.
pub fn choose_by_rejection<R: Rng + ?Sized>(universe: usize, size: usize, rng: &mut R) -> Vec<usize> {
    let size = size.min(universe);
    let mut chosen = IndexSet::with_capacity(size);
    while chosen.len() < size {
        chosen.insert(rng.gen_range(0..universe));
    }
    chosen.into_iter().collect()
}

/// Partial Fisher-Yates shuffle of `0..universe`, keeping the first `size`
pub fn choose_by_shuffle<R: Rng + ?Sized>(universe: usize, size: usize, rng: &mut R) -> Vec<usize> {
    let size = size.min(universe);
    let mut positions: Vec<usize> = (0..universe).collect();
    let (chosen, _) = positions.partial_shuffle(rng, size);
    chosen.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn assert_valid(subset: &[usize], universe: usize, size: usize) {
        assert_eq!(subset.len(), size);
        let distinct: HashSet<_> = subset.iter().collect();
        assert_eq!(distinct.len(), size, "positions must be distinct");
        assert!(subset.iter().all(|&i| i < universe));
    }

    #[test]
    fn test_both_strategies_distinct_and_sized() {
        let mut rng = StdRng::seed_from_u64(7);
        for &(universe, size) in &[(10, 0), (10, 1), (10, 5), (10, 9), (10, 10), (1000, 300)] {
            assert_valid(&choose_by_rejection(universe, size, &mut rng), universe, size);
            assert_valid(&choose_by_shuffle(universe, size, &mut rng), universe, size);
            assert_valid(&choose_random_subset(universe, size, &mut rng), universe, size);
        }
    }

    #[test]
    fn test_strategy_crossover() {
        assert_eq!(SubsetStrategy::for_rate(0.1), SubsetStrategy::Rejection);
        assert_eq!(SubsetStrategy::for_rate(0.5), SubsetStrategy::Rejection);
        assert_eq!(SubsetStrategy::for_rate(0.51), SubsetStrategy::Shuffle);
        assert_eq!(SubsetStrategy::for_size(100, 50), SubsetStrategy::Rejection);
        assert_eq!(SubsetStrategy::for_size(100, 51), SubsetStrategy::Shuffle);
    }

    #[test]
    fn test_reproducible_for_seed() {
        let a = choose_by_rejection(500, 40, &mut StdRng::seed_from_u64(3));
        let b = choose_by_rejection(500, 40, &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);

        let a = choose_by_shuffle(500, 400, &mut StdRng::seed_from_u64(3));
        let b = choose_by_shuffle(500, 400, &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn test_both_strategies_roughly_uniform() {
        // Every position should be chosen close to size/universe of the time.
        let universe = 20;
        let size = 8;
        let trials = 20_000;
        let expected = trials as f64 * size as f64 / universe as f64;

        for strategy in [SubsetStrategy::Rejection, SubsetStrategy::Shuffle] {
            let mut rng = StdRng::seed_from_u64(11);
            let mut hits = vec![0usize; universe];
            for _ in 0..trials {
                for i in strategy.choose(universe, size, &mut rng) {
                    hits[i] += 1;
                }
            }
            for (i, &h) in hits.iter().enumerate() {
                let deviation = (h as f64 - expected).abs() / expected;
                assert!(
                    deviation < 0.05,
                    "{:?}: position {} chosen {} times, expected ~{}",
                    strategy, i, h, expected
                );
            }
        }
    }
}
