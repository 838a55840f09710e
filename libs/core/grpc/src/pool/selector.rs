use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;

/// Chooses which pooled channel serves a request
pub trait SlotSelector: Send + Sync + fmt::Debug {
    /// Return an index in `0..pool_len`. `pool_len` is never zero.
    fn select(&self, pool_len: usize) -> usize;
}

/// Uniform random choice, independent across calls
#[derive(Debug)]
pub struct RandomSelector {
    rng: Mutex<StdRng>,
}

impl RandomSelector {
    /// Seeded from the operating system
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Deterministic sequence, for tests and reproducible benchmarks
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl SlotSelector for RandomSelector {
    fn select(&self, pool_len: usize) -> usize {
        self.rng.lock().random_range(0..pool_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_stays_in_range() {
        let selector = RandomSelector::new();
        for len in 1..10 {
            for _ in 0..100 {
                assert!(selector.select(len) < len);
            }
        }
    }

    #[test]
    fn test_single_slot_always_selected() {
        let selector = RandomSelector::seeded(1);
        assert!((0..50).all(|_| selector.select(1) == 0));
    }

    #[test]
    fn test_seeded_selectors_agree() {
        let a = RandomSelector::seeded(42);
        let b = RandomSelector::seeded(42);
        let left: Vec<_> = (0..32).map(|_| a.select(5)).collect();
        let right: Vec<_> = (0..32).map(|_| b.select(5)).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn test_distribution_is_uniform() {
        const POOL: usize = 5;
        const DRAWS: usize = 50_000;

        let selector = RandomSelector::seeded(7);
        let mut counts = [0usize; POOL];
        for _ in 0..DRAWS {
            counts[selector.select(POOL)] += 1;
        }

        // Expected 10_000 per slot, standard deviation ~90
        let expected = DRAWS / POOL;
        for (slot, count) in counts.iter().enumerate() {
            let diff = count.abs_diff(expected);
            assert!(diff < 500, "slot {} drawn {} times", slot, count);
        }
    }
}
