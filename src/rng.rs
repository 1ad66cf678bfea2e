//! Entropy source backing every game engine.
//!
//! Payouts have real value, so outcomes must come from the operating
//! system's entropy pool, never from a seedable generator.

use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use rand::Rng;

/// Cryptographically strong uniform generator.
///
/// Engines take this by `&mut` when they draw; pure settle functions take
/// forced values instead so outcomes stay testable.
#[derive(Debug, Default, Clone, Copy)]
pub struct EntropySource;

impl EntropySource {
    pub fn new() -> Self {
        Self
    }

    /// Unbiased index in `[0, n)`.
    ///
    /// Panics if `n == 0`; every caller draws from a fixed enumeration.
    pub fn draw_uniform(&mut self, n: usize) -> usize {
        OsRng.gen_range(0..n)
    }

    /// Uniform Fisher-Yates permutation in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut OsRng);
    }

    /// Uniform value in `[0, 1)`.
    pub fn chance(&mut self) -> f64 {
        OsRng.gen()
    }

    /// Uniform value in `[lo, hi]`.
    pub fn range_inclusive(&mut self, lo: u32, hi: u32) -> u32 {
        OsRng.gen_range(lo..=hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_uniform_stays_in_range() {
        let mut rng = EntropySource::new();
        for _ in 0..1000 {
            assert!(rng.draw_uniform(38) < 38);
        }
    }

    #[test]
    fn test_shuffle_preserves_elements() {
        let mut rng = EntropySource::new();
        let mut items: Vec<u32> = (0..52).collect();
        rng.shuffle(&mut items);

        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..52).collect::<Vec<u32>>());
    }

    #[test]
    fn test_chance_bounds() {
        let mut rng = EntropySource::new();
        for _ in 0..100 {
            let x = rng.chance();
            assert!((0.0..1.0).contains(&x));
        }
    }
}
