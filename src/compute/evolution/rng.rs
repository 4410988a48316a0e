//! Random draw source for mutation and selection.

use rand::prelude::*;

/// Random number generator wrapper for level operations.
///
/// Every mutation receives one of these explicitly; parallel workers get their
/// own instance seeded from [`LevelRng::next_seed`].
pub struct LevelRng {
    rng: StdRng,
}

impl LevelRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create with random seed.
    pub fn random() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Uniform float in `[0, 1)`.
    #[inline]
    pub fn uniform(&mut self) -> f64 {
        self.rng.r#gen::<f64>()
    }

    /// True with probability `p`.
    #[inline]
    pub fn chance(&mut self, p: f64) -> bool {
        self.uniform() < p
    }

    /// Uniform integer in `[lo, hi]`.
    #[inline]
    pub fn range_inclusive(&mut self, lo: i32, hi: i32) -> i32 {
        self.rng.gen_range(lo..=hi)
    }

    /// Uniform step in `{-1, 0, 1}`.
    #[inline]
    pub fn offset(&mut self) -> i32 {
        self.range_inclusive(-1, 1)
    }

    /// Uniform index in `[0, len)`. Returns 0 when `len` is 0.
    #[inline]
    pub fn index(&mut self, len: usize) -> usize {
        if len == 0 { 0 } else { self.rng.gen_range(0..len) }
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }

    /// Generate next u64 for seeding child RNGs.
    pub fn next_seed(&mut self) -> u64 {
        self.rng.r#gen()
    }
}
