//! Seedable random source shared by initializers and modifiers

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct ParticleRng {
    inner: StdRng,
}

impl ParticleRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeded from the operating system
    pub fn from_entropy() -> Self {
        Self {
            inner: StdRng::from_os_rng(),
        }
    }

    /// Returns a float in [0, 1)
    pub fn next_f32(&mut self) -> f32 {
        self.inner.random::<f32>()
    }

    /// Returns a float in [min, max)
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }

    /// Returns an integer in [0, bound), or 0 when `bound` is 0
    pub fn below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        self.inner.random_range(0..bound)
    }

    /// Returns an integer in [min, max), or `min` when the range is empty
    pub fn int_range(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        self.inner.random_range(min..max)
    }
}
