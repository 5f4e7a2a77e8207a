//! Session randomness.
//!
//! All draws for a session flow through one [`RoundRng`] so tests can
//! seed the entire round pipeline deterministically. The outcome is
//! computed client-side from this locally seeded generator; see
//! DESIGN.md for the trust implications of that inherited choice.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seedable random source for one session.
pub struct RoundRng {
    inner: ChaCha8Rng,
}

impl RoundRng {
    /// Seed from OS entropy (production).
    pub fn from_entropy() -> Self {
        Self {
            inner: ChaCha8Rng::from_entropy(),
        }
    }

    /// Seed deterministically (tests, reproducible simulations).
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Uniform f32 in [0, 1).
    pub fn next_f32(&mut self) -> f32 {
        self.inner.gen()
    }

    /// Uniform f64 in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        self.inner.gen()
    }

    /// Uniform value in [0, max). Returns 0 when max is 0.
    pub fn next_bounded(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        self.inner.gen_range(0..max)
    }

    /// Roll a single die (1-6).
    pub fn roll_die(&mut self) -> u8 {
        self.next_bounded(6) as u8 + 1
    }

    /// Pick a uniformly random element of a non-empty slice.
    pub fn pick<'a, T>(&mut self, slice: &'a [T]) -> &'a T {
        &slice[self.next_bounded(slice.len() as u32) as usize]
    }
}
