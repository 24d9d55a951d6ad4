//! Injectable randomness for the engines.
//!
//! Every random draw in the forecast, real-time simulation and diet planner
//! goes through [`NoiseSource`], so callers choose between true randomness,
//! a seeded generator for reproducible runs, or a fixed draw for exact tests.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// A source of unit-interval draws
pub trait NoiseSource {
    /// Draw a value in `[0, 1)`
    fn next_unit(&mut self) -> f64;

    /// Draw a value in `[low, high)`
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + self.next_unit() * (high - low)
    }

    /// Centered draw in `[-span/2, span/2)`
    fn centered(&mut self, span: f64) -> f64 {
        (self.next_unit() - 0.5) * span
    }

    /// Pick an index in `0..len`. `len` must be non-zero.
    fn pick(&mut self, len: usize) -> usize {
        let idx = (self.next_unit() * len as f64).floor() as usize;
        idx.min(len.saturating_sub(1))
    }
}

/// Noise backed by a `rand` generator
pub struct RandomNoise<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomNoise<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomNoise<ChaCha8Rng> {
    /// Reproducible noise from a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Noise seeded from the operating system
    pub fn from_entropy() -> Self {
        Self::new(ChaCha8Rng::from_entropy())
    }
}

impl<R: Rng> NoiseSource for RandomNoise<R> {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Always returns the same draw
///
/// `FixedNoise(0.5)` makes every centered draw zero.
#[derive(Clone, Copy, Debug)]
pub struct FixedNoise(pub f64);

impl FixedNoise {
    pub fn silent() -> Self {
        FixedNoise(0.5)
    }
}

impl NoiseSource for FixedNoise {
    fn next_unit(&mut self) -> f64 {
        self.0.clamp(0.0, 1.0 - f64::EPSILON)
    }
}
