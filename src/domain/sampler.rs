// Sampler - source of randomness for the simulation
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::Range;

pub trait Sampler: Send {
    /// Draw uniformly from `range`; a degenerate range yields its start
    fn uniform(&mut self, range: Range<f64>) -> f64;
}

#[derive(Debug)]
pub struct RandomSampler {
    rng: StdRng,
}

impl RandomSampler {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl Sampler for RandomSampler {
    fn uniform(&mut self, range: Range<f64>) -> f64 {
        if range.start >= range.end {
            return range.start;
        }
        self.rng.gen_range(range)
    }
}

/// Deterministic sampler that always lands at the same fraction of the range
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub struct FixedSampler {
    fraction: f64,
}

#[cfg(test)]
impl FixedSampler {
    pub fn new(fraction: f64) -> Self {
        Self {
            fraction: fraction.clamp(0.0, 1.0),
        }
    }
}

#[cfg(test)]
impl Sampler for FixedSampler {
    fn uniform(&mut self, range: Range<f64>) -> f64 {
        range.start + (range.end - range.start) * self.fraction
    }
}
