//! Randomness used by the simulation
//!
//! Spawning needs a handful of draws (which kana, where, how fast, whether
//! the display script flips). They all go through `RandomSource` so tests
//! can script the exact sequence.

use std::collections::VecDeque;

use rand::Rng;

pub trait RandomSource {
    /// Uniform value in [0, 1)
    fn unit(&mut self) -> f32;

    /// Uniform index in [0, len). `len` must be non-zero.
    fn index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0, "index requires a non-empty range");
        ((self.unit() * len as f32) as usize).min(len.saturating_sub(1))
    }

    /// True with probability `p`
    fn chance(&mut self, p: f32) -> bool {
        self.unit() < p
    }
}

impl<R: Rng> RandomSource for R {
    fn unit(&mut self) -> f32 {
        self.random::<f32>()
    }

    fn index(&mut self, len: usize) -> usize {
        self.random_range(0..len)
    }
}

/// Replays a fixed list of unit values, then repeats the last one
#[derive(Debug, Clone, Default)]
pub struct SequenceRandom {
    values: VecDeque<f32>,
    last: f32,
}

impl SequenceRandom {
    pub fn new(values: impl IntoIterator<Item = f32>) -> Self {
        Self {
            values: values.into_iter().collect(),
            last: 0.0,
        }
    }
}

impl RandomSource for SequenceRandom {
    fn unit(&mut self) -> f32 {
        if let Some(v) = self.values.pop_front() {
            self.last = v.clamp(0.0, 0.999_999);
        }
        self.last
    }
}
