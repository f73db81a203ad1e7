//! Synthetic sample buffers and their derived, per-step forms.

use rand::distributions::{Distribution, Uniform};
use rand::Rng;

/// Number of samples in every generated [`DataBuffer`].
pub const BUFFER_LEN: usize = 11025;

/// A fixed-length run of synthetic samples produced in one generation step.
///
/// Buffers are immutable once built. Ownership moves producer → queue →
/// exactly one consumer, which drops it after computing its statistic.
#[derive(Debug, Clone, PartialEq)]
pub struct DataBuffer {
    sequence: u64,
    samples: Box<[f32]>,
}

impl DataBuffer {
    /// Draws `len` samples uniformly from `[-1.0, 1.0)`.
    pub fn generate<R: Rng + ?Sized>(sequence: u64, len: usize, rng: &mut R) -> Self {
        let dist = Uniform::new(-1.0f32, 1.0f32);
        let samples = (0..len).map(|_| dist.sample(rng)).collect();
        Self { sequence, samples }
    }

    /// Wraps pre-computed samples. Mostly useful in tests.
    pub fn from_samples(sequence: u64, samples: Vec<f32>) -> Self {
        Self {
            sequence,
            samples: samples.into_boxed_slice(),
        }
    }

    /// Position of this buffer in the producer's output stream.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn mean(&self) -> f64 {
        mean_of(&self.samples)
    }
}

/// A buffer concatenated with itself.
///
/// Only ever lives inside a single consumer's processing step.
#[derive(Debug)]
pub struct CombinedBuffer {
    samples: Vec<f32>,
}

impl CombinedBuffer {
    pub fn from_buffer(buffer: &DataBuffer) -> Self {
        let mut samples = Vec::with_capacity(buffer.len() * 2);
        samples.extend_from_slice(buffer.samples());
        samples.extend_from_slice(buffer.samples());
        Self { samples }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Arithmetic mean over every sample, accumulated in `f64`.
    pub fn mean(&self) -> f64 {
        mean_of(&self.samples)
    }
}

// An empty slice has no meaningful mean; report 0.0 rather than NaN.
fn mean_of(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples.iter().map(|&s| f64::from(s)).sum();
    sum / samples.len() as f64
}
