//! The per-buffer transform-and-reduce step.

use crate::model::{CombinedBuffer, DataBuffer};
use std::time::{Duration, Instant};

/// Outcome of summarizing one buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub average: f64,
    pub sample_count: usize,
    pub elapsed: Duration,
}

/// Concatenates `buffer` with itself and averages the result, timing both
/// steps together.
pub fn summarize(buffer: &DataBuffer) -> Summary {
    let started = Instant::now();
    let combined = CombinedBuffer::from_buffer(buffer);
    let average = combined.mean();
    Summary {
        average,
        sample_count: combined.len(),
        elapsed: started.elapsed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BUFFER_LEN;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_summary_counts_both_copies() {
        let buffer = DataBuffer::generate(0, BUFFER_LEN, &mut StdRng::seed_from_u64(3));
        let summary = summarize(&buffer);
        assert_eq!(summary.sample_count, 2 * BUFFER_LEN);
    }

    #[test]
    fn test_summary_average_of_known_samples() {
        let buffer = DataBuffer::from_samples(0, vec![1.0, 0.0, -0.5, 0.5]);
        let summary = summarize(&buffer);
        assert_eq!(summary.sample_count, 8);
        assert!((summary.average - 0.25).abs() < 1e-12);
    }
}
