//! Run-wide counters and the summary reported at shutdown.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Final accounting for one pipeline run.
///
/// `produced == consumed + abandoned` always holds once every actor has
/// exited. Workers drain the queue before stopping, so `abandoned` is
/// expected to be zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub produced: u64,
    pub consumed: u64,
    pub abandoned: u64,
}

/// Live counters shared by the producer and the consumer pool.
#[derive(Debug, Default)]
pub struct StatsCounters {
    produced: AtomicU64,
    consumed: AtomicU64,
}

impl StatsCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_produced(&self) {
        self.produced.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_consumed(&self) {
        self.consumed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn produced(&self) -> u64 {
        self.produced.load(Ordering::Relaxed)
    }

    pub fn consumed(&self) -> u64 {
        self.consumed.load(Ordering::Relaxed)
    }

    /// Point-in-time summary, with `abandoned` supplied by the caller.
    pub fn snapshot(&self, abandoned: u64) -> PipelineStats {
        PipelineStats {
            produced: self.produced(),
            consumed: self.consumed(),
            abandoned,
        }
    }
}
