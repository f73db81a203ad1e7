//! # Mock Framework
//!
//! Utilities for observing actors in tests without scraping log output.
//!
//! [`RecordingSink`] captures every [`ProgressRecord`] in memory. Hand an
//! `Arc<RecordingSink>` to the system under test, then inspect it:
//!
//! ```ignore
//! let sink = Arc::new(RecordingSink::new());
//! let system = PipelineSystem::start(config, sink.clone())?;
//! // ... let it run ...
//! let stats = system.shutdown()?;
//! assert_eq!(sink.consumer_records().len() as u64, stats.consumed);
//! ```

use crate::framework::progress::{ProgressRecord, ProgressSink};
use crate::model::PipelineStats;
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// A [`ProgressSink`] that keeps every record it receives.
#[derive(Debug, Default)]
pub struct RecordingSink {
    records: Mutex<Vec<ProgressRecord>>,
    changed: Condvar,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far, in emission order.
    pub fn records(&self) -> Vec<ProgressRecord> {
        self.lock().clone()
    }

    pub fn producer_records(&self) -> Vec<ProgressRecord> {
        self.lock()
            .iter()
            .filter(|r| matches!(r, ProgressRecord::Producer { .. }))
            .cloned()
            .collect()
    }

    pub fn consumer_records(&self) -> Vec<ProgressRecord> {
        self.lock()
            .iter()
            .filter(|r| matches!(r, ProgressRecord::Consumer { .. }))
            .cloned()
            .collect()
    }

    /// Sequence tags of consumed buffers, in the order they were reported.
    pub fn consumed_sequences(&self) -> Vec<u64> {
        self.lock()
            .iter()
            .filter_map(|r| match r {
                ProgressRecord::Consumer { sequence, .. } => Some(*sequence),
                _ => None,
            })
            .collect()
    }

    /// The final run summary, if one has been emitted.
    pub fn summary(&self) -> Option<PipelineStats> {
        self.lock().iter().find_map(|r| match r {
            ProgressRecord::Summary(stats) => Some(*stats),
            _ => None,
        })
    }

    /// Blocks until `predicate` holds for the recorded set or `timeout`
    /// elapses. Returns whether the predicate was satisfied.
    pub fn wait_until<F>(&self, timeout: Duration, mut predicate: F) -> bool
    where
        F: FnMut(&[ProgressRecord]) -> bool,
    {
        let deadline = Instant::now() + timeout;
        let mut records = self.lock();
        loop {
            if predicate(&records) {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            records = match self.changed.wait_timeout(records, deadline - now) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ProgressRecord>> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ProgressSink for RecordingSink {
    fn emit(&self, record: ProgressRecord) {
        self.lock().push(record);
        self.changed.notify_all();
    }
}
