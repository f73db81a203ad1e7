//! Consumer workers: drain the shared queue and summarize each buffer.
//!
//! Every worker in the pool runs the same loop against the same queue. There
//! is no dispatcher. Whichever idle worker the queue wakes takes the next
//! buffer, and the queue lock is released before any transform work starts.

pub mod transform;

pub use transform::*;

use crate::context::PipelineContext;
use crate::framework::{Popped, ProgressRecord};
use tracing::{debug, info};

/// One worker of the consumer pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsumerActor {
    worker_id: usize,
}

impl ConsumerActor {
    pub fn new(worker_id: usize) -> Self {
        Self { worker_id }
    }

    /// Pops and processes buffers until the queue reports closed, which only
    /// happens once it is empty and the token has stopped. Returns the number
    /// of buffers this worker processed.
    pub fn run(self, ctx: PipelineContext) -> u64 {
        let worker_id = self.worker_id;
        info!(worker_id, "Consumer started");

        let mut processed = 0u64;
        loop {
            let buffer = match ctx.queue.pop() {
                Popped::Item(buffer) => buffer,
                Popped::Closed => break,
            };

            let summary = summarize(&buffer);
            debug!(worker_id, sequence = buffer.sequence(), "Buffer processed");
            ctx.counters.record_consumed();
            processed += 1;

            ctx.sink.emit(ProgressRecord::Consumer {
                worker_id,
                sequence: buffer.sequence(),
                average: summary.average,
                sample_count: summary.sample_count,
                elapsed_seconds: summary.elapsed.as_secs_f64(),
            });
        }

        info!(worker_id, processed, "Consumer stopped");
        processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::RecordingSink;
    use crate::framework::CancellationToken;
    use crate::model::DataBuffer;
    use std::sync::Arc;

    #[test]
    fn test_worker_drains_queue_after_stop() {
        let sink = Arc::new(RecordingSink::new());
        let token = CancellationToken::new();
        let ctx = PipelineContext::new(token.clone(), sink.clone());
        for seq in 0..3 {
            ctx.queue
                .push(DataBuffer::from_samples(seq, vec![0.5; 4]))
                .unwrap();
        }
        token.request_stop();

        let processed = ConsumerActor::new(7).run(ctx.clone());

        assert_eq!(processed, 3);
        assert_eq!(ctx.counters.consumed(), 3);
        assert!(ctx.queue.is_empty());
        assert_eq!(sink.consumed_sequences(), vec![0, 1, 2]);

        for record in sink.consumer_records() {
            match record {
                ProgressRecord::Consumer {
                    worker_id,
                    average,
                    sample_count,
                    ..
                } => {
                    assert_eq!(worker_id, 7);
                    assert_eq!(sample_count, 8);
                    assert!((average - 0.5).abs() < 1e-12);
                }
                other => panic!("unexpected record {other:?}"),
            }
        }
    }

    #[test]
    fn test_worker_exits_immediately_on_stopped_empty_queue() {
        let sink = Arc::new(RecordingSink::new());
        let token = CancellationToken::new();
        let ctx = PipelineContext::new(token.clone(), sink.clone());
        token.request_stop();

        assert_eq!(ConsumerActor::new(0).run(ctx), 0);
        assert!(sink.records().is_empty());
    }
}
