//! The producer: generates buffers in timed batches and pushes them onto the
//! shared queue.
//!
//! Each iteration sleeps for the poll interval, then generates up to
//! `batch_size` buffers. The token is checked before every buffer, so a stop
//! request mid-batch abandons the rest of the batch instead of finishing it.
//! Buffers are pushed one at a time so consumers can start on the first
//! buffer while the rest of the batch is still being generated. Only buffers
//! the queue accepted are counted as produced.

use crate::config::PipelineConfig;
use crate::context::PipelineContext;
use crate::framework::ProgressRecord;
use crate::model::DataBuffer;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// The single generating actor. Owns its RNG outright; nothing else draws
/// from it.
pub struct ProducerActor {
    batch_size: NonZeroUsize,
    poll_interval: Duration,
    buffer_len: usize,
    rng: StdRng,
    next_sequence: u64,
}

impl ProducerActor {
    pub fn new(config: &PipelineConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            batch_size: config.batch_size,
            poll_interval: config.poll_interval,
            buffer_len: config.buffer_len,
            rng,
            next_sequence: 0,
        }
    }

    /// Runs until the token stops. Blocks the calling thread.
    pub fn run(mut self, ctx: PipelineContext) {
        info!(
            batch_size = self.batch_size.get(),
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "Producer started"
        );
        let started = Instant::now();

        while ctx.token.is_running() {
            if !ctx.token.sleep(self.poll_interval) {
                break;
            }
            let buffers = self.produce_batch(&ctx);
            ctx.sink.emit(ProgressRecord::Producer {
                elapsed_seconds: started.elapsed().as_secs_f64(),
                buffers,
            });
        }

        info!(produced = self.next_sequence, "Producer stopped");
    }

    /// Generates and pushes one batch. Returns how many buffers were pushed,
    /// which is less than the batch size if a stop arrived mid-batch.
    fn produce_batch(&mut self, ctx: &PipelineContext) -> usize {
        let mut pushed = 0;
        for _ in 0..self.batch_size.get() {
            if ctx.token.is_stopped() {
                debug!(pushed, "Batch cut short by stop request");
                break;
            }
            let buffer = DataBuffer::generate(self.next_sequence, self.buffer_len, &mut self.rng);
            // A stop can land while the buffer is being generated. The queue
            // refuses it then, and it never counts as produced.
            if ctx.queue.push(buffer).is_err() {
                debug!(pushed, "Queue closed before push, buffer dropped");
                break;
            }
            self.next_sequence += 1;
            ctx.counters.record_produced();
            pushed += 1;
        }
        pushed
    }
}
