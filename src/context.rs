//! Dependencies injected into every actor when it starts running.

use crate::framework::{CancellationToken, ProgressSink, SharedQueue};
use crate::model::{DataBuffer, StatsCounters};
use std::sync::Arc;

/// Everything an actor shares with the rest of the pipeline.
///
/// Actors receive their own clone in `run()`; nothing here is global.
#[derive(Clone)]
pub struct PipelineContext {
    pub queue: SharedQueue<DataBuffer>,
    pub token: CancellationToken,
    pub sink: Arc<dyn ProgressSink>,
    pub counters: Arc<StatsCounters>,
}

impl PipelineContext {
    /// Builds a context whose queue is bound to `token`.
    pub fn new(token: CancellationToken, sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            queue: SharedQueue::new(token.clone()),
            token,
            sink,
            counters: Arc::new(StatsCounters::new()),
        }
    }
}
