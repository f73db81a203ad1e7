use crate::config::{ConfigError, PipelineConfig};
use crate::consumer_actor::ConsumerActor;
use crate::context::PipelineContext;
use crate::framework::{CancellationToken, ProgressRecord, ProgressSink};
use crate::lifecycle::PipelineError;
use crate::model::PipelineStats;
use crate::producer_actor::ProducerActor;
use std::future::Future;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{error, info};

/// Where the pipeline is in its one-way lifecycle.
///
/// `Init → Running → Draining → Stopped`. There is no way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Actors are being created.
    Init,
    /// The producer is generating and workers are consuming.
    Running,
    /// Stop was requested; workers are finishing what is queued.
    Draining,
    /// Every actor has exited.
    Stopped,
}

/// The runtime orchestrator for the producer and the consumer pool.
///
/// `PipelineSystem` is responsible for:
/// - **Lifecycle Management**: spawning every actor on its own OS thread and
///   joining them on shutdown
/// - **Dependency Wiring**: handing each actor the same [`PipelineContext`]
///   (queue, token, sink, counters)
/// - **Accounting**: producing the final [`PipelineStats`]
///
/// # Example
///
/// ```ignore
/// let system = PipelineSystem::start(config, Arc::new(TracingSink))?;
/// let stats = system.run_until(shutdown_signal()).await?;
/// assert_eq!(stats.abandoned, 0);
/// ```
pub struct PipelineSystem {
    ctx: PipelineContext,
    producer: Option<JoinHandle<()>>,
    consumers: Vec<JoinHandle<u64>>,
}

impl PipelineSystem {
    /// Creates the shared context and starts the producer and `config.workers`
    /// consumers.
    pub fn start(config: PipelineConfig, sink: Arc<dyn ProgressSink>) -> Result<Self, PipelineError> {
        Self::start_with_token(config, sink, CancellationToken::new())
    }

    /// Like [`start`](Self::start), but stops when the supplied token does.
    pub fn start_with_token(
        config: PipelineConfig,
        sink: Arc<dyn ProgressSink>,
        token: CancellationToken,
    ) -> Result<Self, PipelineError> {
        if config.workers == 0 {
            return Err(ConfigError::ZeroWorkers.into());
        }
        if config.poll_interval.is_zero() {
            return Err(ConfigError::ZeroPollInterval.into());
        }
        info!(state = ?LifecycleState::Init, workers = config.workers, "Starting pipeline");

        let ctx = PipelineContext::new(token, sink);
        let mut system = Self {
            ctx: ctx.clone(),
            producer: None,
            consumers: Vec::with_capacity(config.workers),
        };

        let producer = ProducerActor::new(&config);
        let producer_ctx = ctx.clone();
        match spawn_actor("producer".to_string(), move || producer.run(producer_ctx)) {
            Ok(handle) => system.producer = Some(handle),
            Err(e) => return Err(system.abort(e)),
        }

        for worker_id in 0..config.workers {
            let consumer = ConsumerActor::new(worker_id);
            let consumer_ctx = ctx.clone();
            match spawn_actor(format!("consumer-{worker_id}"), move || consumer.run(consumer_ctx)) {
                Ok(handle) => system.consumers.push(handle),
                Err(e) => return Err(system.abort(e)),
            }
        }

        info!(state = ?LifecycleState::Running, "Pipeline started");
        Ok(system)
    }

    /// Current lifecycle state. A live system is either running or draining.
    pub fn state(&self) -> LifecycleState {
        if self.ctx.token.is_stopped() {
            LifecycleState::Draining
        } else {
            LifecycleState::Running
        }
    }

    /// Begins draining. Idempotent.
    pub fn request_stop(&self) {
        if self.ctx.token.request_stop() {
            info!(state = ?LifecycleState::Draining, queued = self.ctx.queue.len(), "Draining pipeline");
        }
    }

    /// Live counters. `abandoned` is the current queue depth.
    pub fn stats(&self) -> PipelineStats {
        self.ctx.counters.snapshot(self.ctx.queue.len() as u64)
    }

    /// Stops the pipeline and waits for every actor to exit.
    ///
    /// Workers drain the queue before exiting, so a clean shutdown reports
    /// `abandoned == 0`. The final stats are also emitted to the sink as a
    /// [`ProgressRecord::Summary`].
    ///
    /// # Returns
    ///
    /// - `Ok(stats)` if every actor exited normally
    /// - `Err(PipelineError::ActorPanicked)` naming the first actor that panicked
    pub fn shutdown(mut self) -> Result<PipelineStats, PipelineError> {
        info!("Shutting down pipeline...");
        self.request_stop();
        let panicked = self.join_all();

        let abandoned = self.ctx.queue.drain_remaining().len() as u64;
        let stats = self.ctx.counters.snapshot(abandoned);
        info!(
            state = ?LifecycleState::Stopped,
            produced = stats.produced,
            consumed = stats.consumed,
            abandoned = stats.abandoned,
            "Pipeline shutdown complete"
        );
        self.ctx.sink.emit(ProgressRecord::Summary(stats));

        match panicked {
            Some(role) => Err(PipelineError::ActorPanicked { role }),
            None => Ok(stats),
        }
    }

    /// Waits for `signal`, then shuts down on a blocking thread so the async
    /// runtime is never parked on a thread join.
    ///
    /// The pipeline is shut down even if `signal` resolves to an error; that
    /// error is returned afterwards.
    pub async fn run_until<F>(self, signal: F) -> Result<PipelineStats, PipelineError>
    where
        F: Future<Output = Result<(), PipelineError>>,
    {
        let signalled = signal.await;
        match &signalled {
            Ok(()) => info!("Shutdown signal received"),
            Err(e) => error!(error = %e, "Shutdown signal failed, stopping anyway"),
        }
        let stats = tokio::task::spawn_blocking(move || self.shutdown()).await??;
        signalled?;
        Ok(stats)
    }

    // Joins every spawned actor and returns the role of the first one that
    // panicked, if any.
    fn join_all(&mut self) -> Option<String> {
        let mut panicked = None;

        if let Some(handle) = self.producer.take() {
            if handle.join().is_err() {
                error!("Producer panicked");
                panicked.get_or_insert_with(|| "producer".to_string());
            }
        }

        for (worker_id, handle) in self.consumers.drain(..).enumerate() {
            if handle.join().is_err() {
                error!(worker_id, "Consumer panicked");
                panicked.get_or_insert_with(|| format!("consumer-{worker_id}"));
            }
        }

        panicked
    }

    // Stops and joins whatever was already spawned after a failed spawn.
    fn abort(mut self, err: PipelineError) -> PipelineError {
        error!(error = %err, "Pipeline start failed");
        self.ctx.token.request_stop();
        self.join_all();
        err
    }
}

impl Drop for PipelineSystem {
    // A system dropped without `shutdown` still tells its actors to wind down.
    fn drop(&mut self) {
        if self.producer.is_some() || !self.consumers.is_empty() {
            self.ctx.token.request_stop();
        }
    }
}

fn spawn_actor<T, F>(role: String, f: F) -> Result<JoinHandle<T>, PipelineError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    thread::Builder::new()
        .name(role.clone())
        .spawn(f)
        .map_err(|source| PipelineError::Spawn { role, source })
}

/// Resolves on Ctrl+C, or on SIGTERM where the platform has it.
pub async fn shutdown_signal() -> Result<(), PipelineError> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate()).map_err(PipelineError::Signal)?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result.map_err(PipelineError::Signal)?,
            _ = terminate.recv() => info!("Received SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await.map_err(PipelineError::Signal)?;

    Ok(())
}
