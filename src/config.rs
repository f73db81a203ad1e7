//! # Configuration
//!
//! The command line is parsed with `clap` into [`Cli`], then validated into a
//! [`PipelineConfig`]. Library users and tests skip the CLI and start from
//! [`PipelineConfig::new`], which carries the reference defaults.

use crate::model::BUFFER_LEN;
use clap::{Parser, ValueEnum};
use std::num::NonZeroUsize;
use std::time::Duration;
use thiserror::Error;

/// Default pause between producer batches.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Errors produced while validating the command line.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    /// The batch size must be at least one.
    #[error("The number of data sets must be a positive integer, got {0}")]
    NonPositiveBatchSize(i64),

    /// The consumer pool needs at least one worker.
    #[error("The number of workers must be a positive integer")]
    ZeroWorkers,

    /// A zero poll interval would make the producer spin.
    #[error("The poll interval must be greater than zero")]
    ZeroPollInterval,
}

/// How progress records are written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable `tracing` lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Generate synthetic buffers in timed batches and summarize them on a worker pool.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Number of data sets generated per batch.
    #[arg(value_name = "N", allow_negative_numbers = true)]
    pub batch_size: i64,

    /// Consumer threads. Defaults to the detected hardware parallelism.
    #[arg(long)]
    pub workers: Option<usize>,

    /// Pause between producer batches, in milliseconds.
    #[arg(long, default_value_t = 500)]
    pub poll_interval_ms: u64,

    /// Seed for the producer's random generator.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Progress output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl Cli {
    /// Validates the raw arguments.
    pub fn into_config(self) -> Result<PipelineConfig, ConfigError> {
        let batch_size = usize::try_from(self.batch_size)
            .ok()
            .and_then(NonZeroUsize::new)
            .ok_or(ConfigError::NonPositiveBatchSize(self.batch_size))?;

        let workers = match self.workers {
            Some(0) => return Err(ConfigError::ZeroWorkers),
            Some(n) => n,
            None => default_workers(),
        };

        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }

        Ok(PipelineConfig {
            batch_size,
            workers,
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            buffer_len: BUFFER_LEN,
            seed: self.seed,
            format: self.format,
        })
    }
}

/// Validated runtime settings for a [`PipelineSystem`](crate::lifecycle::PipelineSystem).
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Buffers generated per producer batch.
    pub batch_size: NonZeroUsize,
    /// Size of the consumer pool.
    pub workers: usize,
    /// Pause before each producer batch.
    pub poll_interval: Duration,
    /// Samples per buffer.
    pub buffer_len: usize,
    /// Producer RNG seed; `None` seeds from OS entropy.
    pub seed: Option<u64>,
    pub format: OutputFormat,
}

impl PipelineConfig {
    /// Reference defaults: hardware-parallelism workers, 500 ms interval,
    /// [`BUFFER_LEN`] samples per buffer.
    pub fn new(batch_size: NonZeroUsize) -> Self {
        Self {
            batch_size,
            workers: default_workers(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            buffer_len: BUFFER_LEN,
            seed: None,
            format: OutputFormat::Text,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_buffer_len(mut self, buffer_len: usize) -> Self {
        self.buffer_len = buffer_len;
        self
    }
}

/// Detected hardware parallelism, or 1 if it cannot be determined.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}
