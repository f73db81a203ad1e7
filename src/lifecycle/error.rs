//! Error types for starting and stopping the pipeline.

use crate::config::ConfigError;
use thiserror::Error;

/// Errors that can occur while running the pipeline lifecycle.
///
/// A shutdown request is a control signal, not an error, and never appears
/// here.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The configuration handed to the system was invalid.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The OS refused to create an actor thread.
    #[error("Failed to spawn {role} thread: {source}")]
    Spawn {
        role: String,
        #[source]
        source: std::io::Error,
    },

    /// An actor thread panicked before it could exit cleanly.
    #[error("Actor {role} panicked")]
    ActorPanicked { role: String },

    /// The blocking shutdown task could not be joined.
    #[error("Shutdown task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// Installing the interrupt handler failed.
    #[error("Failed to listen for shutdown signal: {0}")]
    Signal(#[source] std::io::Error),
}
