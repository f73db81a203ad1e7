//! Concurrency building blocks shared by every actor.
//!
//! # Main Components
//!
//! - [`CancellationToken`] - Monotonic stop signal injected into each actor
//! - [`SharedQueue`] - Closeable FIFO with blocking pop and wake-one push
//! - [`ProgressSink`] - Where actors report their progress records
//!
//! # Testing
//!
//! See [`mock`] module for a sink that records progress in memory.

pub mod cancel;
pub mod mock;
pub mod progress;
pub mod queue;

// Re-export core types for convenience
pub use cancel::*;
pub use progress::*;
pub use queue::*;
