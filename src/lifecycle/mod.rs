//! Orchestration: spawning the actors, wiring their shared context, and
//! driving the `Init → Running → Draining → Stopped` lifecycle.

pub mod error;
pub mod pipeline_system;
pub mod tracing;

pub use error::*;
pub use pipeline_system::*;
