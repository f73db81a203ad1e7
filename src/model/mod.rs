//! Pure data structures that flow through the pipeline.

pub mod buffer;
pub mod stats;

pub use buffer::*;
pub use stats::*;
