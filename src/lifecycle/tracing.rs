//! # Observability & Tracing
//!
//! The [`setup_tracing`] function initializes structured logging with the
//! `tracing` crate for the whole process. Call it once, from `main`.
//!
//! ## Configuration
//!
//! - **Log level** comes from `RUST_LOG`; without it, `info` is used so that
//!   progress lines are visible.
//! - **Thread names** are shown. Actors run on threads named `producer` and
//!   `consumer-<id>`, which identifies the emitting actor at a glance.
//! - **Compact format** without the module target.
//!
//! ## Usage Examples
//!
//! ```bash
//! # Progress lines only (default)
//! cargo run -- 3
//!
//! # Per-buffer detail
//! RUST_LOG=debug cargo run -- 3
//!
//! # Every queue push and pop
//! RUST_LOG=buffer_pipeline::framework::queue=trace cargo run -- 3
//! ```
//!
//! ## Example Output
//!
//! ```text
//! INFO producer Data produced role="producer" buffers=3 elapsed_seconds=0.501
//! INFO consumer-0 Calculated average role="consumer" worker_id=0 sequence=0 average=0.0041 sample_count=22050 elapsed_seconds=0.00004
//! ```
//!
//! With `--format json` the progress records go to stdout as JSON lines and
//! diagnostics move to stderr, so stdout stays machine-readable.

use crate::config::OutputFormat;
use tracing_subscriber::EnvFilter;

pub fn setup_tracing(format: OutputFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact();

    match format {
        OutputFormat::Text => builder.init(),
        OutputFormat::Json => builder.with_writer(std::io::stderr).init(),
    }
}
