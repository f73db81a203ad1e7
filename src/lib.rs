#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # Buffer Pipeline
//!
//! > **A bounded-rate producer/consumer pipeline on OS threads.**
//!
//! One producer wakes on a fixed interval and generates a batch of synthetic
//! sample buffers. A pool of consumer workers drains a shared queue,
//! concatenates each buffer with itself and reports the average. An
//! interrupt stops the producer and lets the workers finish what is queued.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### Injected cancellation, not a global flag
//! Every actor receives a [`CancellationToken`](framework::CancellationToken)
//! at start-up. The token is part of every blocking wait's predicate, so a
//! stop request is observed immediately instead of at the next poll.
//!
//! ### One queue, no dispatcher
//! All workers compete on a single [`SharedQueue`](framework::SharedQueue).
//! A push wakes one idle worker; a stop wakes all of them. That is the whole
//! load-balancing story.
//!
//! ### Drain to empty
//! After a stop request workers keep popping until the queue is empty. Every
//! buffer pushed before shutdown is consumed exactly once, and the final
//! [`PipelineStats`](model::PipelineStats) proves it:
//! `produced == consumed + abandoned` with `abandoned == 0`.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Engine ([`framework`])
//! Generic concurrency primitives: the token, the queue, and the progress
//! sink abstraction.
//!
//! ### 2. The Data ([`model`])
//! [`DataBuffer`](model::DataBuffer), [`CombinedBuffer`](model::CombinedBuffer)
//! and the run counters.
//!
//! ### 3. The Actors ([`producer_actor`], [`consumer_actor`])
//! Each actor is a plain struct with a blocking `run(ctx)` loop.
//!
//! ### 4. The Orchestrator ([`lifecycle`])
//! [`PipelineSystem`](lifecycle::PipelineSystem) spawns the actors, wires the
//! shared [`PipelineContext`](context::PipelineContext) and drives the
//! `Init → Running → Draining → Stopped` lifecycle.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Three buffers per batch, one worker per core; Ctrl+C to stop
//! cargo run -- 3
//!
//! # Two workers, faster batches, JSON progress on stdout
//! cargo run -- 3 --workers 2 --poll-interval-ms 100 --format json
//! ```

pub mod config;
pub mod consumer_actor;
pub mod context;
pub mod framework;
pub mod lifecycle;
pub mod model;
pub mod producer_actor;
