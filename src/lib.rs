#![forbid(unsafe_code)]
#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::all))]

//! # Relentless
//!
//! Retry policies with exponential backoff for async Rust.
//!
//! A `RetryPolicy` runs a caller-supplied async operation, retrying on failure
//! with a bounded attempt count and a growing delay between attempts. If every
//! attempt fails, the error from the final attempt is returned to the caller.
//!
//! ## Features
//!
//! - **Backoff strategies**: constant, linear, exponential with a configurable
//!   multiplier and optional cap
//! - **Optional jitter** (off by default, so schedules stay reproducible)
//! - **Retry classification** via a `should_retry` predicate (defaults to
//!   retrying every error)
//! - **Pluggable sleepers** for deterministic tests without real delays
//! - **Tower integration** via `RetryLayer`, with best-effort telemetry sinks
//!
//! ## Quick Start
//!
//! ```rust
//! use relentless::{Backoff, RetryPolicy};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let policy = RetryPolicy::builder()
//!         .max_attempts(3)
//!         .backoff(Backoff::exponential(Duration::from_secs(1)))
//!         .build()
//!         .expect("valid retry config");
//!
//!     let result = policy.execute(|| async {
//!         // Your async operation here
//!         Ok::<_, std::io::Error>(())
//!     }).await;
//!     assert!(result.is_ok());
//! }
//! ```

pub mod backoff;
pub mod jitter;
pub mod prelude;
pub mod presets;
pub mod retry;
pub mod sleeper;
pub mod telemetry;

// Re-exports
pub use backoff::Backoff;
pub use jitter::Jitter;
pub use retry::{RetryLayer, RetryPolicy, RetryPolicyBuilder, RetryService};
pub use sleeper::{InstantSleeper, Sleeper, TokioSleeper, TrackingSleeper};
