//! Convenient re-exports for common types.
pub use crate::{
    backoff::{Backoff, BackoffError, BackoffStrategy, DEFAULT_FACTOR, MAX_BACKOFF},
    jitter::Jitter,
    retry::{
        BuildError, RetryLayer, RetryPolicy, RetryPolicyBuilder, RetryService,
        DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS,
    },
    sleeper::{InstantSleeper, Sleeper, TokioSleeper, TrackingSleeper},
    telemetry::{LogSink, MemorySink, NullSink, RetryEvent, TelemetrySink},
};
