//! Telemetry and observability for retry policies.
//!
//! The retry core stays silent: all intermediate failures are absorbed and only
//! the final error crosses the call boundary. Observability is a collaborator
//! concern, expressed as structured [`RetryEvent`]s flowing through
//! [`TelemetrySink`] implementations that can log, aggregate, or forward them.
//!
//! The `TelemetrySink` trait is a `tower::Service<RetryEvent>` for
//! composability; `emit_best_effort` guarantees a misbehaving sink never
//! changes the outcome of the retried call.

pub mod events;
pub mod sinks;

pub use events::RetryEvent;
pub use sinks::{emit_best_effort, LogSink, MemorySink, NullSink, TelemetrySink};
