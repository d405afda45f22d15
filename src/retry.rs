//! Retry policy for fallible async operations.
//!
//! Semantics:
//! - `max_attempts` counts total attempts (initial try + retries).
//! - Every error is retried by default; the `should_retry` predicate narrows
//!   that to a subset when some failures are known to be permanent.
//! - When attempts run out, the error from the final attempt is returned to the
//!   caller as-is. Earlier failures are dropped once a new attempt starts.
//! - Backoff calculates the delay per retry; jitter (off by default) randomizes
//!   it when many callers hit the same endpoint.
//! - Sleeper controls how delays are applied (production uses `TokioSleeper`;
//!   tests can inject `InstantSleeper`/`TrackingSleeper`).
//!
//! Invariants:
//! - Attempts never exceed `max_attempts` and run strictly one after another.
//! - The sleeper is invoked exactly `attempts_made - 1` times.
//!
//! Example
//! ```rust
//! use std::time::Duration;
//! use relentless::{Backoff, RetryPolicy};
//!
//! #[derive(Debug)]
//! struct MyErr;
//! impl std::fmt::Display for MyErr { fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "oops") } }
//! impl std::error::Error for MyErr {}
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let policy = RetryPolicy::<MyErr>::builder()
//!     .max_attempts(3) // total attempts
//!     .backoff(Backoff::exponential(Duration::from_millis(100)))
//!     .build()
//!     .unwrap();
//! let result: Result<(), MyErr> = policy.execute(|| async { Err(MyErr) }).await;
//! assert!(result.is_err());
//! # });
//! ```

use crate::telemetry::{emit_best_effort, NullSink, RetryEvent};
use crate::{Backoff, Jitter, Sleeper, TokioSleeper};
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tower_layer::Layer;
use tower_service::Service;

/// Default total attempt count.
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

/// Default base delay for the exponential backoff schedule.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Retry policy combining attempt bound, backoff, jitter, predicate, and sleeper.
pub struct RetryPolicy<E> {
    max_attempts: usize,
    backoff: Backoff,
    jitter: Jitter,
    should_retry: Arc<dyn Fn(&E) -> bool + Send + Sync>,
    sleeper: Arc<dyn Sleeper>,
}

// Not derived: the predicate and sleeper are shared, so cloning must not
// require `E: Clone`.
impl<E> Clone for RetryPolicy<E> {
    fn clone(&self) -> Self {
        Self {
            max_attempts: self.max_attempts,
            backoff: self.backoff.clone(),
            jitter: self.jitter,
            should_retry: self.should_retry.clone(),
            sleeper: self.sleeper.clone(),
        }
    }
}

impl<E> std::fmt::Debug for RetryPolicy<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("backoff", &self.backoff)
            .field("jitter", &self.jitter)
            .field("sleeper", &"<sleeper>")
            .field("should_retry", &"<predicate>")
            .finish()
    }
}

impl<E> RetryPolicy<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    /// Construct a new builder with defaults.
    pub fn builder() -> RetryPolicyBuilder<E> {
        RetryPolicyBuilder::new()
    }

    /// Execute an async operation with retry semantics.
    ///
    /// The operation may be invoked up to `max_attempts` times, so it must be
    /// idempotent or otherwise tolerate re-invocation. The first success wins;
    /// if every attempt fails, the error from the last one is returned.
    ///
    /// Dropping the returned future between attempts (e.g. losing a
    /// `tokio::select!` race) aborts the pending delay and starts no further
    /// attempt.
    pub async fn execute<T, Fut, Op>(&self, mut operation: Op) -> Result<T, E>
    where
        T: Send,
        Fut: Future<Output = Result<T, E>> + Send,
        Op: FnMut() -> Fut + Send,
    {
        for attempt in 0..self.max_attempts {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    if !(self.should_retry)(&e) {
                        return Err(e);
                    }

                    // Last attempt: surface this failure, not the first one
                    if attempt + 1 >= self.max_attempts {
                        return Err(e);
                    }

                    // Delay for the upcoming retry (1-indexed: first retry uses delay(1))
                    let delay = self.jitter.apply(self.backoff.delay(attempt + 1));
                    self.sleeper.sleep(delay).await;
                }
            }
        }

        // Safety: the loop runs max_attempts (>= 1 per build validation) times and
        // every iteration either returns or sleeps into the next one; the final
        // iteration always returns.
        debug_assert!(false, "retry loop should have returned; this indicates a logic bug");
        unreachable!()
    }

    /// Convert this policy into a tower layer with the same semantics.
    pub fn into_layer(self) -> RetryLayer<E> {
        RetryLayer { policy: self, sink: NullSink }
    }
}

/// Builder for `RetryPolicy`.
pub struct RetryPolicyBuilder<E> {
    max_attempts: usize,
    backoff: Backoff,
    jitter: Jitter,
    should_retry: Arc<dyn Fn(&E) -> bool + Send + Sync>,
    sleeper: Arc<dyn Sleeper>,
}

/// Errors produced while building a retry policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// `max_attempts` must be > 0.
    #[error("max_attempts must be > 0 (got {0})")]
    InvalidMaxAttempts(usize),
}

impl<E> RetryPolicyBuilder<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    /// Create a builder with sane defaults: 5 attempts, exponential backoff
    /// from 1 second doubling per retry, no jitter, every error retryable.
    pub fn new() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Backoff::exponential(DEFAULT_BASE_DELAY),
            jitter: Jitter::None,
            should_retry: Arc::new(|_| true),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Set total attempts (initial + retries). Must be > 0.
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Set backoff strategy.
    pub fn backoff<B>(mut self, backoff: B) -> Self
    where
        B: Into<Backoff>,
    {
        self.backoff = backoff.into();
        self
    }

    /// Set jitter strategy.
    pub fn with_jitter(mut self, jitter: Jitter) -> Self {
        self.jitter = jitter;
        self
    }

    /// Predicate to decide if an error is retryable. Defaults to retrying
    /// everything, which suits idempotent network calls; narrow it when some
    /// failures are known to be permanent.
    pub fn should_retry<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.should_retry = Arc::new(predicate);
        self
    }

    /// Provide a custom sleeper implementation.
    pub fn with_sleeper<S>(mut self, sleeper: S) -> Self
    where
        S: Sleeper + 'static,
    {
        self.sleeper = Arc::new(sleeper);
        self
    }

    /// Build the retry policy, validating inputs.
    pub fn build(self) -> Result<RetryPolicy<E>, BuildError> {
        if self.max_attempts == 0 {
            return Err(BuildError::InvalidMaxAttempts(0));
        }
        Ok(RetryPolicy {
            max_attempts: self.max_attempts,
            backoff: self.backoff,
            jitter: self.jitter,
            should_retry: self.should_retry,
            sleeper: self.sleeper,
        })
    }
}

impl<E> Default for RetryPolicyBuilder<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Tower-native retry layer wrapping a `RetryPolicy`, with an optional
/// telemetry sink for attempt/exhaustion events.
pub struct RetryLayer<E, Sink = NullSink> {
    policy: RetryPolicy<E>,
    sink: Sink,
}

impl<E, Sink> RetryLayer<E, Sink> {
    /// Attach a telemetry sink; events are emitted best-effort and can never
    /// change the outcome of the wrapped call.
    pub fn with_sink<S2>(self, sink: S2) -> RetryLayer<E, S2> {
        RetryLayer { policy: self.policy, sink }
    }
}

impl<E, Sink: Clone> Clone for RetryLayer<E, Sink> {
    fn clone(&self) -> Self {
        Self { policy: self.policy.clone(), sink: self.sink.clone() }
    }
}

/// Retry service produced by `RetryLayer`.
pub struct RetryService<S, E, Sink = NullSink> {
    inner: S,
    policy: RetryPolicy<E>,
    sink: Sink,
}

impl<S: Clone, E, Sink: Clone> Clone for RetryService<S, E, Sink> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone(), policy: self.policy.clone(), sink: self.sink.clone() }
    }
}

impl<S, E, Sink, Request> Service<Request> for RetryService<S, E, Sink>
where
    Request: Clone + Send + 'static,
    S: Service<Request> + Clone + Send + 'static,
    S::Response: Send + 'static,
    S::Error: Into<E> + Send + 'static,
    S::Future: Send + 'static,
    E: std::error::Error + Send + Sync + 'static,
    Sink: Service<RetryEvent, Response = ()> + Clone + Send + 'static,
    Sink::Error: std::error::Error + Send + 'static,
    Sink::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = E;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let policy = self.policy.clone();
        let sink = self.sink.clone();
        let mut inner = self.inner.clone();
        Box::pin(async move {
            let started = Instant::now();
            for attempt in 0..policy.max_attempts {
                match inner.call(req.clone()).await {
                    Ok(resp) => return Ok(resp),
                    Err(err) => {
                        let e: E = err.into();
                        if !(policy.should_retry)(&e) {
                            return Err(e);
                        }
                        if attempt + 1 >= policy.max_attempts {
                            emit_best_effort(
                                sink.clone(),
                                RetryEvent::Exhausted {
                                    total_attempts: policy.max_attempts,
                                    total_duration: started.elapsed(),
                                },
                            )
                            .await;
                            return Err(e);
                        }
                        let delay = policy.jitter.apply(policy.backoff.delay(attempt + 1));
                        emit_best_effort(
                            sink.clone(),
                            RetryEvent::Attempt { attempt: attempt + 1, delay },
                        )
                        .await;
                        policy.sleeper.sleep(delay).await;
                    }
                }
            }
            unreachable!("retry loop returns on every path")
        })
    }
}

impl<S, E, Sink> Layer<S> for RetryLayer<E, Sink>
where
    E: std::error::Error + Send + Sync + 'static,
    Sink: Clone,
{
    type Service = RetryService<S, E, Sink>;
    fn layer(&self, service: S) -> Self::Service {
        RetryService { inner: service, policy: self.policy.clone(), sink: self.sink.clone() }
    }
}
