use std::fmt;
use std::time::Duration;

/// Events emitted by retrying services.
///
/// Structured telemetry describing retry behavior, consumed by
/// [`TelemetrySink`](super::TelemetrySink) implementations. The retry core
/// itself never logs; sinks decide what to do with these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryEvent {
    /// A retry attempt is about to be made.
    ///
    /// Emitted before sleeping and retrying a failed request.
    Attempt {
        /// The retry number (1-indexed)
        attempt: usize,
        /// The backoff delay before this retry
        delay: Duration,
    },
    /// All retry attempts have been exhausted.
    ///
    /// Emitted when the maximum number of attempts is reached
    /// and the request still fails.
    Exhausted {
        /// Total number of attempts made
        total_attempts: usize,
        /// Total time spent retrying
        total_duration: Duration,
    },
}

impl fmt::Display for RetryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryEvent::Attempt { attempt, delay } => {
                write!(f, "Attempt(#{}, delay={:?})", attempt, delay)
            }
            RetryEvent::Exhausted { total_attempts, total_duration } => {
                write!(f, "Exhausted(attempts={}, duration={:?})", total_attempts, total_duration)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attempt_display() {
        let event = RetryEvent::Attempt { attempt: 2, delay: Duration::from_millis(100) };
        assert!(event.to_string().contains("Attempt"));
        assert!(event.to_string().contains("#2"));
    }

    #[test]
    fn exhausted_display() {
        let event =
            RetryEvent::Exhausted { total_attempts: 5, total_duration: Duration::from_secs(3) };
        assert!(event.to_string().contains("Exhausted"));
        assert!(event.to_string().contains("attempts=5"));
    }

    #[test]
    fn events_compare_by_value() {
        let event = RetryEvent::Attempt { attempt: 1, delay: Duration::from_millis(50) };
        assert_eq!(event, event);
    }
}
