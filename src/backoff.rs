//! Backoff strategies for retry policies.
//!
//! Provides constant, linear, and exponential strategies with optional caps.
//! The exponential strategy takes a configurable multiplier, so the schedule is
//! `base * factor^(attempt - 1)` for retries counted from 1. Attempt index `0`
//! represents the initial call and always yields no delay.
//!
//! Example
//! ```rust
//! use std::time::Duration;
//! use relentless::Backoff;
//!
//! let backoff = Backoff::exponential(Duration::from_millis(100))
//!     .with_max(Duration::from_secs(2))
//!     .unwrap();
//! assert_eq!(backoff.delay(0), Duration::from_millis(0)); // initial call
//! assert_eq!(backoff.delay(1), Duration::from_millis(100));
//! assert_eq!(backoff.delay(2), Duration::from_millis(200));
//! assert_eq!(backoff.delay(6), Duration::from_secs(2)); // capped
//! ```
//!
//! Overflow behavior: computations that would overflow saturate to `MAX_BACKOFF`
//! (1 day). Attempts greater than `u32::MAX` are clamped when computing
//! multipliers.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Maximum delay used when calculations overflow (1 day).
pub const MAX_BACKOFF: Duration = Duration::from_secs(24 * 60 * 60);

/// Default multiplier for exponential backoff.
pub const DEFAULT_FACTOR: u32 = 2;

/// Errors returned by backoff configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackoffError {
    /// `with_max` was called on a constant strategy.
    #[error("with_max is only valid for linear or exponential backoff")]
    ConstantDoesNotSupportMax,
    /// The cap must be a positive duration.
    #[error("max must be greater than zero")]
    MaxMustBePositive,
    /// The cap must not undercut the base delay.
    #[error("max ({max:?}) must be >= base ({base:?})")]
    MaxLessThanBase { base: Duration, max: Duration },
    /// An exponential multiplier of zero would collapse every delay.
    #[error("exponential factor must be at least 1 (got 0)")]
    FactorMustBePositive,
}

/// Trait implemented by all backoff strategies.
pub trait BackoffStrategy: Send + Sync + fmt::Debug {
    fn delay(&self, attempt: usize) -> Duration;
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ConstantBackoff {
    delay: Duration,
}

impl BackoffStrategy for ConstantBackoff {
    fn delay(&self, attempt: usize) -> Duration {
        if attempt == 0 {
            Duration::from_millis(0)
        } else {
            self.delay
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct LinearBackoff {
    base: Duration,
    max: Option<Duration>,
}

impl BackoffStrategy for LinearBackoff {
    fn delay(&self, attempt: usize) -> Duration {
        if attempt == 0 {
            return Duration::from_millis(0);
        }
        let attempt_u32 = attempt.min(u32::MAX as usize) as u32; // clamp to prevent truncation
        let linear = self.base.checked_mul(attempt_u32).unwrap_or(MAX_BACKOFF);
        let capped = self.max.map(|m| linear.min(m)).unwrap_or(linear);
        capped.min(MAX_BACKOFF)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ExponentialBackoff {
    base: Duration,
    factor: u32,
    max: Option<Duration>,
}

impl BackoffStrategy for ExponentialBackoff {
    fn delay(&self, attempt: usize) -> Duration {
        if attempt == 0 {
            return Duration::from_millis(0);
        }
        let exponent = attempt.saturating_sub(1).min(u32::MAX as usize) as u32;
        let multiplier = u128::from(self.factor).saturating_pow(exponent);
        let nanos = self.base.as_nanos().saturating_mul(multiplier);
        let exp_delay = Duration::from_nanos(nanos.min(MAX_BACKOFF.as_nanos()) as u64);
        let capped = self.max.map(|m| exp_delay.min(m)).unwrap_or(exp_delay);
        capped.min(MAX_BACKOFF)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum BackoffKind {
    Constant(ConstantBackoff),
    Linear(LinearBackoff),
    Exponential(ExponentialBackoff),
}

impl BackoffStrategy for BackoffKind {
    fn delay(&self, attempt: usize) -> Duration {
        match self {
            BackoffKind::Constant(c) => c.delay(attempt),
            BackoffKind::Linear(l) => l.delay(attempt),
            BackoffKind::Exponential(e) => e.delay(attempt),
        }
    }
}

/// Backoff strategy wrapper delegating to the concrete strategies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backoff {
    kind: BackoffKind,
}

impl Backoff {
    /// Create a constant backoff strategy
    pub fn constant(delay: Duration) -> Self {
        Self { kind: BackoffKind::Constant(ConstantBackoff { delay }) }
    }

    /// Create a linear backoff strategy
    pub fn linear(base: Duration) -> Self {
        Self { kind: BackoffKind::Linear(LinearBackoff { base, max: None }) }
    }

    /// Create an exponential backoff strategy that doubles each retry.
    pub fn exponential(base: Duration) -> Self {
        Self {
            kind: BackoffKind::Exponential(ExponentialBackoff {
                base,
                factor: DEFAULT_FACTOR,
                max: None,
            }),
        }
    }

    /// Create an exponential backoff strategy with a custom multiplier.
    /// A factor of 1 degenerates to a constant schedule; 0 is rejected.
    pub fn exponential_with_factor(base: Duration, factor: u32) -> Result<Self, BackoffError> {
        if factor == 0 {
            return Err(BackoffError::FactorMustBePositive);
        }
        Ok(Self { kind: BackoffKind::Exponential(ExponentialBackoff { base, factor, max: None }) })
    }

    /// Set a maximum delay for the backoff (linear or exponential).
    /// Returns an error if called on `Constant`, if `max` is zero, or if `max < base`.
    pub fn with_max(mut self, max: Duration) -> Result<Self, BackoffError> {
        if max.is_zero() {
            return Err(BackoffError::MaxMustBePositive);
        }
        match &mut self.kind {
            BackoffKind::Exponential(ExponentialBackoff { max: existing, base, .. }) => {
                if max < *base {
                    return Err(BackoffError::MaxLessThanBase { base: *base, max });
                }
                *existing = Some(max);
                Ok(self)
            }
            BackoffKind::Linear(LinearBackoff { max: existing, base }) => {
                if max < *base {
                    return Err(BackoffError::MaxLessThanBase { base: *base, max });
                }
                *existing = Some(max);
                Ok(self)
            }
            BackoffKind::Constant(_) => Err(BackoffError::ConstantDoesNotSupportMax),
        }
    }

    /// Calculate the delay for a given attempt number (0-based; 0 = initial call, no delay).
    pub fn delay(&self, attempt: usize) -> Duration {
        self.kind.delay(attempt)
    }
}

impl BackoffStrategy for Backoff {
    fn delay(&self, attempt: usize) -> Duration {
        self.kind.delay(attempt)
    }
}
