//! Jitter strategies for randomizing retry delays.
//!
//! The default policy applies no jitter, keeping the backoff schedule exactly
//! reproducible. When many clients retry against the same endpoint, `Full` or
//! `Equal` spreads their attempts out:
//! - `None`: use the computed delay as-is.
//! - `Full`: uniform in `[0, delay]`.
//! - `Equal`: uniform in `[delay/2, delay]`, keeps a floor while adding randomness.
//!
//! RNG: `rand`'s thread-local RNG by default; a deterministic RNG can be
//! injected via `apply_with_rng`. Millisecond conversions saturate to
//! `u64::MAX` to avoid panics on very large durations.

use rand::{rng, Rng};
use std::time::Duration;

/// Jitter strategy for randomizing retry delays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Jitter {
    /// No jitter - use exact backoff delay
    #[default]
    None,
    /// Full jitter: random between 0 and delay
    Full,
    /// Equal jitter: random between delay/2 and delay
    Equal,
}

impl Jitter {
    /// Create a full jitter strategy
    pub fn full() -> Self {
        Jitter::Full
    }

    /// Create an equal jitter strategy
    pub fn equal() -> Self {
        Jitter::Equal
    }

    /// Apply jitter to a delay duration
    pub fn apply(&self, delay: Duration) -> Duration {
        let mut rng = rng();
        self.apply_internal(delay, &mut rng)
    }

    /// Apply jitter with a custom RNG (for testing)
    pub fn apply_with_rng<R: Rng>(&self, delay: Duration, rng: &mut R) -> Duration {
        self.apply_internal(delay, rng)
    }

    fn as_millis_saturated(duration: Duration) -> u64 {
        duration.as_millis().try_into().unwrap_or(u64::MAX) // Saturate extremely large durations
    }

    fn apply_internal<R: Rng>(&self, delay: Duration, rng: &mut R) -> Duration {
        match self {
            Jitter::None => delay,
            Jitter::Full => {
                let millis = Self::as_millis_saturated(delay);
                if millis == 0 {
                    return Duration::from_millis(0);
                }
                let jittered = rng.random_range(0..=millis);
                Duration::from_millis(jittered)
            }
            Jitter::Equal => {
                let millis = Self::as_millis_saturated(delay);
                if millis == 0 {
                    return Duration::from_millis(0);
                }
                let half = millis / 2;
                let jittered = rng.random_range(half..=millis);
                Duration::from_millis(jittered)
            }
        }
    }
}
