//! Abstraction for sleeping between attempts.
//!
//! Production code sleeps on the tokio timer; tests swap in `InstantSleeper` to
//! skip delays entirely or `TrackingSleeper` to assert on the exact backoff
//! schedule without waiting out real time.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Abstraction for sleeping/waiting
pub trait Sleeper: Send + Sync + std::fmt::Debug {
    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send>>;
}

/// Production sleeper using tokio runtime
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// Test sleeper that doesn't actually sleep
#[derive(Debug, Default, Clone, Copy)]
pub struct InstantSleeper;

impl Sleeper for InstantSleeper {
    fn sleep(&self, _duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        Box::pin(async {})
    }
}

/// Test sleeper that records every requested delay instead of waiting.
#[derive(Debug, Clone)]
pub struct TrackingSleeper {
    calls: Arc<Mutex<Vec<Duration>>>,
}

impl TrackingSleeper {
    pub fn new() -> Self {
        Self { calls: Arc::new(Mutex::new(Vec::new())) }
    }

    /// Number of sleeps requested so far.
    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// The delay requested by the `idx`-th sleep, if it happened.
    pub fn call_at(&self, idx: usize) -> Option<Duration> {
        self.calls.lock().unwrap().get(idx).copied()
    }

    /// Every requested delay, in order.
    pub fn all_calls(&self) -> Vec<Duration> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl Default for TrackingSleeper {
    fn default() -> Self {
        Self::new()
    }
}

impl Sleeper for TrackingSleeper {
    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        self.calls.lock().unwrap().push(duration);
        Box::pin(async {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn instant_sleeper_doesnt_sleep() {
        let sleeper = InstantSleeper;
        let start = std::time::Instant::now();
        sleeper.sleep(Duration::from_secs(10)).await;
        let elapsed = start.elapsed();
        // Should complete almost instantly
        assert!(elapsed < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn tracking_sleeper_records_calls() {
        let sleeper = TrackingSleeper::new();

        sleeper.sleep(Duration::from_millis(100)).await;
        sleeper.sleep(Duration::from_millis(200)).await;
        sleeper.sleep(Duration::from_millis(400)).await;

        assert_eq!(sleeper.calls(), 3);
        assert_eq!(sleeper.call_at(0), Some(Duration::from_millis(100)));
        assert_eq!(sleeper.call_at(1), Some(Duration::from_millis(200)));
        assert_eq!(sleeper.call_at(2), Some(Duration::from_millis(400)));
        assert_eq!(sleeper.call_at(3), None);
    }

    #[tokio::test]
    async fn tracking_sleeper_can_clear() {
        let sleeper = TrackingSleeper::new();

        sleeper.sleep(Duration::from_millis(100)).await;
        assert_eq!(sleeper.calls(), 1);

        sleeper.clear();
        assert_eq!(sleeper.calls(), 0);

        sleeper.sleep(Duration::from_millis(200)).await;
        assert_eq!(sleeper.all_calls(), vec![Duration::from_millis(200)]);
    }

    #[tokio::test]
    async fn clones_share_the_recorded_calls() {
        let sleeper = TrackingSleeper::new();
        let clone = sleeper.clone();

        clone.sleep(Duration::from_millis(5)).await;
        assert_eq!(sleeper.calls(), 1);
    }

    #[tokio::test]
    async fn tokio_sleeper_actually_sleeps() {
        let sleeper = TokioSleeper;
        let start = std::time::Instant::now();
        sleeper.sleep(Duration::from_millis(50)).await;
        let elapsed = start.elapsed();
        // Should take at least the requested duration
        assert!(elapsed >= Duration::from_millis(45)); // Small tolerance for timing jitter
    }
}
