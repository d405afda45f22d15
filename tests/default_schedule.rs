//! Pins the out-of-the-box policy: 5 attempts, exponential backoff from 1 s
//! doubling per retry, no jitter.

use relentless::{RetryPolicy, TrackingSleeper};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("transient: {0}")]
struct Transient(usize);

#[tokio::test]
async fn default_schedule_doubles_from_one_second() {
    let sleeper = TrackingSleeper::new();
    let policy = RetryPolicy::builder().with_sleeper(sleeper.clone()).build().unwrap();

    let counter = Arc::new(AtomicUsize::new(0));
    let counter_clone = counter.clone();

    let result = policy
        .execute(|| {
            let counter = counter_clone.clone();
            async move {
                let call = counter.fetch_add(1, Ordering::SeqCst);
                if call < 4 {
                    Err(Transient(call))
                } else {
                    Ok("recovered")
                }
            }
        })
        .await;

    assert_eq!(result.unwrap(), "recovered");
    assert_eq!(counter.load(Ordering::SeqCst), 5);
    assert_eq!(
        sleeper.all_calls(),
        vec![
            Duration::from_secs(1),
            Duration::from_secs(2),
            Duration::from_secs(4),
            Duration::from_secs(8),
        ]
    );
}

#[tokio::test]
async fn default_policy_returns_fifth_error_on_exhaustion() {
    let sleeper = TrackingSleeper::new();
    let policy = RetryPolicy::builder().with_sleeper(sleeper.clone()).build().unwrap();

    let counter = Arc::new(AtomicUsize::new(0));
    let counter_clone = counter.clone();

    let result: Result<(), Transient> = policy
        .execute(|| {
            let counter = counter_clone.clone();
            async move { Err(Transient(counter.fetch_add(1, Ordering::SeqCst) + 1)) }
        })
        .await;

    assert_eq!(counter.load(Ordering::SeqCst), 5);
    assert_eq!(result.unwrap_err(), Transient(5));
    assert_eq!(sleeper.calls(), 4);
}
