//! Pre-configured retry policies for common call sites.
//!
//! These presets package the policy shapes we reach for when publishing
//! release artifacts, so call sites don't hand-tune attempt counts:
//!
//! - [`blob_upload`]: pushing large artifacts to cloud blob storage. Uploads
//!   are slow and the transient failure modes (throttling, connection resets)
//!   clear within seconds, so the schedule starts at 1 s and doubles.
//! - [`document_store`]: stored-procedure calls against a document database.
//!   Round trips are short, so retries start sooner and cap lower.
//!
//! Both retry every error: the wrapped calls are idempotent puts/upserts.
//! Callers with non-idempotent operations should build their own policy with
//! a `should_retry` predicate.
//!
//! # Example
//! ```rust
//! use relentless::presets;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let policy = presets::blob_upload::<std::io::Error>();
//! let result = policy
//!     .execute(|| async {
//!         // Replace with the real upload call
//!         Ok::<_, std::io::Error>("uploaded")
//!     })
//!     .await;
//! assert_eq!(result.unwrap(), "uploaded");
//! # });
//! ```

use crate::{Backoff, Jitter, RetryPolicy};
use std::time::Duration;

const BLOB_UPLOAD_ATTEMPTS: usize = 5;
const BLOB_UPLOAD_BASE_SECS: u64 = 1;
const BLOB_UPLOAD_CAP_SECS: u64 = 30;

const DOCUMENT_STORE_ATTEMPTS: usize = 5;
const DOCUMENT_STORE_BASE_MILLIS: u64 = 500;
const DOCUMENT_STORE_CAP_SECS: u64 = 10;

/// Retry policy for uploading artifacts to blob storage.
///
/// 5 attempts, exponential backoff from 1 s doubling per retry, capped at
/// 30 s, full jitter to spread concurrent uploads.
pub fn blob_upload<E>() -> RetryPolicy<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    RetryPolicy::builder()
        .max_attempts(BLOB_UPLOAD_ATTEMPTS)
        .backoff(
            Backoff::exponential(Duration::from_secs(BLOB_UPLOAD_BASE_SECS))
                .with_max(Duration::from_secs(BLOB_UPLOAD_CAP_SECS))
                .expect("valid backoff cap"),
        )
        .with_jitter(Jitter::full())
        .build()
        .expect("valid retry config")
}

/// Retry policy for stored-procedure calls against a document database.
///
/// 5 attempts, exponential backoff from 500 ms doubling per retry, capped at
/// 10 s, full jitter.
pub fn document_store<E>() -> RetryPolicy<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    RetryPolicy::builder()
        .max_attempts(DOCUMENT_STORE_ATTEMPTS)
        .backoff(
            Backoff::exponential(Duration::from_millis(DOCUMENT_STORE_BASE_MILLIS))
                .with_max(Duration::from_secs(DOCUMENT_STORE_CAP_SECS))
                .expect("valid backoff cap"),
        )
        .with_jitter(Jitter::full())
        .build()
        .expect("valid retry config")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_upload_policy_builds() {
        let policy = blob_upload::<std::io::Error>();
        let debug = format!("{:?}", policy);
        assert!(debug.contains("max_attempts: 5"));
    }

    #[test]
    fn document_store_policy_builds() {
        let policy = document_store::<std::io::Error>();
        let debug = format!("{:?}", policy);
        assert!(debug.contains("max_attempts: 5"));
    }

    #[tokio::test]
    async fn presets_pass_through_first_attempt_success() {
        let policy = document_store::<std::io::Error>();
        let value = policy.execute(|| async { Ok::<_, std::io::Error>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }
}
