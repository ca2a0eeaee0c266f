//! Outer retry schedule shared by every store client.
//!
//! Ported from the source system's `measure_db_overhead_and_retry`, which
//! retries transient failures on a fixed backoff of `[0.1, 0.5, 1.4]`
//! seconds before giving up. A non-transient failure is never retried.

use crate::error::{StorageError, StorageResult};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// The outer retry schedule, in order. One initial attempt plus these delays
/// between subsequent attempts: 4 attempts total on a persistently transient
/// failure.
pub const RETRY_SCHEDULE_MS: [u64; 3] = [100, 500, 1400];

/// Runs `op` with the outer retry schedule, retrying only on
/// [`StorageError::is_transient`].
pub async fn with_retry<F, Fut, T>(store: &'static str, mut op: F) -> StorageResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = StorageResult<T>>,
{
    let mut attempt = 0usize;
    loop {
        match op().await {
            Ok(v) => return Ok(v),
            Err(e) if e.is_transient() && attempt < RETRY_SCHEDULE_MS.len() => {
                let delay = RETRY_SCHEDULE_MS[attempt];
                warn!(store, attempt, delay_ms = delay, error = %e, "retrying transient storage failure");
                tokio::time::sleep(Duration::from_millis(delay)).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn retries_transient_exactly_schedule_length_plus_one() {
        let calls = AtomicUsize::new(0);
        let result: StorageResult<()> = with_retry("test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(StorageError::Transient("boom".into())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), RETRY_SCHEDULE_MS.len() + 1);
    }

    #[tokio::test]
    async fn does_not_retry_non_transient() {
        let calls = AtomicUsize::new(0);
        let result: StorageResult<()> = with_retry("test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(StorageError::NotFound("x".into())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn succeeds_without_retry_when_first_attempt_ok() {
        let calls = AtomicUsize::new(0);
        let result = with_retry("test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, StorageError>(42) }
        })
        .await
        .unwrap();
        assert_eq!(result, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
