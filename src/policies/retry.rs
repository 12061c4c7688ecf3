//! # Init retry policy.
//!
//! [`RetryPolicy`] decides how many times a worker's `init` is attempted and how
//! long to wait in between. The supervisor treats it as opaque: "call until
//! success or exhaustion".
//!
//! ```text
//! attempt 1 ─► Err ─► on_retry(1, backoff.next(0)) ─► sleep
//! attempt 2 ─► Err ─► on_retry(2, backoff.next(1)) ─► sleep
//! ...
//! attempt N ─► Err ─► return Err (last error)
//! ```

use std::time::Duration;

use crate::error::WorkerError;
use crate::policies::backoff::BackoffPolicy;

/// How often and how patiently to retry a failing `init`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Total number of calls, including the first one. `0` is treated as `1`.
    pub attempts: u32,
    /// Delay between calls.
    pub backoff: BackoffPolicy,
}

impl Default for RetryPolicy {
    /// 10 attempts with [`BackoffPolicy::default`].
    fn default() -> Self {
        Self {
            attempts: 10,
            backoff: BackoffPolicy::default(),
        }
    }
}

impl RetryPolicy {
    /// Policy with `attempts` calls and the given backoff.
    pub fn new(attempts: u32, backoff: BackoffPolicy) -> Self {
        Self { attempts, backoff }
    }

    /// Runs `op` until it succeeds or the attempts are exhausted.
    ///
    /// `on_retry(attempt, delay, &err)` is called after every failed attempt that
    /// will be retried, before sleeping. Returns the last error on exhaustion.
    ///
    /// # Example
    /// ```rust
    /// use std::time::Duration;
    /// use svcvisor::{BackoffPolicy, RetryPolicy, WorkerError};
    ///
    /// # tokio_test_block(async {
    /// let policy = RetryPolicy::new(3, BackoffPolicy::constant(Duration::from_millis(1)));
    /// let mut calls = 0;
    /// let res = policy
    ///     .retry(
    ///         || {
    ///             calls += 1;
    ///             let ok = calls == 3;
    ///             async move { if ok { Ok(()) } else { Err(WorkerError::fail("not yet")) } }
    ///         },
    ///         |_, _, _| {},
    ///     )
    ///     .await;
    /// assert!(res.is_ok());
    /// assert_eq!(calls, 3);
    /// # });
    /// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
    /// #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
    /// # }
    /// ```
    pub async fn retry<F, Fut, R>(&self, mut op: F, mut on_retry: R) -> Result<(), WorkerError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<(), WorkerError>>,
        R: FnMut(u32, Duration, &WorkerError),
    {
        let attempts = self.attempts.max(1);
        let mut attempt = 1;

        loop {
            let err = match op().await {
                Ok(()) => return Ok(()),
                Err(err) => err,
            };
            if attempt >= attempts {
                return Err(err);
            }

            let delay = self.backoff.next(attempt - 1);
            on_retry(attempt, delay, &err);
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn fast(attempts: u32) -> RetryPolicy {
        RetryPolicy::new(attempts, BackoffPolicy::constant(Duration::from_millis(1)))
    }

    #[tokio::test]
    async fn succeeds_first_time_without_retry() {
        let mut retries = 0;
        let res = fast(5).retry(|| async { Ok(()) }, |_, _, _| retries += 1).await;
        assert!(res.is_ok());
        assert_eq!(retries, 0);
    }

    #[tokio::test]
    async fn returns_last_error_when_exhausted() {
        let calls = AtomicU32::new(0);
        let res = fast(3)
            .retry(
                || {
                    let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                    async move { Err(WorkerError::fail(format!("boom #{n}"))) }
                },
                |_, _, _| {},
            )
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(res.unwrap_err().to_string(), "boom #3");
    }

    #[tokio::test]
    async fn reports_each_scheduled_retry() {
        let mut seen = Vec::new();
        let policy = RetryPolicy::new(
            3,
            BackoffPolicy {
                first: Duration::from_millis(1),
                max: Duration::from_millis(10),
                factor: 2.0,
                jitter: Default::default(),
            },
        );
        let _ = policy
            .retry(
                || async { Err(WorkerError::fail("nope")) },
                |attempt, delay, _| seen.push((attempt, delay)),
            )
            .await;

        assert_eq!(
            seen,
            vec![
                (1, Duration::from_millis(1)),
                (2, Duration::from_millis(2)),
            ]
        );
    }

    #[tokio::test]
    async fn zero_attempts_still_calls_once() {
        let calls = AtomicU32::new(0);
        let _ = fast(0)
            .retry(
                || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err(WorkerError::fail("nope")) }
                },
                |_, _, _| {},
            )
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
