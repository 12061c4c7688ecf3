//! # Backoff between init attempts.
//!
//! [`BackoffPolicy`] computes how long to wait before retry number `n` of a
//! worker's `init`:
//!
//! ```text
//! delay(n) = jitter( min(first × factor^n, max) )
//! ```
//!
//! The base delay depends only on `n`, so jitter output never feeds back into the
//! next computation.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use svcvisor::{BackoffPolicy, JitterPolicy};
//!
//! let backoff = BackoffPolicy {
//!     first: Duration::from_millis(50),
//!     max: Duration::from_secs(2),
//!     factor: 3.0,
//!     jitter: JitterPolicy::None,
//! };
//!
//! assert_eq!(backoff.next(0), Duration::from_millis(50));
//! assert_eq!(backoff.next(2), Duration::from_millis(450));
//! assert_eq!(backoff.next(8), Duration::from_secs(2));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Exponential backoff with a cap and optional jitter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    /// Delay before the first retry.
    pub first: Duration,
    /// Upper bound for any delay.
    pub max: Duration,
    /// Growth factor per retry (`1.0` = constant delay).
    pub factor: f64,
    /// Randomization applied to the capped delay.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// `first = 100ms`, `max = 10s`, `factor = 2.0`, no jitter.
    fn default() -> Self {
        Self {
            first: Duration::from_millis(100),
            max: Duration::from_secs(10),
            factor: 2.0,
            jitter: JitterPolicy::None,
        }
    }
}

impl BackoffPolicy {
    /// Constant delay, no growth and no jitter.
    pub fn constant(delay: Duration) -> Self {
        Self {
            first: delay,
            max: delay,
            factor: 1.0,
            jitter: JitterPolicy::None,
        }
    }

    /// Delay before retry `retry` (0-indexed).
    ///
    /// Non-finite or negative intermediate values (huge exponents, odd factors)
    /// collapse to [`BackoffPolicy::max`].
    pub fn next(&self, retry: u32) -> Duration {
        let exp = retry.min(i32::MAX as u32) as i32;
        let secs = self.first.as_secs_f64() * self.factor.powi(exp);

        let base = if !secs.is_finite() || secs < 0.0 || secs > self.max.as_secs_f64() {
            self.max
        } else {
            Duration::from_secs_f64(secs)
        };

        match self.jitter {
            JitterPolicy::Decorrelated => {
                self.jitter
                    .apply_decorrelated(self.first.min(self.max), base, self.max)
            }
            _ => self.jitter.apply(base),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exp(first_ms: u64, max: Duration, jitter: JitterPolicy) -> BackoffPolicy {
        BackoffPolicy {
            first: Duration::from_millis(first_ms),
            max,
            factor: 2.0,
            jitter,
        }
    }

    #[test]
    fn first_retry_uses_first_delay() {
        let policy = exp(100, Duration::from_secs(30), JitterPolicy::None);
        assert_eq!(policy.next(0), Duration::from_millis(100));
    }

    #[test]
    fn grows_exponentially() {
        let policy = exp(100, Duration::from_secs(30), JitterPolicy::None);
        let delays: Vec<_> = (0..4).map(|n| policy.next(n)).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(400),
                Duration::from_millis(800),
            ]
        );
    }

    #[test]
    fn constant_policy_never_changes() {
        let policy = BackoffPolicy::constant(Duration::from_millis(250));
        for n in 0..20 {
            assert_eq!(policy.next(n), Duration::from_millis(250));
        }
    }

    #[test]
    fn capped_at_max() {
        let policy = exp(100, Duration::from_secs(1), JitterPolicy::None);
        assert_eq!(policy.next(10), Duration::from_secs(1));
    }

    #[test]
    fn first_above_max_is_capped() {
        let policy = exp(10_000, Duration::from_secs(5), JitterPolicy::None);
        assert_eq!(policy.next(0), Duration::from_secs(5));
    }

    #[test]
    fn overflowing_exponent_collapses_to_max() {
        let policy = exp(100, Duration::from_secs(10), JitterPolicy::None);
        assert_eq!(policy.next(u32::MAX), Duration::from_secs(10));
    }

    #[test]
    fn equal_jitter_keeps_at_least_half() {
        let policy = exp(100, Duration::from_secs(30), JitterPolicy::Equal);
        for n in 0..12 {
            let base = (100.0 * 2.0f64.powi(n as i32)).min(30_000.0) as u64;
            let delay = policy.next(n);
            assert!(delay >= Duration::from_millis(base / 2), "retry {n}: {delay:?}");
            assert!(delay <= Duration::from_millis(base), "retry {n}: {delay:?}");
        }
    }

    #[test]
    fn full_jitter_never_exceeds_base() {
        let policy = exp(100, Duration::from_secs(30), JitterPolicy::Full);
        for n in 0..12 {
            let base = (100.0 * 2.0f64.powi(n as i32)).min(30_000.0) as u64;
            assert!(policy.next(n) <= Duration::from_millis(base));
        }
    }

    #[test]
    fn decorrelated_jitter_stays_within_floor_and_cap() {
        let policy = exp(100, Duration::from_secs(30), JitterPolicy::Decorrelated);
        for _ in 0..100 {
            let delay = policy.next(8);
            assert!(delay >= Duration::from_millis(100));
            assert!(delay <= Duration::from_secs(30));
        }
    }
}
