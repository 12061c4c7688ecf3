//! # Lifecycle events emitted by the supervisor.
//!
//! [`EventKind`] classifies events by phase:
//! - **Registration**: capability probe results
//! - **Init**: ordered initialization, retries, failure
//! - **Run**: the terminal condition that ended the run phase
//! - **Termination**: per-worker results and the grace period outcome
//!
//! [`Event`] carries the metadata (worker, reason, attempt, durations).
//!
//! ## Ordering guarantees
//! Every event gets a globally unique, monotonically increasing `seq`.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use svcvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::InitRetryScheduled)
//!     .with_worker("db")
//!     .with_reason("connection refused")
//!     .with_attempt(2)
//!     .with_delay(Duration::from_millis(200));
//!
//! assert_eq!(ev.worker.as_deref(), Some("db"));
//! assert_eq!(ev.delay_ms, Some(200));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Registration ===
    /// A worker lacks an optional health capability (informational).
    ///
    /// Sets:
    /// - `worker`: worker name
    /// - `reason`: `"liveness"` or `"readiness"`
    CapabilityMissing,

    // === Init phase ===
    /// `run()` was entered; init is about to start.
    ServiceStarting,

    /// A worker's `init` is about to be called.
    ///
    /// Sets: `worker`
    WorkerInitializing,

    /// A worker's `init` succeeded; it joined the initialized set.
    ///
    /// Sets: `worker`
    WorkerInitialized,

    /// `init` failed and will be retried.
    ///
    /// Sets:
    /// - `worker`: worker name
    /// - `attempt`: failed attempt number (1-based)
    /// - `delay_ms`: delay before the next attempt
    /// - `reason`: error message
    InitRetryScheduled,

    /// `init` failed for good; startup is aborted.
    ///
    /// Sets: `worker`, `reason`
    WorkerInitFailed,

    /// A signal or shutdown request arrived while `init` was in progress;
    /// startup is aborted and the in-flight `init` is dropped.
    ///
    /// Sets: `worker`, `reason` (signal name)
    InitInterrupted,

    // === Run phase ===
    /// Every worker's `run` was launched.
    WorkersStarted,

    /// A worker's `run` returned an error.
    ///
    /// Sets: `worker`, `reason`
    WorkerFailed,

    /// A worker's `run` returned a cancellation error (graceful).
    ///
    /// Sets: `worker`, `reason`
    WorkerCanceled,

    /// A worker's `run` panicked; the panic was contained.
    ///
    /// Sets: `worker`, `reason` (panic message)
    WorkerPanicked,

    /// An OS signal or an explicit shutdown request arrived.
    ///
    /// Sets: `reason` (signal name)
    SignalReceived,

    /// Every `run` returned without error.
    AllWorkersFinished,

    // === Termination ===
    /// Shutdown path entered.
    ///
    /// Sets:
    /// - `grace_ms`: termination grace period
    /// - `delay_ms`: termination wait period
    ShutdownStarted,

    /// A worker's `terminate` returned `Ok`.
    ///
    /// Sets: `worker`
    WorkerTerminated,

    /// A worker's `terminate` returned an error or panicked.
    ///
    /// Sets: `worker`, `reason`
    WorkerTerminateFailed,

    /// Every initialized worker terminated within the grace period.
    AllTerminated,

    /// The grace period elapsed with terminations outstanding.
    ///
    /// Sets:
    /// - `grace_ms`: termination grace period
    /// - `reason`: comma separated names of workers still terminating
    GraceExceeded,

    /// `run()` is about to return. Always the last event of a supervisor.
    ShutdownCompleted,
}

/// Lifecycle event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp
/// - other fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Worker name, if applicable.
    pub worker: Option<Arc<str>>,
    /// Human-readable reason (errors, signal names, capability names).
    pub reason: Option<Arc<str>>,
    /// Attempt number (starting from 1).
    pub attempt: Option<u32>,
    /// Delay in milliseconds (retry delay, termination wait period).
    pub delay_ms: Option<u64>,
    /// Termination grace period in milliseconds.
    pub grace_ms: Option<u64>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            worker: None,
            reason: None,
            attempt: None,
            delay_ms: None,
            grace_ms: None,
        }
    }

    /// Attaches a worker name.
    #[inline]
    pub fn with_worker(mut self, worker: impl Into<Arc<str>>) -> Self {
        self.worker = Some(worker.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches an attempt number.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(as_millis(d));
        self
    }

    /// Attaches the grace period (stored as milliseconds).
    #[inline]
    pub fn with_grace(mut self, d: Duration) -> Self {
        self.grace_ms = Some(as_millis(d));
        self
    }

    /// True for events that terminate a supervisor's event stream.
    #[inline]
    pub fn is_final(&self) -> bool {
        matches!(self.kind, EventKind::ShutdownCompleted)
    }
}

fn as_millis(d: Duration) -> u64 {
    d.as_millis().min(u128::from(u64::MAX)) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_is_monotonic() {
        let a = Event::new(EventKind::ServiceStarting);
        let b = Event::new(EventKind::ServiceStarting);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn only_shutdown_completed_is_final() {
        assert!(Event::new(EventKind::ShutdownCompleted).is_final());
        assert!(!Event::new(EventKind::AllTerminated).is_final());
    }
}
