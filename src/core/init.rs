//! # Init phase: sequential, fail-fast.
//!
//! ```text
//! for entry in registration order:
//!   publish WorkerInitializing
//!   race init (under RetryPolicy if any, InitRetryScheduled between attempts)
//!        against the shutdown channel
//!     ├─ Ok     → initialized.push(name), publish WorkerInitialized
//!     ├─ Err    → publish WorkerInitFailed, stop
//!     ├─ panic  → publish WorkerInitFailed, stop
//!     └─ signal → publish InitInterrupted, drop the in-flight init, stop
//! ```
//!
//! ## Rules
//! - No two `init` calls overlap.
//! - An `init` that completes on the same poll as a pending signal still counts.
//! - The initialized list is append-only and only written here.
//! - After the first failure no later worker is initialized.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc;
use tracing::Instrument;

use crate::{
    error::{SupervisorError, WorkerError},
    events::{Bus, Event, EventKind},
};

use super::{panic_message, registry::Entry, shutdown::ShutdownSignal};

/// Why startup was aborted.
pub(crate) enum InitStop {
    Failed(SupervisorError),
    Signal(ShutdownSignal),
}

/// Result of the init phase.
pub(crate) struct InitOutcome {
    /// Names whose `init` succeeded, in registration order.
    pub(crate) initialized: Vec<Arc<str>>,
    /// What aborted startup, if anything.
    pub(crate) stopped: Option<InitStop>,
}

/// Initializes every entry in order, stopping at the first failure or at the
/// first signal received on `shutdown`.
pub(crate) async fn init_all(
    entries: &[Entry],
    bus: &Bus,
    shutdown: &mut mpsc::Receiver<ShutdownSignal>,
) -> InitOutcome {
    let mut initialized = Vec::with_capacity(entries.len());

    for entry in entries {
        bus.publish(Event::new(EventKind::WorkerInitializing).with_worker(Arc::clone(&entry.name)));

        let attempt = AssertUnwindSafe(init_one(entry, bus)).catch_unwind();
        let res = tokio::select! {
            biased;
            res = attempt => res,
            Some(sig) = shutdown.recv() => {
                bus.publish(
                    Event::new(EventKind::InitInterrupted)
                        .with_worker(Arc::clone(&entry.name))
                        .with_reason(sig.as_str()),
                );
                return InitOutcome {
                    initialized,
                    stopped: Some(InitStop::Signal(sig)),
                };
            }
        };

        let err = match res {
            Ok(Ok(())) => {
                initialized.push(Arc::clone(&entry.name));
                bus.publish(
                    Event::new(EventKind::WorkerInitialized).with_worker(Arc::clone(&entry.name)),
                );
                continue;
            }
            Ok(Err(source)) => SupervisorError::WorkerInitFailed {
                worker: Arc::clone(&entry.name),
                source,
            },
            Err(panic) => SupervisorError::WorkerPanicked {
                worker: Arc::clone(&entry.name),
                message: panic_message(panic.as_ref()),
            },
        };

        bus.publish(
            Event::new(EventKind::WorkerInitFailed)
                .with_worker(Arc::clone(&entry.name))
                .with_reason(err.cause()),
        );
        return InitOutcome {
            initialized,
            stopped: Some(InitStop::Failed(err)),
        };
    }

    InitOutcome {
        initialized,
        stopped: None,
    }
}

/// Calls `init` once, or under the entry's retry policy.
async fn init_one(entry: &Entry, bus: &Bus) -> Result<(), WorkerError> {
    let span = &entry.span;
    let Some(policy) = entry.retry else {
        return entry.worker.init(span).instrument(span.clone()).await;
    };

    policy
        .retry(
            || entry.worker.init(span).instrument(span.clone()),
            |attempt, delay, err| {
                bus.publish(
                    Event::new(EventKind::InitRetryScheduled)
                        .with_worker(Arc::clone(&entry.name))
                        .with_attempt(attempt)
                        .with_delay(delay)
                        .with_reason(err.to_string()),
                );
            },
        )
        .await
}
