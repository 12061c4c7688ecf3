//! # Termination: wait period, concurrent terminate, grace period bound.
//!
//! ```text
//! publish ShutdownStarted
//! spawn pass {
//!     sleep(wait)
//!     spawn terminate() per initialized worker
//!     join all ─► WorkerTerminated | WorkerTerminateFailed (one per worker)
//! }
//! timeout(grace, pass)
//!   ├─ Ok      → publish AllTerminated
//!   └─ Elapsed → publish GraceExceeded (names still terminating), pass detached
//! ```
//!
//! ## Rules
//! - Only initialized workers are terminated.
//! - Every initialized worker gets `terminate`, even when the wait period
//!   outlasts the grace period.
//! - One failing or panicking `terminate` does not hold back the others.
//! - The grace period is measured from `ShutdownStarted` and includes the wait
//!   period.
//! - Nothing is cancelled on expiry; the pass keeps running detached.

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures::FutureExt;
use tokio::task::JoinSet;
use tracing::{Instrument, warn};

use crate::{
    error::SupervisorError,
    events::{Bus, Event, EventKind},
};

use super::{config::SupervisorConfig, panic_message, registry::Entry};

type TerminateResult = (Arc<str>, Result<(), SupervisorError>);

/// Names whose `terminate` has not returned yet, shared with the pass.
type Pending = Arc<Mutex<Vec<Arc<str>>>>;

/// Terminates the initialized workers within the grace period.
///
/// Returns the names whose `terminate` had not returned when the grace period
/// expired, in initialization order.
pub(crate) async fn terminate_all(
    entries: Arc<[Entry]>,
    initialized: &[Arc<str>],
    cfg: &SupervisorConfig,
    bus: &Bus,
) -> Vec<Arc<str>> {
    bus.publish(
        Event::new(EventKind::ShutdownStarted)
            .with_grace(cfg.grace)
            .with_delay(cfg.wait),
    );

    let pending: Pending = Arc::new(Mutex::new(initialized.to_vec()));
    let pass = tokio::spawn(terminate_pass(
        entries,
        initialized.to_vec(),
        cfg.wait,
        bus.clone(),
        Arc::clone(&pending),
    ));

    // Dropping the handle on expiry detaches the pass.
    match tokio::time::timeout(cfg.grace, pass).await {
        Ok(joined) => {
            if let Err(err) = joined {
                warn!(error = %err, "Termination pass ended abnormally");
            }
            bus.publish(Event::new(EventKind::AllTerminated));
        }
        Err(_elapsed) => {
            let stuck = snapshot(&pending)
                .iter()
                .map(|n| &**n)
                .collect::<Vec<_>>()
                .join(", ");
            bus.publish(
                Event::new(EventKind::GraceExceeded)
                    .with_grace(cfg.grace)
                    .with_reason(stuck),
            );
        }
    }

    snapshot(&pending)
}

fn snapshot(pending: &Pending) -> Vec<Arc<str>> {
    pending.lock().unwrap_or_else(PoisonError::into_inner).clone()
}

/// Sleeps the wait period, then terminates every initialized worker
/// concurrently and reports each result.
async fn terminate_pass(
    entries: Arc<[Entry]>,
    initialized: Vec<Arc<str>>,
    wait: Duration,
    bus: Bus,
    pending: Pending,
) {
    if !wait.is_zero() {
        tokio::time::sleep(wait).await;
    }

    let mut units: JoinSet<TerminateResult> = JoinSet::new();
    for entry in entries.iter().filter(|e| initialized.contains(&e.name)) {
        units.spawn(terminate_one(entry));
    }

    while let Some(joined) = units.join_next().await {
        // Units catch their own panics and are never aborted.
        let Ok((name, res)) = joined else { continue };
        pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|n| *n != name);

        match res {
            Ok(()) => bus.publish(Event::new(EventKind::WorkerTerminated).with_worker(name)),
            Err(err) => bus.publish(
                Event::new(EventKind::WorkerTerminateFailed)
                    .with_worker(name)
                    .with_reason(err.cause()),
            ),
        }
    }
}

fn terminate_one(entry: &Entry) -> impl Future<Output = TerminateResult> + Send + 'static {
    let worker = Arc::clone(&entry.worker);
    let name = Arc::clone(&entry.name);
    let span = entry.span.clone();

    async move {
        let res = match AssertUnwindSafe(worker.terminate().instrument(span))
            .catch_unwind()
            .await
        {
            Ok(Ok(())) => Ok(()),
            Ok(Err(source)) => Err(SupervisorError::WorkerTerminateFailed {
                worker: Arc::clone(&name),
                source,
            }),
            Err(panic) => Err(SupervisorError::WorkerPanicked {
                worker: Arc::clone(&name),
                message: panic_message(panic.as_ref()),
            }),
        };
        (name, res)
    }
}
