//! # Run phase: concurrent run units and the shutdown race.
//!
//! Every registered worker's `run` is spawned as its own task ("run unit").
//! The control flow then waits for whichever comes first:
//!
//! ```text
//!   (a) errors.recv()        ─► RunOutcome::Failed(err)
//!   (b) shutdown.recv()      ─► RunOutcome::Signal(sig)
//!   (c) every unit returned  ─► RunOutcome::Finished
//! ```
//!
//! ## Rules
//! - A panic inside `run` is caught at the unit boundary and becomes
//!   [`SupervisorError::WorkerPanicked`].
//! - `Ok(())` from `run` means the worker finished; the others keep running.
//! - The race is biased in the order above: an error wins over a concurrent
//!   signal, and a signal wins over completion.
//! - Units are never aborted: [`RunPhase::detach`] lets them outlive `run()`.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinSet};
use tracing::Instrument;

use crate::{
    error::SupervisorError,
    events::{Bus, Event, EventKind},
};

use super::{panic_message, registry::Entry, shutdown::ShutdownSignal};

/// What ended the run phase.
pub(crate) enum RunOutcome {
    Failed(SupervisorError),
    Signal(ShutdownSignal),
    Finished,
}

/// Spawned run units and their shared error channel.
pub(crate) struct RunPhase {
    units: JoinSet<()>,
    errors: mpsc::Receiver<SupervisorError>,
}

impl RunPhase {
    /// Spawns one run unit per entry and publishes `WorkersStarted`.
    pub(crate) fn spawn(entries: &[Entry], bus: &Bus) -> Self {
        // Each unit sends at most one error, so sends never block.
        let (tx, errors) = mpsc::channel(entries.len().max(1));
        let mut units = JoinSet::new();

        for entry in entries {
            let worker = Arc::clone(&entry.worker);
            let name = Arc::clone(&entry.name);
            let span = entry.span.clone();
            let tx = tx.clone();

            units.spawn(async move {
                let res = AssertUnwindSafe(worker.run().instrument(span))
                    .catch_unwind()
                    .await;
                let err = match res {
                    Ok(Ok(())) => return,
                    Ok(Err(source)) => SupervisorError::WorkerExited {
                        worker: name,
                        source,
                    },
                    Err(panic) => SupervisorError::WorkerPanicked {
                        worker: name,
                        message: panic_message(panic.as_ref()),
                    },
                };
                let _ = tx.send(err).await;
            });
        }

        bus.publish(Event::new(EventKind::WorkersStarted));
        Self { units, errors }
    }

    /// Waits for the first terminal condition.
    pub(crate) async fn race(
        &mut self,
        shutdown: &mut mpsc::Receiver<ShutdownSignal>,
    ) -> RunOutcome {
        let units = &mut self.units;
        let errors = &mut self.errors;

        tokio::select! {
            biased;
            Some(err) = errors.recv() => RunOutcome::Failed(err),
            Some(sig) = shutdown.recv() => RunOutcome::Signal(sig),
            _ = async { while units.join_next().await.is_some() {} } => {
                // A unit sends its error before it completes.
                match errors.try_recv() {
                    Ok(err) => RunOutcome::Failed(err),
                    Err(_) => RunOutcome::Finished,
                }
            }
        }
    }

    /// Publishes errors that arrived after the race and detaches the units
    /// still running.
    pub(crate) fn detach(mut self, bus: &Bus) {
        while let Ok(err) = self.errors.try_recv() {
            publish_run_error(bus, &err);
        }
        self.units.detach_all();
    }
}

/// Publishes the event matching a run-phase error.
pub(crate) fn publish_run_error(bus: &Bus, err: &SupervisorError) {
    let kind = match err {
        SupervisorError::WorkerPanicked { .. } => EventKind::WorkerPanicked,
        e if e.is_canceled() => EventKind::WorkerCanceled,
        _ => EventKind::WorkerFailed,
    };
    bus.publish(
        Event::new(kind)
            .with_worker(err.worker())
            .with_reason(err.cause()),
    );
}
