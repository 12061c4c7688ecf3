//! # LogWriter: lifecycle events as `tracing` records
//!
//! The structured, leveled log sink of the supervisor. Always installed by
//! [`SupervisorBuilder`](crate::SupervisorBuilder); the process decides where the
//! records go by installing a `tracing` subscriber.
//!
//! | Level | Events |
//! |-------|--------|
//! | debug | `WorkerInitializing`, `WorkerInitialized` |
//! | info  | `CapabilityMissing`, `ServiceStarting`, `WorkersStarted`, `AllWorkersFinished`, `ShutdownStarted`, `WorkerTerminated`, `AllTerminated`, `ShutdownCompleted` |
//! | warn  | `InitRetryScheduled`, `InitInterrupted`, `WorkerCanceled`, `SignalReceived`, `GraceExceeded` |
//! | error | `WorkerInitFailed`, `WorkerFailed`, `WorkerPanicked`, `WorkerTerminateFailed` |

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Writes every lifecycle event through `tracing`, tagged with service name and version.
pub struct LogWriter {
    service: String,
    version: String,
}

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new(service: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            version: version.into(),
        }
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let service = self.service.as_str();
        let version = self.version.as_str();
        let worker = e.worker.as_deref().unwrap_or_default();
        let reason = e.reason.as_deref().unwrap_or_default();

        match e.kind {
            EventKind::CapabilityMissing => {
                info!(service, worker, capability = reason, "Worker does not implement capability");
            }
            EventKind::ServiceStarting => {
                info!(service, version, "Starting up service");
            }
            EventKind::WorkerInitializing => {
                debug!(service, worker, "Initializing worker");
            }
            EventKind::WorkerInitialized => {
                debug!(service, worker, "Worker initialized");
            }
            EventKind::InitRetryScheduled => {
                warn!(
                    service,
                    worker,
                    attempt = e.attempt,
                    delay_ms = e.delay_ms,
                    error = reason,
                    "Worker init failed, retrying"
                );
            }
            EventKind::WorkerInitFailed => {
                error!(service, worker, error = reason, "Could not initialize worker");
            }
            EventKind::InitInterrupted => {
                warn!(service, worker, signal = reason, "Caught signal while initializing worker");
            }
            EventKind::WorkersStarted => {
                info!(service, "All workers started");
            }
            EventKind::WorkerFailed => {
                error!(service, worker, error = reason, "Worker run failure");
            }
            EventKind::WorkerCanceled => {
                warn!(service, worker, error = reason, "Worker context canceled");
            }
            EventKind::WorkerPanicked => {
                error!(service, worker, panic = reason, "Worker panicked");
            }
            EventKind::SignalReceived => {
                warn!(service, signal = reason, "Caught signal");
            }
            EventKind::AllWorkersFinished => {
                info!(service, "All workers have finished");
            }
            EventKind::ShutdownStarted => {
                info!(
                    service,
                    termination_grace_period_ms = e.grace_ms,
                    termination_wait_period_ms = e.delay_ms,
                    "Shutting down service"
                );
            }
            EventKind::WorkerTerminated => {
                info!(service, worker, "Worker terminated");
            }
            EventKind::WorkerTerminateFailed => {
                error!(service, worker, error = reason, "Terminated with error");
            }
            EventKind::AllTerminated => {
                info!(service, "All workers terminated");
            }
            EventKind::GraceExceeded => {
                warn!(
                    service,
                    termination_grace_period_ms = e.grace_ms,
                    stuck = reason,
                    "Termination grace period exceeded, giving up waiting"
                );
            }
            EventKind::ShutdownCompleted => {
                info!(service, "Service shutdown completed");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
