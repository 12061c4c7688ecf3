//! Error types used by the supervisor and by workers.
//!
//! This module defines two enums:
//!
//! - [`WorkerError`] — returned by worker lifecycle methods and health capabilities.
//! - [`SupervisorError`] — raised by the supervisor itself; every variant carries the
//!   name of the worker it concerns.
//!
//! Both provide `as_label` for logs. [`SupervisorError`] values never escape
//! [`Supervisor::run`](crate::Supervisor::run): they are published as events and
//! summarized in the [`ShutdownReport`](crate::ShutdownReport). The only error a
//! caller handles directly is [`SupervisorError::DuplicateWorker`], returned at
//! registration time.

use std::sync::Arc;

use thiserror::Error;

/// # Errors produced by workers.
///
/// `Display` of [`WorkerError::Fail`] is the bare message, so health reports show
/// exactly what the worker said (`"disk full"`, not `"error: disk full"`).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum WorkerError {
    /// The worker failed.
    #[error("{message}")]
    Fail {
        /// Human-readable failure message.
        message: String,
    },

    /// The worker stopped because its context was cancelled.
    ///
    /// Treated as a graceful exit when it ends the run phase (logged as a warning).
    #[error("context cancelled")]
    Canceled,

    /// I/O failure (listener bind, socket errors, ...).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    /// Shorthand for [`WorkerError::Fail`].
    ///
    /// # Example
    /// ```
    /// use svcvisor::WorkerError;
    ///
    /// let err = WorkerError::fail("disk full");
    /// assert_eq!(err.to_string(), "disk full");
    /// ```
    pub fn fail(message: impl Into<String>) -> Self {
        WorkerError::Fail {
            message: message.into(),
        }
    }

    /// True for [`WorkerError::Canceled`].
    pub fn is_canceled(&self) -> bool {
        matches!(self, WorkerError::Canceled)
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            WorkerError::Fail { .. } => "worker_failed",
            WorkerError::Canceled => "worker_canceled",
            WorkerError::Io(_) => "worker_io",
        }
    }
}

/// # Errors produced by the supervisor.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SupervisorError {
    /// A worker with the same name is already registered.
    #[error("duplicate worker name: {worker}")]
    DuplicateWorker {
        /// The offending name.
        worker: String,
    },

    /// `init` failed (after exhausting the retry policy, if any).
    #[error("worker {worker} failed to initialize: {source}")]
    WorkerInitFailed {
        /// Worker name.
        worker: Arc<str>,
        /// Last error returned by `init`.
        #[source]
        source: WorkerError,
    },

    /// `run` returned an error.
    #[error("worker {worker} exited: {source}")]
    WorkerExited {
        /// Worker name.
        worker: Arc<str>,
        /// Error returned by `run`.
        #[source]
        source: WorkerError,
    },

    /// A lifecycle method panicked; the panic was contained.
    #[error("worker {worker} panicked: {message}")]
    WorkerPanicked {
        /// Worker name.
        worker: Arc<str>,
        /// Panic payload, when it was a string.
        message: String,
    },

    /// `terminate` returned an error.
    #[error("worker {worker} terminated with error: {source}")]
    WorkerTerminateFailed {
        /// Worker name.
        worker: Arc<str>,
        /// Error returned by `terminate`.
        #[source]
        source: WorkerError,
    },
}

impl SupervisorError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use svcvisor::SupervisorError;
    ///
    /// let err = SupervisorError::DuplicateWorker { worker: "api".into() };
    /// assert_eq!(err.as_label(), "duplicate_worker");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SupervisorError::DuplicateWorker { .. } => "duplicate_worker",
            SupervisorError::WorkerInitFailed { .. } => "worker_init_failed",
            SupervisorError::WorkerExited { .. } => "worker_exited",
            SupervisorError::WorkerPanicked { .. } => "worker_panicked",
            SupervisorError::WorkerTerminateFailed { .. } => "worker_terminate_failed",
        }
    }

    /// Name of the worker this error concerns.
    pub fn worker(&self) -> &str {
        match self {
            SupervisorError::DuplicateWorker { worker } => worker,
            SupervisorError::WorkerInitFailed { worker, .. }
            | SupervisorError::WorkerExited { worker, .. }
            | SupervisorError::WorkerPanicked { worker, .. }
            | SupervisorError::WorkerTerminateFailed { worker, .. } => worker,
        }
    }

    /// The underlying cause without the worker prefix, for event reasons.
    pub(crate) fn cause(&self) -> String {
        match self {
            SupervisorError::DuplicateWorker { .. } => self.to_string(),
            SupervisorError::WorkerInitFailed { source, .. }
            | SupervisorError::WorkerExited { source, .. }
            | SupervisorError::WorkerTerminateFailed { source, .. } => source.to_string(),
            SupervisorError::WorkerPanicked { message, .. } => message.clone(),
        }
    }

    /// True when the underlying worker error is a cancellation.
    ///
    /// The run phase logs such causes as warnings instead of failures.
    pub fn is_canceled(&self) -> bool {
        match self {
            SupervisorError::WorkerExited { source, .. } => source.is_canceled(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fail_displays_bare_message() {
        assert_eq!(WorkerError::fail("disk full").to_string(), "disk full");
    }

    #[test]
    fn exited_with_canceled_is_canceled() {
        let err = SupervisorError::WorkerExited {
            worker: "consumer".into(),
            source: WorkerError::Canceled,
        };
        assert!(err.is_canceled());
        assert_eq!(err.worker(), "consumer");
        assert_eq!(err.to_string(), "worker consumer exited: context cancelled");
    }

    #[test]
    fn panicked_is_not_canceled() {
        let err = SupervisorError::WorkerPanicked {
            worker: "consumer".into(),
            message: "boom".into(),
        };
        assert!(!err.is_canceled());
        assert_eq!(err.as_label(), "worker_panicked");
    }
}
