//! # Worker abstraction and optional health capabilities.
//!
//! A [`Worker`] is a named unit with an `init → run → terminate` lifecycle. It may
//! additionally report liveness ([`Liveness`]) and readiness ([`Readiness`]).
//!
//! The optional capabilities are exposed through `Arc<Self>` accessors so the
//! supervisor can probe them once, at registration, and keep the resulting trait
//! objects for the health queries:
//!
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use svcvisor::{Liveness, Worker, WorkerError};
//!
//! struct Consumer;
//!
//! #[async_trait]
//! impl Worker for Consumer {
//!     async fn init(&self, _span: &tracing::Span) -> Result<(), WorkerError> { Ok(()) }
//!     async fn run(&self) -> Result<(), WorkerError> { Ok(()) }
//!     async fn terminate(&self) -> Result<(), WorkerError> { Ok(()) }
//!
//!     fn liveness(self: Arc<Self>) -> Option<Arc<dyn Liveness>> {
//!         Some(self)
//!     }
//! }
//!
//! #[async_trait]
//! impl Liveness for Consumer {
//!     async fn alive(&self) -> Result<(), WorkerError> { Ok(()) }
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use tracing::Span;

use crate::error::WorkerError;

/// Shared handle to a worker.
pub type WorkerRef = Arc<dyn Worker>;

/// # Supervised unit of work.
///
/// `run` and `terminate` are called concurrently on the same instance (from
/// different tasks), so implementations keep their mutable state behind interior
/// mutability (`CancellationToken`, `Mutex`, atomics).
///
/// ### Contract
/// - `init` is called once, before any `run`, never concurrently with another
///   worker's `init`.
/// - `run` blocks until the work is done or failed.
/// - `terminate` must make `run` return promptly. It is only called when `init`
///   succeeded.
#[async_trait]
pub trait Worker: Send + Sync + 'static {
    /// Prepares the worker. `span` is the worker's tracing span; keep a clone to
    /// instrument background futures.
    async fn init(&self, span: &Span) -> Result<(), WorkerError>;

    /// Does the work. Returning `Ok(())` means the worker finished on its own.
    async fn run(&self) -> Result<(), WorkerError>;

    /// Asks the worker to stop.
    async fn terminate(&self) -> Result<(), WorkerError>;

    /// Liveness capability, if implemented. Probed once at registration.
    fn liveness(self: Arc<Self>) -> Option<Arc<dyn Liveness>> {
        None
    }

    /// Readiness capability, if implemented. Probed once at registration.
    fn readiness(self: Arc<Self>) -> Option<Arc<dyn Readiness>> {
        None
    }
}

/// Worker that can report whether the process should be considered alive.
#[async_trait]
pub trait Liveness: Send + Sync + 'static {
    /// `Err` means "restart me".
    async fn alive(&self) -> Result<(), WorkerError>;
}

/// Worker that can report whether the process is ready to take traffic.
#[async_trait]
pub trait Readiness: Send + Sync + 'static {
    /// `Err` means "stop sending me traffic".
    async fn healthy(&self) -> Result<(), WorkerError>;
}
