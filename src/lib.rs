//! # svcvisor
//!
//! **svcvisor** is a process-local worker supervisor.
//!
//! It manages a fixed set of named long-running units ("workers") inside one
//! process: they initialize in a deterministic order, run concurrently, and shut
//! down together (on their own failure, on an OS signal or on an explicit
//! request) within a bounded time and without leaking supervisor-owned tasks.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │    Worker    │   │    Worker    │   │    Worker    │
//!     │ (+Liveness)  │   │ (+Readiness) │   │              │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  SupervisorBuilder::register(name, worker)                        │
//! │  - unique names, registration order kept                          │
//! │  - capability probe (liveness / readiness), cached                │
//! │  - optional RetryPolicy for init                                  │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Supervisor::run()                                                │
//! │  init (sequential) ─► run (concurrent) ─► race ─► terminate       │
//! └──────┬──────────────────────────────────────────────────┬─────────┘
//!        │ publishes lifecycle events                       │
//!        ▼                                                  ▼
//! ┌──────────────────────────────┐            ┌──────────────────────────┐
//! │  Bus (broadcast channel)     │            │  ShutdownReport          │
//! └──────────────┬───────────────┘            └──────────────────────────┘
//!                ▼
//!        SubscriberSet (per-subscriber queues)
//!         ├──► LogWriter (tracing)
//!         └──► user subscribers
//!
//!  Health (any time):  liveness() / readiness() ─► HealthReport
//! ```
//!
//! ### Lifecycle
//! ```text
//! init:       for worker in registration order
//!               ├─ init (RetryPolicy if any) ─ Ok ─► initialized += name
//!               ├─ Err / panic ──────────────────────► skip run, go to termination
//!               └─ signal / shutdown request ────────► skip run, go to termination
//!
//! run:        spawn run() per worker (panics contained)
//!             first of:
//!               ├─ a worker error            ─► WorkerFailed / WorkerCanceled / WorkerPanicked
//!               ├─ signal / shutdown request ─► SignalReceived
//!               └─ every run() returned      ─► AllWorkersFinished
//!
//! terminate:  pass = spawn { sleep(wait); terminate(initialized) concurrently }
//!             timeout(grace, pass)
//!               ├─ all returned ─► AllTerminated
//!               └─ elapsed      ─► GraceExceeded (pass keeps running detached)
//! ```
//!
//! ## Features
//! | Area              | Description                                                | Key types / traits                          |
//! |-------------------|------------------------------------------------------------|---------------------------------------------|
//! | **Workers**       | Lifecycle contract and optional health capabilities.       | [`Worker`], [`Liveness`], [`Readiness`]     |
//! | **Supervision**   | Registration, ordered init, concurrent run, shutdown.      | [`Supervisor`], [`SupervisorBuilder`]       |
//! | **Shutdown**      | Explicit requests and the final summary.                   | [`ShutdownHandle`], [`ShutdownReport`]      |
//! | **Health**        | Aggregated liveness and readiness.                         | [`Health`], [`HealthReport`]                |
//! | **Policies**      | Init retry with backoff and jitter.                        | [`RetryPolicy`], [`BackoffPolicy`]          |
//! | **Subscriber API**| Hook into lifecycle events.                                | [`Subscribe`], [`Event`], [`EventKind`]     |
//! | **Errors**        | Typed errors for workers and the supervisor.               | [`WorkerError`], [`SupervisorError`]        |
//! | **Configuration** | Service metadata, grace and wait periods.                  | [`SupervisorConfig`]                        |
//!
//! ## Optional features
//! - `http` (default): `/live` and `/ready` axum routes and an [`http::HttpServer`] worker.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use async_trait::async_trait;
//! use tokio_util::sync::CancellationToken;
//! use svcvisor::{Supervisor, SupervisorConfig, ShutdownTrigger, Worker, WorkerError};
//!
//! struct Ticker {
//!     stop: CancellationToken,
//! }
//!
//! #[async_trait]
//! impl Worker for Ticker {
//!     async fn init(&self, _span: &tracing::Span) -> Result<(), WorkerError> {
//!         Ok(())
//!     }
//!
//!     async fn run(&self) -> Result<(), WorkerError> {
//!         while !self.stop.is_cancelled() {
//!             tokio::time::sleep(Duration::from_millis(10)).await;
//!         }
//!         Ok(())
//!     }
//!
//!     async fn terminate(&self) -> Result<(), WorkerError> {
//!         self.stop.cancel();
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = SupervisorConfig::new("ticker-service", "1.0.0")
//!         .with_grace(Duration::from_secs(5))
//!         .with_trap_signals(false);
//!
//!     let sup = Supervisor::builder(cfg)
//!         .register("ticker", Arc::new(Ticker { stop: CancellationToken::new() }))?
//!         .build();
//!
//!     let shutdown = sup.shutdown_handle();
//!     tokio::spawn(async move {
//!         tokio::time::sleep(Duration::from_millis(50)).await;
//!         shutdown.request();
//!     });
//!
//!     let report = sup.run().await;
//!     assert!(matches!(report.trigger, ShutdownTrigger::Signal(_)));
//!     assert!(report.is_clean());
//!     Ok(())
//! }
//! ```

mod core;
mod error;
mod events;
mod health;
mod policies;
mod subscribers;
mod workers;

#[cfg(feature = "http")]
pub mod http;

// ---- Public re-exports ----

pub use self::core::{
    ShutdownHandle, ShutdownReport, ShutdownSignal, ShutdownTrigger, Supervisor,
    SupervisorBuilder, SupervisorConfig,
};
pub use error::{SupervisorError, WorkerError};
pub use events::{Event, EventKind};
pub use health::{Health, HealthReport};
pub use policies::{BackoffPolicy, JitterPolicy, RetryPolicy};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
pub use workers::{Liveness, Readiness, Worker, WorkerRef};
