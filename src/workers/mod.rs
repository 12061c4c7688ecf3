//! # Worker abstractions.
//!
//! - [`Worker`] - required `init`/`run`/`terminate` lifecycle
//! - [`Liveness`], [`Readiness`] - optional health capabilities
//! - [`WorkerRef`] - shared reference to a worker (`Arc<dyn Worker>`)

mod worker;

pub use worker::{Liveness, Readiness, Worker, WorkerRef};
