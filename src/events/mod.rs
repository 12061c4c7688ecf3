//! Lifecycle events: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `SupervisorBuilder` (capability probe), `Supervisor::run`
//!   (init, run race, termination).
//! - **Consumer**: the listener spawned by `Supervisor::run`, which fans out to the
//!   [`SubscriberSet`](crate::SubscriberSet) and stops after `ShutdownCompleted`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
