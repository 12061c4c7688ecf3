//! Runtime core: registration, lifecycle phases and shutdown.
//!
//! The public API from this module is [`Supervisor`] (with its builder and
//! config), the [`ShutdownHandle`] and the [`ShutdownReport`] returned by `run`.
//!
//! Internal modules:
//! - [`registry`]: ordered, name-unique registration records;
//! - [`init`]: sequential, fail-fast initialization with optional retry;
//! - [`runner`]: concurrent run units and the three-way shutdown race;
//! - [`terminate`]: wait period, concurrent terminate, grace period bound;
//! - [`shutdown`]: OS signal forwarding and explicit shutdown requests;
//! - [`supervisor`]: wires the phases together.

mod builder;
mod config;
mod init;
mod registry;
mod runner;
mod shutdown;
mod supervisor;
mod terminate;

use std::any::Any;

pub use builder::SupervisorBuilder;
pub use config::SupervisorConfig;
pub use shutdown::{ShutdownHandle, ShutdownSignal};
pub use supervisor::{ShutdownReport, ShutdownTrigger, Supervisor};

pub(crate) use registry::Entry;

/// Extracts a printable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
