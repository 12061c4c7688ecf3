//! # Supervisor configuration.
//!
//! [`SupervisorConfig`] centralizes the settings of one supervisor instance. It is
//! handed to [`Supervisor::builder`](crate::Supervisor::builder) and frozen once
//! the supervisor is built.
//!
//! ## Sentinel values
//! - `grace = 0s` → do not wait for terminations at all
//! - `wait = 0s` → terminate immediately when shutdown starts

use std::time::Duration;

/// Configuration for one supervisor instance.
///
/// ## Field semantics
/// - `name`, `version`: service metadata attached to every log record
/// - `grace`: hard ceiling on how long shutdown waits (wait period included)
/// - `wait`: pause before `terminate` is called (connection draining, LB deregistration)
/// - `trap_signals`: listen for SIGINT/SIGTERM/SIGHUP during `run`
/// - `bus_capacity`: event bus ring buffer size (min 1)
#[derive(Clone, Debug)]
pub struct SupervisorConfig {
    /// Service name.
    pub name: String,
    /// Service version.
    pub version: String,
    /// Termination grace period.
    ///
    /// Measured from the start of the shutdown path. When it elapses the
    /// supervisor stops waiting; outstanding `terminate` calls are not cancelled.
    pub grace: Duration,
    /// Termination wait period.
    pub wait: Duration,
    /// Install OS signal listeners while running.
    ///
    /// Disable when the embedding process handles signals itself (or in tests)
    /// and trigger shutdown through a [`ShutdownHandle`](crate::ShutdownHandle).
    pub trap_signals: bool,
    /// Capacity of the event bus.
    pub bus_capacity: usize,
}

impl SupervisorConfig {
    /// Config with the given service metadata and defaults for everything else.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    /// Sets the termination grace period.
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Sets the termination wait period.
    pub fn with_wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }

    /// Enables or disables OS signal handling.
    pub fn with_trap_signals(mut self, trap: bool) -> Self {
        self.trap_signals = trap;
        self
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for SupervisorConfig {
    /// Default configuration:
    ///
    /// - `name = "svc"`, `version = "0.0.0"`
    /// - `grace = 15s`
    /// - `wait = 0s`
    /// - `trap_signals = true`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            name: "svc".to_string(),
            version: "0.0.0".to_string(),
            grace: Duration::from_secs(15),
            wait: Duration::ZERO,
            trap_signals: true,
            bus_capacity: 1024,
        }
    }
}
