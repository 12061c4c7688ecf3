//! # Supervisor: ordered init, concurrent run, bounded termination.
//!
//! The [`Supervisor`] owns the frozen registry, the event bus and the shutdown
//! channel. [`Supervisor::run`] drives one full lifecycle and consumes the
//! instance; a supervisor cannot be restarted.
//!
//! ## High-level architecture
//! ```text
//! run(self):
//!   spawn listener: Bus receiver ─► SubscriberSet::emit(&Event)
//!   spawn signal forwarder (trap_signals): SIGINT/SIGTERM/SIGHUP ─► shutdown channel
//!
//!   init phase (sequential, registration order, raced against the shutdown channel)
//!     ├─ failure or signal ───────────────────────────────┐
//!     └─ all ok ─► run phase: one task per worker          │
//!                   race: error | shutdown channel | done  │
//!                                    │                     │
//!                                    ▼                     ▼
//!   termination: wait ─► terminate(initialized) concurrently, bounded by grace
//!   detach leftover tasks ─► ShutdownCompleted ─► drain subscribers
//!   return ShutdownReport
//! ```
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use svcvisor::{Supervisor, SupervisorConfig, ShutdownTrigger, Worker, WorkerError};
//!
//! struct Once;
//!
//! #[async_trait]
//! impl Worker for Once {
//!     async fn init(&self, _span: &tracing::Span) -> Result<(), WorkerError> { Ok(()) }
//!     async fn run(&self) -> Result<(), WorkerError> { Ok(()) }
//!     async fn terminate(&self) -> Result<(), WorkerError> { Ok(()) }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = SupervisorConfig::new("demo", "1.0.0").with_trap_signals(false);
//!     let sup = Supervisor::builder(cfg)
//!         .register("once", Arc::new(Once))?
//!         .build();
//!
//!     let report = sup.run().await;
//!     assert!(matches!(report.trigger, ShutdownTrigger::AllFinished));
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use tokio::{
    sync::{broadcast, mpsc},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::{
    error::SupervisorError,
    events::{Bus, Event, EventKind},
    health::Health,
    subscribers::{Subscribe, SubscriberSet},
};

use super::{
    builder::SupervisorBuilder,
    config::SupervisorConfig,
    init::{self, InitStop},
    registry::Entry,
    runner::{self, RunOutcome, RunPhase},
    shutdown::{self, ShutdownHandle, ShutdownSignal},
    terminate,
};

/// What made the supervisor shut down.
#[derive(Debug)]
pub enum ShutdownTrigger {
    /// A worker's `init` failed; the run phase never started.
    InitFailed(SupervisorError),
    /// A worker's `run` returned an error or panicked.
    WorkerFailed(SupervisorError),
    /// An OS signal or a [`ShutdownHandle::request`] arrived.
    Signal(ShutdownSignal),
    /// Every worker's `run` returned `Ok`.
    AllFinished,
}

/// Summary returned by [`Supervisor::run`].
#[derive(Debug)]
pub struct ShutdownReport {
    /// What ended the lifecycle.
    pub trigger: ShutdownTrigger,
    /// Workers whose `init` succeeded, in registration order.
    pub initialized: Vec<Arc<str>>,
    /// Workers still terminating when the grace period expired.
    pub stuck: Vec<Arc<str>>,
}

impl ShutdownReport {
    /// The error that triggered shutdown, if any.
    pub fn error(&self) -> Option<&SupervisorError> {
        match &self.trigger {
            ShutdownTrigger::InitFailed(err) | ShutdownTrigger::WorkerFailed(err) => Some(err),
            ShutdownTrigger::Signal(_) | ShutdownTrigger::AllFinished => None,
        }
    }

    /// True when shutdown was not caused by a failure (cancellations count as
    /// graceful) and every terminate call returned within the grace period.
    pub fn is_clean(&self) -> bool {
        let graceful = match &self.trigger {
            ShutdownTrigger::InitFailed(_) => false,
            ShutdownTrigger::WorkerFailed(err) => err.is_canceled(),
            ShutdownTrigger::Signal(_) | ShutdownTrigger::AllFinished => true,
        };
        graceful && self.stuck.is_empty()
    }
}

/// Coordinates worker lifecycles, event delivery and graceful shutdown.
pub struct Supervisor {
    cfg: SupervisorConfig,
    entries: Arc<[Entry]>,
    bus: Bus,
    events: broadcast::Receiver<Event>,
    subscribers: Vec<Arc<dyn Subscribe>>,
    shutdown_tx: mpsc::Sender<ShutdownSignal>,
    shutdown_rx: mpsc::Receiver<ShutdownSignal>,
    health: Health,
}

impl Supervisor {
    /// Starts building a supervisor.
    pub fn builder(cfg: SupervisorConfig) -> SupervisorBuilder {
        SupervisorBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: SupervisorConfig,
        entries: Arc<[Entry]>,
        bus: Bus,
        events: broadcast::Receiver<Event>,
        subscribers: Vec<Arc<dyn Subscribe>>,
        health: Health,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = shutdown::channel();
        Self {
            cfg,
            entries,
            bus,
            events,
            subscribers,
            shutdown_tx,
            shutdown_rx,
            health,
        }
    }

    /// The frozen configuration.
    pub fn config(&self) -> &SupervisorConfig {
        &self.cfg
    }

    /// Registered worker names, in registration order.
    pub fn workers(&self) -> Vec<Arc<str>> {
        self.entries.iter().map(|e| Arc::clone(&e.name)).collect()
    }

    /// Health aggregator over the registered workers. Usable at any time,
    /// including while `run` is in progress.
    pub fn health(&self) -> Health {
        self.health.clone()
    }

    /// Handle for requesting shutdown from anywhere in the process.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle::new(self.shutdown_tx.clone())
    }

    /// Runs the full lifecycle and returns once termination is over.
    ///
    /// Never fails: errors are published as events and summarized in the
    /// returned [`ShutdownReport`]. Workers that ignore `terminate` past the
    /// grace period are left running detached.
    pub async fn run(self) -> ShutdownReport {
        let Supervisor {
            cfg,
            entries,
            bus,
            events,
            subscribers,
            shutdown_tx,
            mut shutdown_rx,
            health: _,
        } = self;

        let listener = spawn_listener(events, subscribers);
        let signals = CancellationToken::new();
        if cfg.trap_signals {
            if let Err(err) = shutdown::spawn_signal_forwarder(shutdown_tx.clone(), signals.clone()) {
                warn!(error = %err, "Could not install signal handlers");
            }
        }

        bus.publish(Event::new(EventKind::ServiceStarting));
        let init = init::init_all(&entries, &bus, &mut shutdown_rx).await;

        let mut run_phase = None;
        let trigger = match init.stopped {
            Some(InitStop::Failed(err)) => ShutdownTrigger::InitFailed(err),
            Some(InitStop::Signal(sig)) => ShutdownTrigger::Signal(sig),
            None => {
                let mut phase = RunPhase::spawn(&entries, &bus);
                let trigger = match phase.race(&mut shutdown_rx).await {
                    RunOutcome::Failed(err) => {
                        runner::publish_run_error(&bus, &err);
                        ShutdownTrigger::WorkerFailed(err)
                    }
                    RunOutcome::Signal(sig) => {
                        bus.publish(Event::new(EventKind::SignalReceived).with_reason(sig.as_str()));
                        ShutdownTrigger::Signal(sig)
                    }
                    RunOutcome::Finished => {
                        bus.publish(Event::new(EventKind::AllWorkersFinished));
                        ShutdownTrigger::AllFinished
                    }
                };
                run_phase = Some(phase);
                trigger
            }
        };

        let stuck = terminate::terminate_all(Arc::clone(&entries), &init.initialized, &cfg, &bus).await;

        if let Some(phase) = run_phase {
            phase.detach(&bus);
        }
        signals.cancel();
        drop(shutdown_tx);

        bus.publish(Event::new(EventKind::ShutdownCompleted));
        if let Err(err) = listener.await {
            warn!(error = %err, "Event listener ended abnormally");
        }

        ShutdownReport {
            trigger,
            initialized: init.initialized,
            stuck,
        }
    }
}

/// Forwards bus events to the subscribers until `ShutdownCompleted`, then
/// drains every subscriber queue.
fn spawn_listener(
    mut events: broadcast::Receiver<Event>,
    subscribers: Vec<Arc<dyn Subscribe>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let set = SubscriberSet::new(subscribers);
        loop {
            match events.recv().await {
                Ok(ev) => {
                    set.emit(&ev);
                    if ev.is_final() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Event listener lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        set.shutdown().await;
    })
}
