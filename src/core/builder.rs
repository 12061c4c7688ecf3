use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::error;

use crate::{
    error::SupervisorError,
    events::{Bus, Event, EventKind},
    health::Health,
    policies::RetryPolicy,
    subscribers::{LogWriter, Subscribe},
    workers::WorkerRef,
};

use super::{config::SupervisorConfig, registry::Registry, supervisor::Supervisor};

/// Builder for a [`Supervisor`]: registration and subscribers.
///
/// Registration needs no runtime; events published here (capability probe
/// results) are buffered on the bus and delivered once `run` starts.
pub struct SupervisorBuilder {
    cfg: SupervisorConfig,
    registry: Registry,
    bus: Bus,
    events: broadcast::Receiver<Event>,
    subscribers: Vec<Arc<dyn Subscribe>>,
    health: Health,
}

impl SupervisorBuilder {
    /// Creates a new builder with the given configuration.
    ///
    /// A [`LogWriter`] tagged with the service name and version is always installed.
    pub fn new(cfg: SupervisorConfig) -> Self {
        let (bus, events) = Bus::new(cfg.bus_capacity_clamped());
        let log: Arc<dyn Subscribe> = Arc::new(LogWriter::new(&cfg.name, &cfg.version));

        Self {
            cfg,
            registry: Registry::new(),
            bus,
            events,
            subscribers: vec![log],
            health: Health::new(),
        }
    }

    /// Adds event subscribers next to the built-in [`LogWriter`].
    ///
    /// Subscribers receive lifecycle events through dedicated workers with
    /// bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers.extend(subscribers);
        self
    }

    /// Registers a worker under a unique name.
    ///
    /// Fails with [`SupervisorError::DuplicateWorker`] if the name is taken.
    pub fn register(self, name: &str, worker: WorkerRef) -> Result<Self, SupervisorError> {
        self.insert(name, worker, None)
    }

    /// Registers a worker whose `init` is retried according to `policy`.
    pub fn register_with_retry(
        self,
        name: &str,
        worker: WorkerRef,
        policy: RetryPolicy,
    ) -> Result<Self, SupervisorError> {
        self.insert(name, worker, Some(policy))
    }

    fn insert(
        mut self,
        name: &str,
        worker: WorkerRef,
        retry: Option<RetryPolicy>,
    ) -> Result<Self, SupervisorError> {
        let entry = match self.registry.insert(&self.cfg.name, name, worker, retry) {
            Ok(entry) => entry,
            Err(err) => {
                error!(service = %self.cfg.name, worker = name, "Duplicate worker name");
                return Err(err);
            }
        };

        if entry.liveness.is_none() {
            self.bus.publish(
                Event::new(EventKind::CapabilityMissing)
                    .with_worker(Arc::clone(&entry.name))
                    .with_reason("liveness"),
            );
        }
        if entry.readiness.is_none() {
            self.bus.publish(
                Event::new(EventKind::CapabilityMissing)
                    .with_worker(Arc::clone(&entry.name))
                    .with_reason("readiness"),
            );
        }
        Ok(self)
    }

    /// Health aggregator for this supervisor.
    ///
    /// Lets a worker registered here (an HTTP server, say) expose health routes
    /// for the whole set. Queries report ok until [`build`](Self::build) is called.
    pub fn health(&self) -> Health {
        self.health.clone()
    }

    /// Freezes the registry and returns the supervisor.
    pub fn build(self) -> Supervisor {
        let entries = self.registry.freeze();
        self.health.bind(Arc::clone(&entries));

        Supervisor::new_internal(
            self.cfg,
            entries,
            self.bus,
            self.events,
            self.subscribers,
            self.health,
        )
    }
}
