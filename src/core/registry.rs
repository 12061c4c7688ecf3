//! # Worker registry.
//!
//! Holds the registration records in registration order and enforces name
//! uniqueness. Optional capabilities are probed here, once, and cached on the
//! record.
//!
//! ## Rules
//! - Names are unique for the lifetime of the registry.
//! - Registration order is the only ordering signal for init.
//! - No removal; the registry is frozen into an `Arc<[Entry]>` when the
//!   supervisor is built and read-only from then on.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::Span;

use crate::error::SupervisorError;
use crate::policies::RetryPolicy;
use crate::workers::{Liveness, Readiness, WorkerRef};

/// One registration record.
#[derive(Clone)]
pub(crate) struct Entry {
    pub(crate) name: Arc<str>,
    pub(crate) worker: WorkerRef,
    /// Consulted only during init.
    pub(crate) retry: Option<RetryPolicy>,
    pub(crate) liveness: Option<Arc<dyn Liveness>>,
    pub(crate) readiness: Option<Arc<dyn Readiness>>,
    /// Passed to `init`, instruments `run` and `terminate`.
    pub(crate) span: Span,
}

/// Ordered, name-unique set of registration records.
#[derive(Default)]
pub(crate) struct Registry {
    entries: Vec<Entry>,
    names: HashSet<Arc<str>>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Adds a worker. Fails if `name` is already taken.
    pub(crate) fn insert(
        &mut self,
        service: &str,
        name: &str,
        worker: WorkerRef,
        retry: Option<RetryPolicy>,
    ) -> Result<&Entry, SupervisorError> {
        if self.names.contains(name) {
            return Err(SupervisorError::DuplicateWorker {
                worker: name.to_string(),
            });
        }

        let name: Arc<str> = Arc::from(name);
        let entry = Entry {
            liveness: Arc::clone(&worker).liveness(),
            readiness: Arc::clone(&worker).readiness(),
            span: tracing::info_span!("worker", service = %service, worker = %name),
            name: Arc::clone(&name),
            worker,
            retry,
        };

        self.names.insert(name);
        self.entries.push(entry);
        Ok(&self.entries[self.entries.len() - 1])
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Freezes the registry, keeping registration order.
    pub(crate) fn freeze(self) -> Arc<[Entry]> {
        self.entries.into()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use tracing::Span;

    use super::*;
    use crate::error::WorkerError;
    use crate::workers::Worker;

    struct Plain;

    #[async_trait]
    impl Worker for Plain {
        async fn init(&self, _span: &Span) -> Result<(), WorkerError> {
            Ok(())
        }
        async fn run(&self) -> Result<(), WorkerError> {
            Ok(())
        }
        async fn terminate(&self) -> Result<(), WorkerError> {
            Ok(())
        }
    }

    struct Probed;

    #[async_trait]
    impl Worker for Probed {
        async fn init(&self, _span: &Span) -> Result<(), WorkerError> {
            Ok(())
        }
        async fn run(&self) -> Result<(), WorkerError> {
            Ok(())
        }
        async fn terminate(&self) -> Result<(), WorkerError> {
            Ok(())
        }
        fn readiness(self: Arc<Self>) -> Option<Arc<dyn Readiness>> {
            Some(self)
        }
    }

    #[async_trait]
    impl Readiness for Probed {
        async fn healthy(&self) -> Result<(), WorkerError> {
            Ok(())
        }
    }

    #[test]
    fn duplicate_name_is_rejected_regardless_of_worker_type() {
        let mut reg = Registry::new();
        reg.insert("svc", "a", Arc::new(Plain), None).unwrap();

        let err = reg.insert("svc", "a", Arc::new(Probed), None).err().unwrap();
        assert!(matches!(err, SupervisorError::DuplicateWorker { ref worker } if worker == "a"));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn keeps_registration_order() {
        let mut reg = Registry::new();
        for name in ["c", "a", "b"] {
            reg.insert("svc", name, Arc::new(Plain), None).unwrap();
        }
        let names: Vec<_> = reg.freeze().iter().map(|e| e.name.to_string()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn capabilities_are_probed_at_registration() {
        let mut reg = Registry::new();
        let plain = reg.insert("svc", "plain", Arc::new(Plain), None).unwrap();
        assert!(plain.liveness.is_none() && plain.readiness.is_none());

        let probed = reg.insert("svc", "probed", Arc::new(Probed), None).unwrap();
        assert!(probed.liveness.is_none());
        assert!(probed.readiness.is_some());
    }
}
