//! # Health aggregation.
//!
//! [`Health`] answers two questions by polling every worker that exposes the
//! matching capability:
//!
//! - [`Health::liveness`]: should the process be restarted?
//! - [`Health::readiness`]: should the process receive traffic?
//!
//! Workers without the capability are skipped, so a supervisor without any
//! implementor is always alive and ready. Probes run concurrently and are
//! read-only; a panicking probe is reported as that worker's error.

use std::collections::BTreeMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, OnceLock};

use futures::{FutureExt, future::join_all};
use serde::Serialize;

use crate::core::{Entry, panic_message};
use crate::error::WorkerError;

/// Aggregated result of a liveness or readiness query.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    /// True when no worker reported an error.
    pub ok: bool,
    /// Worker name → error message, for every worker that reported one.
    pub errors: BTreeMap<String, String>,
}

impl HealthReport {
    fn from_errors(errors: BTreeMap<String, String>) -> Self {
        Self {
            ok: errors.is_empty(),
            errors,
        }
    }
}

/// Cloneable health aggregator, obtained from
/// [`SupervisorBuilder::health`](crate::SupervisorBuilder::health) or
/// [`Supervisor::health`](crate::Supervisor::health).
///
/// A handle taken from the builder sees the workers once the supervisor is
/// built; before that it reports ok.
#[derive(Clone, Default)]
pub struct Health {
    entries: Arc<OnceLock<Arc<[Entry]>>>,
}

impl Health {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Attaches the frozen registry. Only the first call has an effect.
    pub(crate) fn bind(&self, entries: Arc<[Entry]>) {
        let _ = self.entries.set(entries);
    }

    fn entries(&self) -> &[Entry] {
        self.entries.get().map(|e| &e[..]).unwrap_or_default()
    }

    /// Polls every worker implementing [`Liveness`](crate::Liveness).
    pub async fn liveness(&self) -> HealthReport {
        let probes = self.entries().iter().filter_map(|e| {
            let cap = e.liveness.as_ref()?;
            Some(probe(&e.name, cap.alive()))
        });
        HealthReport::from_errors(join_all(probes).await.into_iter().flatten().collect())
    }

    /// Polls every worker implementing [`Readiness`](crate::Readiness).
    pub async fn readiness(&self) -> HealthReport {
        let probes = self.entries().iter().filter_map(|e| {
            let cap = e.readiness.as_ref()?;
            Some(probe(&e.name, cap.healthy()))
        });
        HealthReport::from_errors(join_all(probes).await.into_iter().flatten().collect())
    }
}

/// Runs one probe; `Some((name, message))` when it failed or panicked.
async fn probe<F>(name: &str, fut: F) -> Option<(String, String)>
where
    F: Future<Output = Result<(), WorkerError>>,
{
    let message = match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(())) => return None,
        Ok(Err(err)) => err.to_string(),
        Err(panic) => format!("panic: {}", panic_message(panic.as_ref())),
    };
    Some((name.to_string(), message))
}
