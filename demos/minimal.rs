//! # Demo: minimal
//!
//! One worker that idles until it is asked to stop.
//!
//! Demonstrates how to:
//! - Implement [`Worker`] with a cancellation token.
//! - Register it and run the supervisor until Ctrl-C / SIGTERM.
//! - Read the [`ShutdownReport`](svcvisor::ShutdownReport).
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example minimal
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use svcvisor::{Supervisor, SupervisorConfig, Worker, WorkerError};
use tokio_util::sync::CancellationToken;
use tracing::{Span, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

struct DummyWorker {
    stop: CancellationToken,
}

#[async_trait]
impl Worker for DummyWorker {
    async fn init(&self, _span: &Span) -> Result<(), WorkerError> {
        Ok(())
    }

    async fn run(&self) -> Result<(), WorkerError> {
        info!("idling until terminated");
        self.stop.cancelled().await;
        Ok(())
    }

    async fn terminate(&self) -> Result<(), WorkerError> {
        self.stop.cancel();
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    let sup = Supervisor::builder(SupervisorConfig::new("minimal-service", "1.0.0"))
        .register(
            "dummy-worker",
            Arc::new(DummyWorker {
                stop: CancellationToken::new(),
            }),
        )?
        .build();

    let report = sup.run().await;
    if let Some(err) = report.error() {
        return Err(err.to_string().into());
    }
    Ok(())
}
