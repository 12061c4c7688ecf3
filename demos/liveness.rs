//! # Demo: liveness
//!
//! A worker that turns unhealthy after a second, exposed through `/live` and
//! `/ready` on port 8080.
//!
//! ```bash
//! cargo run --example liveness
//! curl -i localhost:8080/live    # 503 {"errors":{"dummy-worker":"service not well, please restart me"}}
//! curl -i localhost:8080/ready   # 200 {"status":"ok"}
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use svcvisor::{
    Liveness, Supervisor, SupervisorConfig, Worker, WorkerError,
    http::{HttpServer, health_routes},
};
use tokio_util::sync::CancellationToken;
use tracing::Span;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

struct DummyWorker {
    degraded: AtomicBool,
    stop: CancellationToken,
}

#[async_trait]
impl Worker for DummyWorker {
    async fn init(&self, _span: &Span) -> Result<(), WorkerError> {
        Ok(())
    }

    async fn run(&self) -> Result<(), WorkerError> {
        tokio::select! {
            _ = self.stop.cancelled() => return Ok(()),
            _ = tokio::time::sleep(Duration::from_secs(1)) => {}
        }
        self.degraded.store(true, Ordering::SeqCst);
        self.stop.cancelled().await;
        Ok(())
    }

    async fn terminate(&self) -> Result<(), WorkerError> {
        self.stop.cancel();
        Ok(())
    }

    fn liveness(self: Arc<Self>) -> Option<Arc<dyn Liveness>> {
        Some(self)
    }
}

#[async_trait]
impl Liveness for DummyWorker {
    async fn alive(&self) -> Result<(), WorkerError> {
        if self.degraded.load(Ordering::SeqCst) {
            return Err(WorkerError::fail("service not well, please restart me"));
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();

    let builder = Supervisor::builder(SupervisorConfig::new("liveness-service", "1.0.0"));
    let http = HttpServer::new(([0, 0, 0, 0], 8080).into(), health_routes(builder.health()));

    let sup = builder
        .register("http", Arc::new(http))?
        .register(
            "dummy-worker",
            Arc::new(DummyWorker {
                degraded: AtomicBool::new(false),
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
