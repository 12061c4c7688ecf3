use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use axum::Router;
use tokio::{net::TcpListener, sync::Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{Span, info};

use crate::error::WorkerError;
use crate::workers::{Readiness, Worker};

/// Worker serving an axum [`Router`].
///
/// - `init` binds the listener; a bind error fails init.
/// - `run` serves until `terminate`, then finishes in-flight requests.
/// - Ready once the listener is bound.
pub struct HttpServer {
    addr: SocketAddr,
    router: Mutex<Option<Router>>,
    listener: Mutex<Option<TcpListener>>,
    local_addr: OnceLock<SocketAddr>,
    stop: CancellationToken,
}

impl HttpServer {
    /// Server for `router` on `addr`. Port `0` picks a free port.
    pub fn new(addr: SocketAddr, router: Router) -> Self {
        Self {
            addr,
            router: Mutex::new(Some(router)),
            listener: Mutex::new(None),
            local_addr: OnceLock::new(),
            stop: CancellationToken::new(),
        }
    }

    /// Address actually bound, once `init` succeeded.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr.get().copied()
    }
}

#[async_trait]
impl Worker for HttpServer {
    async fn init(&self, _span: &Span) -> Result<(), WorkerError> {
        let listener = TcpListener::bind(self.addr).await?;
        let addr = listener.local_addr()?;
        let _ = self.local_addr.set(addr);
        *self.listener.lock().await = Some(listener);

        info!(address = %addr, "Bound HTTP listener");
        Ok(())
    }

    async fn run(&self) -> Result<(), WorkerError> {
        let Some(listener) = self.listener.lock().await.take() else {
            return Err(WorkerError::fail("HTTP listener is not bound"));
        };
        let router = self.router.lock().await.take().unwrap_or_default();

        info!(address = ?self.local_addr(), "Listening and serving HTTP");
        let stop = self.stop.clone();
        axum::serve(listener, router)
            .with_graceful_shutdown(async move { stop.cancelled().await })
            .await?;
        Ok(())
    }

    async fn terminate(&self) -> Result<(), WorkerError> {
        self.stop.cancel();
        Ok(())
    }

    fn readiness(self: Arc<Self>) -> Option<Arc<dyn Readiness>> {
        Some(self)
    }
}

#[async_trait]
impl Readiness for HttpServer {
    async fn healthy(&self) -> Result<(), WorkerError> {
        match self.local_addr() {
            Some(_) => Ok(()),
            None => Err(WorkerError::fail("HTTP listener is not bound")),
        }
    }
}
