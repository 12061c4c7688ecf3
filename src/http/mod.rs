//! # HTTP surface (feature `http`).
//!
//! - [`health_routes`]: Kubernetes style `GET /live` and `GET /ready`
//!   backed by a [`Health`](crate::Health) aggregator.
//! - [`HttpServer`]: a [`Worker`](crate::Worker) serving an axum router under
//!   the supervisor's lifecycle.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use svcvisor::{Supervisor, SupervisorConfig, http::{HttpServer, health_routes}};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let builder = Supervisor::builder(SupervisorConfig::new("api", "1.0.0"));
//! let routes = health_routes(builder.health());
//! let sup = builder
//!     .register("http", Arc::new(HttpServer::new(([0, 0, 0, 0], 8080).into(), routes)))?
//!     .build();
//! sup.run().await;
//! # Ok(())
//! # }
//! ```

mod routes;
mod server;

pub use routes::health_routes;
pub use server::HttpServer;
