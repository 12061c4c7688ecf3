use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use tracing::warn;

use crate::health::{Health, HealthReport};

/// Liveness and readiness routes.
///
/// | Route         | ok                         | not ok                                    |
/// |---------------|----------------------------|-------------------------------------------|
/// | `GET /live`   | 200 `{"status":"ok"}`      | 503 `{"errors":{"<worker>":"<message>"}}` |
/// | `GET /ready`  | 200 `{"status":"ok"}`      | 503 `{"errors":{"<worker>":"<message>"}}` |
pub fn health_routes(health: Health) -> Router {
    Router::new()
        .route("/live", get(live))
        .route("/ready", get(ready))
        .with_state(health)
}

async fn live(State(health): State<Health>) -> Response {
    respond("liveness", health.liveness().await)
}

async fn ready(State(health): State<Health>) -> Response {
    respond("readiness", health.readiness().await)
}

fn respond(probe: &'static str, report: HealthReport) -> Response {
    if report.ok {
        return (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response();
    }

    warn!(probe, errors = ?report.errors, "Health probe failed");
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({ "errors": report.errors })),
    )
        .into_response()
}
