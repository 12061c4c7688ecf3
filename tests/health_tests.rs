mod common;

use std::sync::Arc;
use std::time::Duration;

use svcvisor::Supervisor;
use tokio::time::timeout;

use common::{Journal, MockWorker, RUN_DEADLINE, test_config};

#[tokio::test]
async fn liveness_reports_the_failing_worker_by_name() {
    let journal = Journal::default();
    let disk = Arc::new(MockWorker::new("worker-name", &journal).with_liveness());
    let sup = Supervisor::builder(test_config())
        .register("worker-name", disk.clone())
        .unwrap()
        .register("other", Arc::new(MockWorker::new("other", &journal).with_liveness()))
        .unwrap()
        .build();
    let health = sup.health();

    assert!(health.liveness().await.ok);

    disk.set_alive_err(Some("disk full"));
    let report = health.liveness().await;
    assert!(!report.ok);
    assert_eq!(
        serde_json::to_value(&report.errors).unwrap(),
        serde_json::json!({ "worker-name": "disk full" })
    );

    disk.set_alive_err(None);
    assert!(health.liveness().await.ok);
}

#[tokio::test]
async fn readiness_mirrors_liveness_with_its_own_capability() {
    let journal = Journal::default();
    let cache = Arc::new(MockWorker::new("cache", &journal).with_readiness());
    let sup = Supervisor::builder(test_config())
        .register("cache", cache.clone())
        .unwrap()
        .register("bare", Arc::new(MockWorker::new("bare", &journal)))
        .unwrap()
        .build();
    let health = sup.health();

    assert!(health.readiness().await.ok);
    cache.set_ready_err(Some("warming up"));

    let report = health.readiness().await;
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors["cache"], "warming up");
    assert!(health.liveness().await.ok, "no liveness implementors");
}

#[tokio::test]
async fn health_is_queryable_while_running() {
    let journal = Journal::default();
    let w = Arc::new(MockWorker::new("w", &journal).with_liveness().with_readiness());
    let sup = Supervisor::builder(test_config())
        .register("w", w.clone())
        .unwrap()
        .build();
    let health = sup.health();
    let shutdown = sup.shutdown_handle();

    let run = tokio::spawn(sup.run());
    tokio::time::sleep(Duration::from_millis(20)).await;

    w.set_ready_err(Some("draining"));
    assert!(health.liveness().await.ok);
    assert!(!health.readiness().await.ok);

    shutdown.request();
    timeout(RUN_DEADLINE, run).await.expect("run() hung").unwrap();

    // Still answers after the supervisor is gone.
    assert!(!health.readiness().await.ok);
}

#[cfg(feature = "http")]
mod http {
    use std::sync::Arc;

    use axum::{body::Body, http::Request, http::StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use svcvisor::{Supervisor, http::HttpServer, http::health_routes};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::time::timeout;
    use tower::ServiceExt;

    use super::common::{Journal, MockWorker, RUN_DEADLINE, test_config};

    async fn get(router: axum::Router, uri: &str) -> (StatusCode, Value) {
        let res = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let body = res.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn live_and_ready_routes() {
        let journal = Journal::default();
        let w = Arc::new(MockWorker::new("worker-name", &journal).with_liveness().with_readiness());
        let sup = Supervisor::builder(test_config())
            .register("worker-name", w.clone())
            .unwrap()
            .build();
        let routes = health_routes(sup.health());

        assert_eq!(get(routes.clone(), "/live").await, (StatusCode::OK, json!({ "status": "ok" })));
        assert_eq!(get(routes.clone(), "/ready").await, (StatusCode::OK, json!({ "status": "ok" })));

        w.set_alive_err(Some("disk full"));
        assert_eq!(
            get(routes.clone(), "/live").await,
            (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({ "errors": { "worker-name": "disk full" } })
            )
        );
        assert_eq!(get(routes, "/ready").await.0, StatusCode::OK);
    }

    #[tokio::test]
    async fn http_server_serves_health_routes_until_terminated() {
        let journal = Journal::default();
        let builder = Supervisor::builder(test_config());
        let server = Arc::new(HttpServer::new(
            ([127, 0, 0, 1], 0).into(),
            health_routes(builder.health()),
        ));
        let sup = builder
            .register("http", server.clone())
            .unwrap()
            .register("w", Arc::new(MockWorker::new("w", &journal)))
            .unwrap()
            .build();
        let health = sup.health();
        let shutdown = sup.shutdown_handle();

        assert!(!health.readiness().await.ok, "not bound before init");

        let run = tokio::spawn(sup.run());
        let addr = loop {
            if let Some(addr) = server.local_addr() {
                break addr;
            }
            tokio::task::yield_now().await;
        };

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /ready HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut raw = String::new();
        stream.read_to_string(&mut raw).await.unwrap();
        assert!(raw.starts_with("HTTP/1.1 200"), "unexpected response: {raw}");
        assert!(raw.ends_with(r#"{"status":"ok"}"#));

        shutdown.request();
        let report = timeout(RUN_DEADLINE, run).await.expect("run() hung").unwrap();
        assert!(report.is_clean());
    }

    #[tokio::test]
    async fn bind_failure_fails_init() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = taken.local_addr().unwrap();

        let sup = Supervisor::builder(test_config())
            .register("http", Arc::new(HttpServer::new(addr, axum::Router::new())))
            .unwrap()
            .build();

        let report = timeout(RUN_DEADLINE, sup.run()).await.expect("run() hung");
        assert!(report.initialized.is_empty());
        assert_eq!(report.error().map(|e| e.worker()), Some("http"));
    }
}
