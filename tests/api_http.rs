// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /api/events (merge, status, order, field set)
// - OPTIONS /api/events
// - POST/PUT/DELETE/PATCH/HEAD /api/events -> 405
// - upstream failures -> 500 {error, message}
// - CORS headers on every response, merged /metrics included

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{self, Body},
    http::{Request, Response, StatusCode},
    Router,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use live_events::api::{self, AppState};
use live_events::metrics::Metrics;
use live_events::events::time::FixedClock;
use live_events::{EventSource, EventsError, RawEvent};

const BODY_LIMIT: usize = 1024 * 1024;

struct StaticSource {
    rows: Vec<RawEvent>,
    calls: AtomicUsize,
}

impl StaticSource {
    fn new(rows: Vec<RawEvent>) -> Arc<Self> {
        Arc::new(Self {
            rows,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl EventSource for StaticSource {
    async fn fetch_current_events(&self) -> Result<Vec<RawEvent>, EventsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.rows.clone())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

struct FailingSource(fn() -> EventsError);

#[async_trait]
impl EventSource for FailingSource {
    async fn fetch_current_events(&self) -> Result<Vec<RawEvent>, EventsError> {
        Err((self.0)())
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

fn scenario_rows() -> Vec<RawEvent> {
    vec![
        RawEvent::new("A", "20:00", "L1").with_date("2025-06-19"),
        RawEvent::new("A", "20:00", "L2").with_date("2025-06-19"),
        RawEvent::new("B", "19:00", "L3").with_date("2025-06-19"),
    ]
}

fn router_with(source: Arc<dyn EventSource>, now: &str) -> Router {
    let clock = FixedClock::from_rfc3339(now).expect("clock");
    api::create_router(AppState::new(source).with_clock(Arc::new(clock)))
}

async fn call(app: Router, method: &str, uri: &str) -> Response<Body> {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    app.oneshot(req).await.expect("oneshot")
}

async fn body_bytes(resp: Response<Body>) -> Vec<u8> {
    body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec()
}

fn assert_cors(resp: &Response<Body>) {
    let h = resp.headers();
    assert_eq!(h.get("access-control-allow-origin").unwrap(), "*");
    assert_eq!(h.get("access-control-allow-methods").unwrap(), "GET");
    assert_eq!(
        h.get("access-control-allow-headers").unwrap(),
        "Origin, X-Requested-With, Content-Type, Accept"
    );
}

#[tokio::test]
async fn get_events_merges_classifies_and_orders() {
    let app = router_with(StaticSource::new(scenario_rows()), "2025-06-19T19:30:00-03:00");

    let resp = call(app, "GET", "/api/events").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_cors(&resp);

    let v: Json = serde_json::from_slice(&body_bytes(resp).await).expect("json");
    let arr = v.as_array().expect("array");
    assert_eq!(arr.len(), 2);

    assert_eq!(arr[0]["title"], "B");
    assert_eq!(arr[0]["timeOfDay"], "19:00");
    assert_eq!(arr[0]["options"], serde_json::json!(["L3"]));
    assert_eq!(arr[0]["status"], "LIVE");

    assert_eq!(arr[1]["title"], "A");
    assert_eq!(arr[1]["timeOfDay"], "20:00");
    assert_eq!(arr[1]["options"], serde_json::json!(["L1", "L2"]));
    assert_eq!(arr[1]["status"], "UPCOMING");
}

#[tokio::test]
async fn response_never_carries_internal_fields() {
    let app = router_with(StaticSource::new(scenario_rows()), "2025-06-19T19:30:00-03:00");
    let bytes = body_bytes(call(app, "GET", "/api/events").await).await;
    let v: Json = serde_json::from_slice(&bytes).unwrap();
    let allowed = [
        "timeOfDay", "title", "options", "category", "language", "date", "status",
    ];
    for ev in v.as_array().unwrap() {
        for key in ev.as_object().unwrap().keys() {
            assert!(allowed.contains(&key.as_str()), "unexpected field {key}");
        }
    }
}

#[tokio::test]
async fn empty_upstream_gives_empty_array() {
    let app = router_with(StaticSource::new(vec![]), "2025-06-19T19:30:00-03:00");
    let resp = call(app, "GET", "/api/events").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_bytes(resp).await, b"[]");
}

#[tokio::test]
async fn options_is_200_with_empty_body() {
    let app = router_with(StaticSource::new(scenario_rows()), "2025-06-19T19:30:00-03:00");
    let resp = call(app, "OPTIONS", "/api/events").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_cors(&resp);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn other_methods_are_405_with_exact_body() {
    for method in ["POST", "PUT", "DELETE", "PATCH", "HEAD"] {
        let source = StaticSource::new(scenario_rows());
        let app = router_with(source.clone(), "2025-06-19T19:30:00-03:00");
        let resp = call(app, method, "/api/events").await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
        assert_cors(&resp);
        if method == "HEAD" {
            // HEAD responses carry no body
            assert_eq!(resp.headers().get("content-type").unwrap(), "application/json");
        } else {
            let v: Json = serde_json::from_slice(&body_bytes(resp).await).unwrap();
            assert_eq!(v, serde_json::json!({ "error": "Method not allowed" }));
        }
        assert_eq!(source.calls.load(Ordering::SeqCst), 0, "{method} must not fetch");
    }
}

#[tokio::test]
async fn merged_metrics_route_carries_cors() {
    let recorder = PrometheusBuilder::new().build_recorder();
    let metrics = Metrics {
        handle: recorder.handle(),
    };
    let clock = FixedClock::from_rfc3339("2025-06-19T19:30:00-03:00").unwrap();
    let state = AppState::new(StaticSource::new(vec![])).with_clock(Arc::new(clock));
    let app = api::create_app(state, None, Some(metrics.router()));

    let resp = call(app.clone(), "GET", "/metrics").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_cors(&resp);
    assert!(resp
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/plain"));

    let resp = call(app, "GET", "/api/events").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_cors(&resp);
}

#[tokio::test]
async fn upstream_failures_are_500_with_class_specific_summary() {
    let cases: [(fn() -> EventsError, &str); 3] = [
        (|| EventsError::Fetch("agenda answered 503".into()), "fetch error"),
        (|| EventsError::Parse("expected value at line 1".into()), "parse error"),
        (|| EventsError::Scrape("no `.event` elements".into()), "scrape error"),
    ];

    let mut summaries = Vec::new();
    for (make, prefix) in cases {
        let app = router_with(Arc::new(FailingSource(make)), "2025-06-19T19:30:00-03:00");
        let resp = call(app, "GET", "/api/events").await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_cors(&resp);

        let v: Json = serde_json::from_slice(&body_bytes(resp).await).unwrap();
        let error = v["error"].as_str().expect("error string").to_string();
        let message = v["message"].as_str().expect("message string");
        assert!(message.starts_with(prefix), "message: {message}");
        summaries.push(error);
    }
    summaries.dedup();
    assert_eq!(summaries.len(), 3, "each failure class has its own summary");
}

#[tokio::test]
async fn every_request_fetches_fresh() {
    let source = StaticSource::new(scenario_rows());
    let app = router_with(source.clone(), "2025-06-19T19:30:00-03:00");
    for _ in 0..3 {
        let resp = call(app.clone(), "GET", "/api/events").await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
    assert_eq!(source.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn concurrent_requests_do_independent_upstream_work() {
    let source = StaticSource::new(scenario_rows());
    let app = router_with(source.clone(), "2025-06-19T19:30:00-03:00");
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let app = app.clone();
            tokio::spawn(async move { call(app, "GET", "/api/events").await.status() })
        })
        .collect();
    for h in handles {
        assert_eq!(h.await.unwrap(), StatusCode::OK);
    }
    assert_eq!(source.calls.load(Ordering::SeqCst), 8);
}

#[tokio::test]
async fn health_is_ok_and_carries_cors() {
    let app = router_with(StaticSource::new(vec![]), "2025-06-19T19:30:00-03:00");
    let resp = call(app, "GET", "/health").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_cors(&resp);
    assert_eq!(body_bytes(resp).await, b"OK");
}

#[tokio::test]
async fn static_dir_serves_index_next_to_api() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>agenda</h1>").unwrap();

    let clock = FixedClock::from_rfc3339("2025-06-19T19:30:00-03:00").unwrap();
    let state = AppState::new(StaticSource::new(scenario_rows())).with_clock(Arc::new(clock));
    let app = api::create_router_with_static(state, dir.path());

    let resp = call(app.clone(), "GET", "/").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_bytes(resp).await, b"<h1>agenda</h1>");

    let resp = call(app, "GET", "/api/events").await;
    assert_eq!(resp.status(), StatusCode::OK);
}
