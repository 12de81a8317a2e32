// src/api.rs
use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::{services::ServeDir, set_header::SetResponseHeaderLayer};

use crate::events::{
    self,
    error::EventsError,
    time::{Clock, SystemClock},
    types::{EventSource, NormalizedEvent},
};

pub const ALLOW_HEADERS: &str = "Origin, X-Requested-With, Content-Type, Accept";

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn EventSource>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(source: Arc<dyn EventSource>) -> Self {
        Self {
            source,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

pub fn create_router(state: AppState) -> Router {
    create_app(state, None, None)
}

/// Same API, plus `dir` served for every other path (`index.html` at `/`).
pub fn create_router_with_static(state: AppState, dir: &Path) -> Router {
    create_app(state, Some(dir), None)
}

/// Full application: API routes, optional static dir, and any `extra` routes
/// (e.g. `/metrics`). The CORS headers cover all of them.
pub fn create_app(state: AppState, static_dir: Option<&Path>, extra: Option<Router>) -> Router {
    let mut api = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route(
            "/api/events",
            get(list_events)
                .head(method_not_allowed)
                .options(preflight)
                .fallback(method_not_allowed),
        );

    if let Some(dir) = static_dir {
        api = api.fallback_service(ServeDir::new(dir));
    }

    let mut app = api.with_state(state);
    if let Some(extra) = extra {
        app = app.merge(extra);
    }

    // Set on every response, not only on CORS requests.
    app.layer(SetResponseHeaderLayer::overriding(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    ))
    .layer(SetResponseHeaderLayer::overriding(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET"),
    ))
    .layer(SetResponseHeaderLayer::overriding(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    ))
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Upstream failure surfaced as a 500 with `{error, message}`.
pub struct ApiError(EventsError);

impl From<EventsError> for ApiError {
    fn from(e: EventsError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.0.summary().to_string(),
            message: Some(self.0.to_string()),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

async fn list_events(State(state): State<AppState>) -> Result<Json<Vec<NormalizedEvent>>, ApiError> {
    let started = std::time::Instant::now();
    let out = events::run_once(state.source.as_ref(), state.clock.as_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, kind = e.kind(), "failed to build events list");
            ApiError::from(e)
        })?;
    tracing::info!(
        count = out.len(),
        ms = started.elapsed().as_millis() as u64,
        "served events"
    );
    Ok(Json(out))
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed() -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorBody {
            error: "Method not allowed".to_string(),
            message: None,
        }),
    )
}
