// src/metrics.rs
use anyhow::{Context, Result};
use axum::{extract::State, http::header, response::IntoResponse, routing::get, Router};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the process-wide Prometheus recorder and register the pipeline
    /// series. Call once, from the binary.
    pub fn init() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        crate::events::ensure_metrics_described();
        Ok(Self { handle })
    }

    /// `/metrics` in the Prometheus text format; merge into the app router.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/metrics", get(render_exposition))
            .with_state(self.handle.clone())
    }
}

async fn render_exposition(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)], handle.render())
}
