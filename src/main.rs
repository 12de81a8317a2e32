//! Live Events API — Binary Entrypoint
//! Boots the Axum HTTP server: events source from config, `/api/events`,
//! `/metrics`, and the optional static UI.

use shuttle_axum::ShuttleAxum;

use live_events::api::{self, AppState};
use live_events::config::EventsConfig;
use live_events::events::providers;
use live_events::metrics::Metrics;
use live_events::telemetry::init_tracing;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let cfg = EventsConfig::load_default()?;
    tracing::info!(source = ?cfg.source, static_dir = ?cfg.static_dir, "config loaded");

    let source = providers::from_config(&cfg)?;
    let state = AppState::new(source);

    let metrics = Metrics::init()?;
    let router = api::create_app(state, cfg.static_dir.as_deref(), Some(metrics.router()));

    Ok(router.into())
}
