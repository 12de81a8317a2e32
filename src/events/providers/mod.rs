// src/events/providers/mod.rs
pub mod dom;
pub mod feed;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::config::events::{EventsConfig, SourceKind};
use crate::events::types::EventSource;

/// Build the configured upstream source. No retries; one request per call.
pub fn from_config(cfg: &EventsConfig) -> Result<Arc<dyn EventSource>> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(cfg.http_timeout_secs))
        .build()
        .context("building http client")?;

    let source: Arc<dyn EventSource> = match cfg.source {
        SourceKind::Feed => Arc::new(feed::FeedSource::from_url(cfg.feed_url.clone(), client)),
        SourceKind::Scrape => Arc::new(
            dom::DomScrapeSource::from_url(cfg.page_url.clone(), client)
                .with_link_base(cfg.link_base.clone()),
        ),
    };
    tracing::info!(provider = source.name(), "events source configured");
    Ok(source)
}
