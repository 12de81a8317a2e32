// src/events/providers/feed.rs
//! Remote JSON agenda feed.

use async_trait::async_trait;
use serde::Deserialize;

use crate::events::clean_text;
use crate::events::error::EventsError;
use crate::events::types::{EventSource, RawEvent};

pub const DEFAULT_FEED_URL: &str = "https://la14hd.com/eventos/json/agenda123.json";

/// Feed row. Field names differ between upstream revisions (Spanish keys in
/// older dumps), so every field carries its aliases.
#[derive(Debug, Deserialize)]
struct FeedRecord {
    #[serde(default, alias = "hora", alias = "timeOfDay")]
    time: Option<String>,
    #[serde(default, alias = "partido")]
    title: Option<String>,
    #[serde(default, alias = "enlace")]
    link: Option<String>,
    #[serde(default, alias = "fecha")]
    date: Option<String>,
    #[serde(default, alias = "categoria")]
    category: Option<String>,
    #[serde(default, alias = "idioma")]
    language: Option<String>,
}

impl FeedRecord {
    fn into_raw(self) -> RawEvent {
        RawEvent {
            time_of_day: clean_opt(self.time).unwrap_or_default(),
            title: clean_opt(self.title).unwrap_or_default(),
            link: self.link.map(|l| l.trim().to_string()).unwrap_or_default(),
            date: clean_opt(self.date),
            category: clean_opt(self.category),
            language: clean_opt(self.language),
        }
    }
}

fn clean_opt(s: Option<String>) -> Option<String> {
    s.map(|v| clean_text(&v)).filter(|v| !v.is_empty())
}

pub struct FeedSource {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl FeedSource {
    pub fn from_url(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            mode: Mode::Http {
                url: url.into(),
                client,
            },
        }
    }

    /// Serve a captured payload instead of hitting the network.
    pub fn from_fixture_str(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
        }
    }

    pub fn parse_records(body: &str) -> Result<Vec<RawEvent>, EventsError> {
        let rows: Vec<FeedRecord> = serde_json::from_str(body)?;
        Ok(rows.into_iter().map(FeedRecord::into_raw).collect())
    }
}

#[async_trait]
impl EventSource for FeedSource {
    async fn fetch_current_events(&self) -> Result<Vec<RawEvent>, EventsError> {
        match &self.mode {
            Mode::Fixture(s) => Self::parse_records(s),
            Mode::Http { url, client } => {
                tracing::info!(provider = "feed", %url, "fetching events feed");
                let resp = client.get(url.as_str()).send().await?;
                let status = resp.status();
                if !status.is_success() {
                    return Err(EventsError::Fetch(format!("{url} answered {status}")));
                }
                let body = resp.text().await?;
                Self::parse_records(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        "feed"
    }
}
