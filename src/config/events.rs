// src/config/events.rs
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::events::providers::dom::{DEFAULT_LINK_BASE, DEFAULT_PAGE_URL};
use crate::events::providers::feed::DEFAULT_FEED_URL;

pub const ENV_CONFIG_PATH: &str = "EVENTS_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/events.toml";

const ENV_SOURCE: &str = "EVENTS_SOURCE";
const ENV_FEED_URL: &str = "EVENTS_FEED_URL";
const ENV_PAGE_URL: &str = "EVENTS_PAGE_URL";
const ENV_LINK_BASE: &str = "EVENTS_LINK_BASE";
const ENV_HTTP_TIMEOUT_SECS: &str = "EVENTS_HTTP_TIMEOUT_SECS";
const ENV_STATIC_DIR: &str = "EVENTS_STATIC_DIR";

fn default_timeout_secs() -> u64 {
    20
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Remote JSON agenda.
    #[default]
    Feed,
    /// Events page markup.
    Scrape,
}

impl FromStr for SourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "feed" | "json" => Ok(Self::Feed),
            "scrape" | "dom" => Ok(Self::Scrape),
            other => Err(anyhow!("unknown events source '{other}' (expected feed|scrape)")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EventsConfig {
    pub source: SourceKind,
    pub feed_url: String,
    pub page_url: String,
    /// Origin for relative links found on the events page.
    pub link_base: String,
    pub http_timeout_secs: u64,
    /// Serve this directory (index.html at `/`) next to the API.
    pub static_dir: Option<PathBuf>,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::default(),
            feed_url: DEFAULT_FEED_URL.to_string(),
            page_url: DEFAULT_PAGE_URL.to_string(),
            link_base: DEFAULT_LINK_BASE.to_string(),
            http_timeout_secs: default_timeout_secs(),
            static_dir: None,
        }
    }
}

impl EventsConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading events config from {}", path.display()))?;
        let cfg: EventsConfig = toml::from_str(&content)
            .with_context(|| format!("parsing events config {}", path.display()))?;
        cfg.validated()
    }

    /// Resolve config with fallbacks, then apply env overrides:
    /// 1) $EVENTS_CONFIG_PATH (must exist)
    /// 2) config/events.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        let base = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                bail!("{ENV_CONFIG_PATH} points to non-existent path {}", pb.display());
            }
            Self::load_from_file(&pb)?
        } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::load_from_file(DEFAULT_CONFIG_PATH)?
        } else {
            Self::default()
        };
        base.with_overrides(|k| std::env::var(k).ok())
    }

    /// Apply `EVENTS_*` overrides from any key lookup (env in production).
    pub fn with_overrides<F>(mut self, get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| get(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = get(ENV_SOURCE) {
            self.source = v.parse()?;
        }
        if let Some(v) = get(ENV_FEED_URL) {
            self.feed_url = v;
        }
        if let Some(v) = get(ENV_PAGE_URL) {
            self.page_url = v;
        }
        if let Some(v) = get(ENV_LINK_BASE) {
            self.link_base = v;
        }
        if let Some(v) = get(ENV_HTTP_TIMEOUT_SECS) {
            self.http_timeout_secs = v
                .parse()
                .with_context(|| format!("{ENV_HTTP_TIMEOUT_SECS}='{v}' is not a number"))?;
        }
        if let Some(v) = get(ENV_STATIC_DIR) {
            self.static_dir = Some(PathBuf::from(v));
        }
        self.validated()
    }

    fn validated(mut self) -> Result<Self> {
        if self.http_timeout_secs == 0 {
            self.http_timeout_secs = default_timeout_secs();
        }
        let url = match self.source {
            SourceKind::Feed => &self.feed_url,
            SourceKind::Scrape => &self.page_url,
        };
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            bail!("events source url must be http(s), got '{url}'");
        }
        Ok(self)
    }
}
