// src/events/providers/dom.rs
//! Events page scraper.
//!
//! The page is held by a [`PageSession`] for the duration of one scrape. The
//! session is released when it goes out of scope, whatever the outcome.
//! The page markup carries no calendar date, so every scraped row is stamped
//! with today's date in civil (UTC-3) time.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use scraper::{ElementRef, Html, Selector};

use crate::events::clean_text;
use crate::events::error::EventsError;
use crate::events::time::{civil_today, Clock, SystemClock};
use crate::events::types::{EventSource, RawEvent};

pub const DEFAULT_PAGE_URL: &str = "https://la14hd.com/eventos/";
pub const DEFAULT_LINK_BASE: &str = "https://la14hd.com";

const EVENT_SELECTOR: &str = ".event";

static OPEN_SESSIONS: AtomicUsize = AtomicUsize::new(0);

/// Number of page sessions currently held by this process.
pub fn open_sessions() -> usize {
    OPEN_SESSIONS.load(Ordering::SeqCst)
}

/// Scoped handle on a loaded page; released on drop.
pub struct PageSession {
    url: String,
    html: Option<String>,
}

impl PageSession {
    pub fn acquire(url: &str) -> Self {
        OPEN_SESSIONS.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(target: "events", %url, "page session opened");
        Self {
            url: url.to_string(),
            html: None,
        }
    }

    pub async fn navigate(&mut self, client: &reqwest::Client) -> Result<(), EventsError> {
        let resp = client
            .get(self.url.as_str())
            .send()
            .await
            .map_err(|e| EventsError::Scrape(format!("navigation to {} failed: {e}", self.url)))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(EventsError::Scrape(format!("{} answered {status}", self.url)));
        }
        let body = resp
            .text()
            .await
            .map_err(|e| EventsError::Scrape(format!("reading {} failed: {e}", self.url)))?;
        self.html = Some(body);
        Ok(())
    }

    pub fn load(&mut self, html: String) {
        self.html = Some(html);
    }

    pub fn content(&self) -> Result<&str, EventsError> {
        self.html
            .as_deref()
            .ok_or_else(|| EventsError::Scrape(format!("{} was never loaded", self.url)))
    }
}

impl Drop for PageSession {
    fn drop(&mut self) {
        OPEN_SESSIONS.fetch_sub(1, Ordering::SeqCst);
        tracing::debug!(target: "events", url = %self.url, "page session closed");
    }
}

pub struct DomScrapeSource {
    mode: Mode,
    page_url: String,
    link_base: String,
    clock: Arc<dyn Clock>,
}

enum Mode {
    Fixture(String),
    Http(reqwest::Client),
}

impl DomScrapeSource {
    pub fn from_url(page_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            mode: Mode::Http(client),
            page_url: page_url.into(),
            link_base: DEFAULT_LINK_BASE.to_string(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn from_fixture_str(html: &str) -> Self {
        Self {
            mode: Mode::Fixture(html.to_string()),
            page_url: DEFAULT_PAGE_URL.to_string(),
            link_base: DEFAULT_LINK_BASE.to_string(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Origin prepended to relative `data-url` links.
    pub fn with_link_base(mut self, base: impl Into<String>) -> Self {
        self.link_base = base.into();
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

#[async_trait]
impl EventSource for DomScrapeSource {
    async fn fetch_current_events(&self) -> Result<Vec<RawEvent>, EventsError> {
        let mut session = PageSession::acquire(&self.page_url);
        match &self.mode {
            Mode::Fixture(html) => session.load(html.clone()),
            Mode::Http(client) => session.navigate(client).await?,
        }
        let today = civil_today(self.clock.as_ref());
        let rows = extract_events(session.content()?, &self.link_base, today)?;
        tracing::info!(provider = "scrape", count = rows.len(), "page scraped");
        Ok(rows)
    }

    fn name(&self) -> &'static str {
        "scrape"
    }
}

fn selector(css: &str) -> Result<Selector, EventsError> {
    Selector::parse(css).map_err(|e| EventsError::Scrape(format!("bad selector {css}: {e:?}")))
}

fn text_of(el: ElementRef<'_>, sel: &Selector) -> Option<String> {
    el.select(sel)
        .next()
        .map(|n| clean_text(&n.text().collect::<String>()))
        .filter(|s| !s.is_empty())
}

fn looks_like_time(s: &str) -> bool {
    NaiveTime::parse_from_str(s, "%H:%M").is_ok()
}

fn absolute_link(base: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else {
        format!("{}{}", base.trim_end_matches('/'), href)
    }
}

/// Pull agenda rows out of the events page. Two markup layouts are understood:
///
/// - current: `.event-name` holding `"HH:MM - Title"`, link in the `value` of
///   `.iframe-link`, `.language_text`, and `data-category` on the card;
/// - legacy: `.event-title`, `.status-text span` holding a time (or a live
///   marker) and a relative `data-url` on the card.
///
/// A page with no `.event` card at all is a scrape failure. Cards missing
/// pieces are still emitted and left for the normalizer to reject.
pub fn extract_events(
    html: &str,
    link_base: &str,
    today: NaiveDate,
) -> Result<Vec<RawEvent>, EventsError> {
    let doc = Html::parse_document(html);
    let card_sel = selector(EVENT_SELECTOR)?;
    let name_sel = selector(".event-name")?;
    let link_sel = selector(".iframe-link")?;
    let lang_sel = selector(".language_text")?;
    let legacy_title_sel = selector(".event-title")?;
    let legacy_status_sel = selector(".status-text span")?;

    let date = today.format("%Y-%m-%d").to_string();
    let mut out = Vec::new();
    let mut cards = 0usize;

    for card in doc.select(&card_sel) {
        cards += 1;
        let category = card
            .value()
            .attr("data-category")
            .map(clean_text)
            .filter(|s| !s.is_empty());

        let mut ev = if let Some(name) = text_of(card, &name_sel) {
            let (time, title) = match name.split_once(" - ") {
                Some((t, rest)) => (t.trim().to_string(), rest.trim().to_string()),
                None => (String::new(), name),
            };
            let link = card
                .select(&link_sel)
                .next()
                .and_then(|i| i.value().attr("value"))
                .map(|v| v.trim().to_string())
                .unwrap_or_default();
            let mut ev = RawEvent::new(title, time, link);
            ev.language = text_of(card, &lang_sel);
            ev
        } else {
            let title = text_of(card, &legacy_title_sel).unwrap_or_default();
            let time = text_of(card, &legacy_status_sel)
                .filter(|s| looks_like_time(s))
                .unwrap_or_default();
            let link = card
                .value()
                .attr("data-url")
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|href| absolute_link(link_base, href))
                .unwrap_or_default();
            RawEvent::new(title, time, link)
        };
        ev.category = category;
        ev.date = Some(date.clone());
        out.push(ev);
    }

    if cards == 0 {
        return Err(EventsError::Scrape(format!(
            "no `{EVENT_SELECTOR}` elements found on page"
        )));
    }
    Ok(out)
}
