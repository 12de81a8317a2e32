// src/events/error.rs
//! Failure taxonomy for the events pipeline and its upstream sources.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventsError {
    /// Upstream feed unreachable or answered with a non-success status.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Upstream payload was not valid JSON or had an unexpected shape.
    #[error("parse error: {0}")]
    Parse(String),

    /// Page navigation, markup wait or extraction failed.
    #[error("scrape error: {0}")]
    Scrape(String),

    #[error("event '{title}' at {time_of_day} has no date")]
    MissingDate { title: String, time_of_day: String },

    #[error("event '{title}' has an unreadable date/time: {detail}")]
    InvalidTime { title: String, detail: String },
}

impl EventsError {
    /// Short, stable label for the failure class (used in metrics and logs).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fetch(_) => "fetch",
            Self::Parse(_) => "parse",
            Self::Scrape(_) => "scrape",
            Self::MissingDate { .. } => "missing_date",
            Self::InvalidTime { .. } => "invalid_time",
        }
    }

    /// Human summary for the HTTP error body; one per upstream failure class.
    pub fn summary(&self) -> &'static str {
        match self {
            Self::Fetch(_) => "Failed to fetch events",
            Self::Parse(_) => "Failed to read events feed",
            Self::Scrape(_) => "Failed to scrape events page",
            Self::MissingDate { .. } | Self::InvalidTime { .. } => "Failed to resolve event time",
        }
    }
}

impl From<reqwest::Error> for EventsError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Parse(e.to_string())
        } else {
            Self::Fetch(e.to_string())
        }
    }
}

impl From<serde_json::Error> for EventsError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}
