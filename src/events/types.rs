// src/events/types.rs
use serde::{Deserialize, Serialize};

use crate::events::error::EventsError;

/// One unmerged agenda row as delivered by a source, before deduplication.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    pub time_of_day: String, // "HH:MM", UTC-3 wall clock
    pub title: String,
    pub link: String,
    pub date: Option<String>, // "YYYY-MM-DD"
    pub category: Option<String>,
    pub language: Option<String>,
}

impl RawEvent {
    pub fn new(
        title: impl Into<String>,
        time_of_day: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        Self {
            time_of_day: time_of_day.into(),
            title: title.into(),
            link: link.into(),
            ..Self::default()
        }
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// `title__HH:MM`; two rows with the same key describe the same event slot.
    pub fn composite_key(&self) -> String {
        format!("{}__{}", self.title, self.time_of_day)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventStatus {
    Live,
    Upcoming,
}

/// Deduplicated, status-annotated event as served by `GET /api/events`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedEvent {
    pub time_of_day: String,
    pub title: String,
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub status: EventStatus,
}

#[async_trait::async_trait]
pub trait EventSource: Send + Sync {
    /// Acquire the current agenda. Every call does fresh upstream work.
    async fn fetch_current_events(&self) -> Result<Vec<RawEvent>, EventsError>;
    fn name(&self) -> &'static str;
}
