// src/events/normalize.rs
//! Merge raw agenda rows into one entry per (title, time-of-day) slot.

use std::collections::HashMap;

use crate::events::types::{EventStatus, NormalizedEvent, RawEvent};

/// A merged slot that has not been placed in time yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedEvent {
    pub time_of_day: String,
    pub title: String,
    pub options: Vec<String>,
    pub category: Option<String>,
    pub language: Option<String>,
    pub date: Option<String>,
}

impl MergedEvent {
    fn first_seen(ev: RawEvent) -> Self {
        Self {
            time_of_day: ev.time_of_day,
            title: ev.title,
            options: vec![ev.link],
            category: ev.category,
            language: ev.language,
            date: ev.date,
        }
    }

    pub fn into_normalized(self, status: EventStatus) -> NormalizedEvent {
        NormalizedEvent {
            time_of_day: self.time_of_day,
            title: self.title,
            options: self.options,
            category: self.category,
            language: self.language,
            date: self.date,
            status,
        }
    }
}

/// Insertion-ordered key -> slot map. Keys live in `index`, slots in `slots`
/// in first-seen order.
#[derive(Debug, Default)]
pub struct EventNormalizer {
    slots: Vec<MergedEvent>,
    index: HashMap<String, usize>,
    malformed: usize,
}

impl EventNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one row. Scalar fields of a slot are fixed by its first row; later
    /// rows only contribute their link.
    pub fn push(&mut self, ev: RawEvent) {
        if let Some(missing) = missing_field(&ev) {
            tracing::debug!(
                target: "events",
                title = %ev.title,
                time = %ev.time_of_day,
                missing,
                "skipping malformed raw event"
            );
            self.malformed += 1;
            return;
        }

        let key = ev.composite_key();
        match self.index.get(&key) {
            Some(&i) => self.slots[i].options.push(ev.link),
            None => {
                self.index.insert(key, self.slots.len());
                self.slots.push(MergedEvent::first_seen(ev));
            }
        }
    }

    /// Rows rejected so far for lacking a title, time or link.
    pub fn malformed(&self) -> usize {
        self.malformed
    }

    pub fn finish(self) -> Vec<MergedEvent> {
        self.slots
    }
}

fn missing_field(ev: &RawEvent) -> Option<&'static str> {
    if ev.title.trim().is_empty() {
        Some("title")
    } else if ev.time_of_day.trim().is_empty() {
        Some("time")
    } else if ev.link.trim().is_empty() {
        Some("link")
    } else {
        None
    }
}

/// Merge a batch. Returns the slots in first-seen key order and the number of
/// malformed rows that were dropped.
pub fn merge_events(raw: Vec<RawEvent>) -> (Vec<MergedEvent>, usize) {
    let mut n = EventNormalizer::new();
    for ev in raw {
        n.push(ev);
    }
    let malformed = n.malformed();
    (n.finish(), malformed)
}
