// src/events/sort.rs
use crate::events::time::Instant;
use crate::events::types::NormalizedEvent;

/// An event with its resolved instant attached; only lives inside the pipeline.
#[derive(Debug, Clone)]
pub struct Scheduled {
    pub at: Instant,
    pub event: NormalizedEvent,
}

/// Ascending by instant; equal instants keep their input (first-seen) order.
/// The instant is dropped on the way out.
pub fn sort_scheduled(mut items: Vec<Scheduled>) -> Vec<NormalizedEvent> {
    // `sort_by_key` is stable
    items.sort_by_key(|s| s.at);
    items.into_iter().map(|s| s.event).collect()
}
