// src/events/status.rs
use crate::events::time::Instant;
use crate::events::types::EventStatus;

/// LIVE once the scheduled instant has been reached (inclusive), else UPCOMING.
pub fn classify(now: Instant, scheduled: Instant) -> EventStatus {
    if now >= scheduled {
        EventStatus::Live
    } else {
        EventStatus::Upcoming
    }
}
