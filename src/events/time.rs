// src/events/time.rs
//! Wall-clock resolution in the agenda's civil time (fixed UTC-3, no DST).
//!
//! Instants are `DateTime<FixedOffset>` pinned to -03:00. Comparisons between
//! them are absolute, so "now" and scheduled times compare directly.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};

use crate::events::error::EventsError;
use crate::events::normalize::MergedEvent;

/// Seconds west of UTC for America/Argentina/Buenos_Aires.
pub const CIVIL_OFFSET_WEST_SECS: i32 = 3 * 3600;

pub type Instant = DateTime<FixedOffset>;

pub fn civil_offset() -> FixedOffset {
    FixedOffset::west_opt(CIVIL_OFFSET_WEST_SECS).expect("UTC-3 is a valid offset")
}

/// Source of the current time; swapped for a fixed clock in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub fn from_rfc3339(s: &str) -> Result<Self, chrono::ParseError> {
        Ok(Self(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc)))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeError {
    MissingDate,
    BadDate(String),
    BadTime(String),
}

/// Combine `YYYY-MM-DD` and `HH:MM` into an instant at -03:00.
pub fn resolve_instant(date: Option<&str>, time_of_day: &str) -> Result<Instant, TimeError> {
    let date = date.map(str::trim).filter(|d| !d.is_empty()).ok_or(TimeError::MissingDate)?;
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| TimeError::BadDate(date.to_string()))?;
    let tod = time_of_day.trim();
    let hm = NaiveTime::parse_from_str(tod, "%H:%M")
        .map_err(|_| TimeError::BadTime(tod.to_string()))?;

    day.and_time(hm)
        .and_local_timezone(civil_offset())
        .single()
        .ok_or_else(|| TimeError::BadTime(tod.to_string()))
}

/// Resolve a merged slot, naming it in the error.
pub fn resolve_event(ev: &MergedEvent) -> Result<Instant, EventsError> {
    resolve_instant(ev.date.as_deref(), &ev.time_of_day).map_err(|e| match e {
        TimeError::MissingDate => EventsError::MissingDate {
            title: ev.title.clone(),
            time_of_day: ev.time_of_day.clone(),
        },
        TimeError::BadDate(d) => EventsError::InvalidTime {
            title: ev.title.clone(),
            detail: format!("date '{d}' is not YYYY-MM-DD"),
        },
        TimeError::BadTime(t) => EventsError::InvalidTime {
            title: ev.title.clone(),
            detail: format!("time '{t}' is not HH:MM"),
        },
    })
}

pub fn now_instant(clock: &dyn Clock) -> Instant {
    clock.now().with_timezone(&civil_offset())
}

/// Calendar date in civil time; used to stamp sources that carry no date.
pub fn civil_today(clock: &dyn Clock) -> NaiveDate {
    now_instant(clock).date_naive()
}
