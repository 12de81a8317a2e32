// src/events/mod.rs
pub mod error;
pub mod normalize;
pub mod providers;
pub mod sort;
pub mod status;
pub mod time;
pub mod types;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;

use crate::events::error::EventsError;
use crate::events::normalize::merge_events;
use crate::events::sort::{sort_scheduled, Scheduled};
use crate::events::status::classify;
use crate::events::time::{now_instant, resolve_event, Clock, Instant};
use crate::events::types::{EventSource, NormalizedEvent, RawEvent};

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("events_raw_total", "Raw agenda rows received from sources.");
        describe_counter!(
            "events_merged_total",
            "Distinct (title, time) slots after merging."
        );
        describe_counter!(
            "events_malformed_total",
            "Rows dropped for missing title, time or link."
        );
        describe_counter!(
            "events_unresolved_total",
            "Slots dropped because their date/time could not be resolved."
        );
        describe_counter!(
            "events_upstream_errors_total",
            "Feed fetch/parse and page scrape failures."
        );
        describe_gauge!(
            "events_pipeline_last_run_ts",
            "Unix ts when the events pipeline last ran."
        );
    });
}

/// Clean scraped/feed text: decode HTML entities, collapse whitespace, trim.
pub fn clean_text(s: &str) -> String {
    let decoded = html_escape::decode_html_entities(s);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Summary of a single pipeline pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub raw: usize,
    pub malformed: usize,
    pub merged: usize,
    pub unresolved: usize,
}

/// Merge, place in time, classify against `now` and order a batch.
pub fn build_event_list(raw: Vec<RawEvent>, now: Instant) -> Vec<NormalizedEvent> {
    build_event_list_with_stats(raw, now).0
}

pub fn build_event_list_with_stats(
    raw: Vec<RawEvent>,
    now: Instant,
) -> (Vec<NormalizedEvent>, PipelineStats) {
    let raw_count = raw.len();
    let (merged, malformed) = merge_events(raw);
    let merged_count = merged.len();

    let mut unresolved = 0usize;
    let mut scheduled = Vec::with_capacity(merged.len());
    for ev in merged {
        match resolve_event(&ev) {
            Ok(at) => {
                let status = classify(now, at);
                scheduled.push(Scheduled {
                    at,
                    event: ev.into_normalized(status),
                });
            }
            Err(e) => {
                tracing::warn!(target: "events", error = %e, kind = e.kind(), "excluding event");
                unresolved += 1;
            }
        }
    }

    let stats = PipelineStats {
        raw: raw_count,
        malformed,
        merged: merged_count,
        unresolved,
    };
    (sort_scheduled(scheduled), stats)
}

/// Fetch from `source` and run the pipeline once. Upstream failures propagate.
pub async fn run_once(
    source: &dyn EventSource,
    clock: &dyn Clock,
) -> Result<Vec<NormalizedEvent>, EventsError> {
    ensure_metrics_described();

    let raw = match source.fetch_current_events().await {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, kind = e.kind(), provider = source.name(), "provider error");
            counter!("events_upstream_errors_total").increment(1);
            return Err(e);
        }
    };
    tracing::info!(target: "events", provider = source.name(), count = raw.len(), "raw events fetched");

    let now = now_instant(clock);
    let (events, stats) = build_event_list_with_stats(raw, now);

    // Telemetry
    counter!("events_raw_total").increment(stats.raw as u64);
    counter!("events_merged_total").increment(stats.merged as u64);
    counter!("events_malformed_total").increment(stats.malformed as u64);
    counter!("events_unresolved_total").increment(stats.unresolved as u64);
    gauge!("events_pipeline_last_run_ts").set(now.timestamp() as f64);

    Ok(events)
}
