// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod config;
pub mod events;
pub mod metrics;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::config::{EventsConfig, SourceKind};
pub use crate::events::error::EventsError;
pub use crate::events::types::{EventSource, EventStatus, NormalizedEvent, RawEvent};
