// src/config/mod.rs
pub mod events;

pub use events::{EventsConfig, SourceKind};
