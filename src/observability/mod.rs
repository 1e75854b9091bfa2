//! Observability for validation runs
//!
//! - Structured logging (JSON lines)
//! - Typed events
//! - Lock-free counters
//!
//! Observability is read-only: it never changes a validation outcome.
//!
//! # Usage
//!
//! ```ignore
//! use valid::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::ValidationFailed, &[("record", "Job"), ("errors", "2")]);
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

/// Log an event with fields at its own severity
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
