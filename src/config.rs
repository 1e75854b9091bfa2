//! Validation options
//!
//! Defaults give the strict behaviour: absent required fields are errors,
//! absent optional fields are defaulted, nothing is logged.

use serde::Deserialize;

/// Options for a [`crate::Validator`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Treat every field as optional without defaulting it.
    ///
    /// Absent fields are left out of the output, at every nesting level.
    pub all_optional: bool,
    /// Emit one structured log line per validation run.
    pub log_events: bool,
}

impl ValidationConfig {
    /// Strict validation, no logging.
    pub fn strict() -> Self {
        Self::default()
    }

    /// Partial validation: present fields are checked, absent ones skipped.
    pub fn partial() -> Self {
        Self {
            all_optional: true,
            ..Self::default()
        }
    }

    /// Same options with event logging switched on.
    pub fn with_logging(self) -> Self {
        Self {
            log_events: true,
            ..self
        }
    }
}
