//! Observable validation events
//!
//! Events are explicit and typed.

use std::fmt;

use super::logger::Severity;

/// Observable events of a validation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Validation run started
    ValidationBegin,
    /// Input accepted
    ValidationPassed,
    /// Input rejected with one or more field errors
    ValidationFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ValidationBegin => "VALIDATION_BEGIN",
            Event::ValidationPassed => "VALIDATION_PASSED",
            Event::ValidationFailed => "VALIDATION_FAILED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::ValidationBegin => Severity::Trace,
            Event::ValidationPassed => Severity::Info,
            Event::ValidationFailed => Severity::Warn,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::ValidationBegin,
            Event::ValidationPassed,
            Event::ValidationFailed,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_rejection_is_a_warning() {
        assert_eq!(Event::ValidationFailed.severity(), Severity::Warn);
        assert!(Event::ValidationBegin.severity() < Event::ValidationPassed.severity());
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::ValidationPassed), "VALIDATION_PASSED");
    }
}
