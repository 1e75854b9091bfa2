//! Validation counters
//!
//! - Counters only
//! - Monotonic increase
//! - Thread-safe, lock-free

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for validation runs.
///
/// Uses Relaxed ordering; counters are independent of each other.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Runs that produced a validated value
    validations_passed: AtomicU64,
    /// Runs that produced a validation error
    validations_failed: AtomicU64,
    /// Individual field errors reported
    field_errors: AtomicU64,
    /// Defaults filled in for absent fields
    defaults_applied: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_passed(&self) {
        self.validations_passed.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one failed run carrying `errors` field errors
    pub fn record_failure(&self, errors: u64) {
        self.validations_failed.fetch_add(1, Ordering::Relaxed);
        self.field_errors.fetch_add(errors, Ordering::Relaxed);
    }

    pub fn add_defaults_applied(&self, count: u64) {
        self.defaults_applied.fetch_add(count, Ordering::Relaxed);
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            validations_passed: self.validations_passed.load(Ordering::Relaxed),
            validations_failed: self.validations_failed.load(Ordering::Relaxed),
            field_errors: self.field_errors.load(Ordering::Relaxed),
            defaults_applied: self.defaults_applied.load(Ordering::Relaxed),
        }
    }

    /// Current values as a JSON object
    pub fn to_json(&self) -> String {
        let s = self.snapshot();
        serde_json::json!({
            "validations_passed": s.validations_passed,
            "validations_failed": s.validations_failed,
            "field_errors": s.field_errors,
            "defaults_applied": s.defaults_applied,
        })
        .to_string()
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub validations_passed: u64,
    pub validations_failed: u64,
    pub field_errors: u64,
    pub defaults_applied: u64,
}
