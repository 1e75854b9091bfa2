//! Structured JSON logger
//!
//! - One log line = one event
//! - Event name first, then severity, then fields sorted by key
//! - Synchronous, no buffering

use std::fmt;
use std::io::{self, Write};

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Debug-level detail
    Trace = 0,
    /// Normal operations
    Info = 1,
    /// Rejected input
    Warn = 2,
    /// Operation failures
    Error = 3,
}

impl Severity {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A structured logger that outputs JSON lines
pub struct Logger;

impl Logger {
    /// Log an event with the given severity and fields.
    ///
    /// ERROR goes to stderr, everything else to stdout.
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        if severity >= Severity::Error {
            Self::log_to_writer(severity, event, fields, &mut io::stderr());
        } else {
            Self::log_to_writer(severity, event, fields, &mut io::stdout());
        }
    }

    fn log_to_writer<W: Write>(
        severity: Severity,
        event: &str,
        fields: &[(&str, &str)],
        writer: &mut W,
    ) {
        let line = Self::render(severity, event, fields);
        // Logging never fails the caller.
        let _ = writer.write_all(line.as_bytes());
        let _ = writer.flush();
    }

    /// Renders one log line, newline included
    pub fn render(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
        let mut output = String::with_capacity(128);

        output.push_str("{\"event\":\"");
        Self::escape_json_string(&mut output, event);
        output.push_str("\",\"severity\":\"");
        output.push_str(severity.as_str());
        output.push('"');

        let mut sorted_fields: Vec<_> = fields.iter().collect();
        sorted_fields.sort_by_key(|(k, _)| *k);

        for (key, value) in sorted_fields {
            output.push_str(",\"");
            Self::escape_json_string(&mut output, key);
            output.push_str("\":\"");
            Self::escape_json_string(&mut output, value);
            output.push('"');
        }

        output.push_str("}\n");
        output
    }

    fn escape_json_string(output: &mut String, s: &str) {
        for c in s.chars() {
            match c {
                '"' => output.push_str("\\\""),
                '\\' => output.push_str("\\\\"),
                '\n' => output.push_str("\\n"),
                '\r' => output.push_str("\\r"),
                '\t' => output.push_str("\\t"),
                c if c.is_control() => {
                    output.push_str(&format!("\\u{:04x}", c as u32));
                }
                c => output.push(c),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Trace < Severity::Info);
        assert!(Severity::Info < Severity::Warn);
        assert!(Severity::Warn < Severity::Error);
    }

    #[test]
    fn test_render_is_json() {
        let output = Logger::render(
            Severity::Warn,
            "VALIDATION_FAILED",
            &[("record", "Job"), ("errors", "2")],
        );

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["event"], "VALIDATION_FAILED");
        assert_eq!(parsed["severity"], "WARN");
        assert_eq!(parsed["record"], "Job");
        assert_eq!(parsed["errors"], "2");
    }

    #[test]
    fn test_render_deterministic_ordering() {
        let output1 = Logger::render(Severity::Info, "TEST", &[("zebra", "1"), ("apple", "2")]);
        let output2 = Logger::render(Severity::Info, "TEST", &[("apple", "2"), ("zebra", "1")]);
        assert_eq!(output1, output2);
        assert!(output1.find("apple").unwrap() < output1.find("zebra").unwrap());
    }

    #[test]
    fn test_render_escapes_special_chars() {
        let output = Logger::render(
            Severity::Info,
            "TEST",
            &[("report", "field 'a': \"bad\"\nfield 'b'\u{0}")],
        );

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["report"], "field 'a': \"bad\"\nfield 'b'\u{0}");
    }

    #[test]
    fn test_render_one_line_event_first() {
        let output = Logger::render(Severity::Info, "MY_EVENT", &[("a", "1"), ("b", "2")]);

        assert_eq!(output.chars().filter(|c| *c == '\n').count(), 1);
        assert!(output.ends_with('\n'));
        assert!(output.find("\"event\"").unwrap() < output.find("\"severity\"").unwrap());
    }

    #[test]
    fn test_log_to_writer() {
        let mut buffer = Vec::new();
        Logger::log_to_writer(Severity::Info, "TEST", &[], &mut buffer);
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            Logger::render(Severity::Info, "TEST", &[])
        );
    }
}
