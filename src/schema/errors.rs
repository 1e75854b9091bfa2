//! Error model for validation and schema declaration
//!
//! Two families of errors live here:
//! - `FieldError` / `ValidationError`: recoverable, path-annotated failures
//!   collected over a whole validation run
//! - `SchemaError`: misuse detected while a schema is being declared

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// One step of a path into a value tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A named record field
    Field(String),
    /// A 0-based list position
    Index(usize),
}

/// Location of a value inside the validated tree.
///
/// The empty path denotes the root value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// The root path
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns true for the root path
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the path segments in order
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Returns a new path extended by a field name
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut path = self.clone();
        path.push(PathSegment::Field(name.into()));
        path
    }

    /// Returns a new path extended by a list index
    pub fn at(&self, index: usize) -> Self {
        let mut path = self.clone();
        path.push(PathSegment::Index(index));
        path
    }

    /// Returns this path followed by every segment of `suffix`
    pub fn join(&self, suffix: &FieldPath) -> Self {
        let mut path = self.clone();
        path.segments.extend(suffix.segments.iter().cloned());
        path
    }

    pub(crate) fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    pub(crate) fn pop(&mut self) {
        self.segments.pop();
    }
}

impl From<&str> for FieldPath {
    fn from(name: &str) -> Self {
        FieldPath::root().child(name)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if i == 0 => write!(f, "{}", name)?,
                PathSegment::Field(name) => write!(f, ".{}", name)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

/// What went wrong at a single location.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    /// Raw value has the wrong kind for the declared type
    TypeMismatch {
        expected: String,
        found: &'static str,
    },
    /// Text or list is longer than allowed
    LengthExceeded {
        what: &'static str,
        unit: &'static str,
        max: usize,
        actual: usize,
    },
    /// Text or list is shorter than allowed
    LengthBelowMinimum {
        what: &'static str,
        unit: &'static str,
        min: usize,
        actual: usize,
    },
    /// Number outside its declared bounds
    OutOfRange {
        min: String,
        max: String,
        actual: String,
    },
    /// Value is not one of the enumerated items
    NotAllowed { allowed: Vec<Value>, actual: Value },
    /// Required field absent from the input
    MissingField,
}

impl ErrorKind {
    /// Returns the stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::TypeMismatch { .. } => "TYPE_MISMATCH",
            ErrorKind::LengthExceeded { .. } => "LENGTH_EXCEEDED",
            ErrorKind::LengthBelowMinimum { .. } => "LENGTH_BELOW_MINIMUM",
            ErrorKind::OutOfRange { .. } => "OUT_OF_RANGE",
            ErrorKind::NotAllowed { .. } => "NOT_ALLOWED",
            ErrorKind::MissingField => "MISSING_FIELD",
        }
    }

    /// Full description used by `FieldError::format`
    pub fn message(&self) -> String {
        match self {
            ErrorKind::TypeMismatch { expected, found } => {
                format!("expected {}, got {}", expected, found)
            }
            ErrorKind::LengthExceeded {
                what,
                unit,
                max,
                actual,
            } => format!(
                "expected {} of length <= {}, got {} {}",
                what, max, actual, unit
            ),
            ErrorKind::LengthBelowMinimum {
                what,
                unit,
                min,
                actual,
            } => format!(
                "expected {} of length >= {}, got {} {}",
                what, min, actual, unit
            ),
            ErrorKind::OutOfRange { min, max, actual } => {
                format!("expected value between {} and {}, got {}", min, max, actual)
            }
            ErrorKind::NotAllowed { allowed, actual } => {
                format!("expected one of {}, got {}", render_items(allowed), actual)
            }
            ErrorKind::MissingField => "required field is missing".to_string(),
        }
    }

    /// Short predicate phrase used by `ValidationError::summary`
    pub fn phrase(&self) -> String {
        match self {
            ErrorKind::TypeMismatch { expected, .. } => format!("is not a valid {}", expected),
            ErrorKind::LengthExceeded { max, unit, .. } => {
                format!("must be no more than {} {}", max, unit)
            }
            ErrorKind::LengthBelowMinimum { min, unit, .. } => {
                format!("must be at least {} {}", min, unit)
            }
            ErrorKind::OutOfRange { min, max, .. } => {
                format!("must be between {} and {}", min, max)
            }
            ErrorKind::NotAllowed { .. } => "is not a valid value".to_string(),
            ErrorKind::MissingField => "is required".to_string(),
        }
    }
}

fn render_items(items: &[Value]) -> String {
    let rendered: Vec<String> = items.iter().map(Value::to_string).collect();
    format!("[{}]", rendered.join(", "))
}

/// A single path-annotated validation failure.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    path: FieldPath,
    kind: ErrorKind,
}

impl FieldError {
    pub fn new(path: FieldPath, kind: ErrorKind) -> Self {
        Self { path, kind }
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Shorthand for `kind().code()`
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Renders the error as one sentence, e.g.
    /// `field 'encryption.key': expected string of length <= 128, got 130 characters`
    pub fn format(&self) -> String {
        if self.path.is_root() {
            format!("value: {}", self.kind.message())
        } else {
            format!("field '{}': {}", self.path, self.kind.message())
        }
    }

    fn subject(&self) -> String {
        if self.path.is_root() {
            "value".to_string()
        } else {
            self.path.to_string()
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

impl std::error::Error for FieldError {}

/// Aggregate failure of one validation run.
///
/// Holds every `FieldError` found, in traversal order. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    errors: Vec<FieldError>,
}

impl ValidationError {
    pub(crate) fn new(errors: Vec<FieldError>) -> Self {
        debug_assert!(!errors.is_empty());
        Self { errors }
    }

    /// Returns the individual errors in traversal order
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the first error reported at `path`, if any
    pub fn at(&self, path: &FieldPath) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.path() == path)
    }

    /// Multi-line report, one line per error
    pub fn format(&self) -> String {
        let lines: Vec<String> = self.errors.iter().map(FieldError::format).collect();
        lines.join("\n")
    }

    /// One-line phrase, e.g. `jobid is required and languages[0] must be no more than 4 characters`
    pub fn summary(&self) -> String {
        let phrases: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{} {}", e.subject(), e.kind.phrase()))
            .collect();
        join_phrases("and", &phrases)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

impl std::error::Error for ValidationError {}

/// Joins phrases with commas, placing `word` before the last one.
/// Two or fewer phrases are joined by `word` alone.
fn join_phrases(word: &str, phrases: &[String]) -> String {
    match phrases {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{} {} {}", first, word, second),
        [init @ .., last] => format!("{}, {} {}", init.join(", "), word, last),
    }
}

/// Misuse detected while declaring a schema.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    /// Same field declared twice in one record
    #[error("record '{record}' declares field '{field}' more than once")]
    DuplicateField { record: String, field: String },

    /// Required field carrying a default policy
    #[error("field '{field}' of record '{record}' is required but declares a default")]
    RequiredWithDefault { record: String, field: String },

    /// Optional field with no default policy
    #[error("field '{field}' of record '{record}' is optional but declares no default")]
    OptionalWithoutDefault { record: String, field: String },

    /// Lower bound above upper bound, or non-finite bound
    #[error("invalid bounds: minimum {min} must not exceed maximum {max}")]
    InvalidBounds { min: String, max: String },

    /// Enumeration without items
    #[error("enumeration must list at least one item")]
    EmptyEnum,

    /// From-type default over a record with required fields
    #[error("field '{field}' of record '{record}' cannot derive a default: {missing} required with no default")]
    UnsatisfiableDefault {
        record: String,
        field: String,
        missing: String,
    },
}

/// Result type for schema declaration
pub type SchemaResult<T> = Result<T, SchemaError>;
