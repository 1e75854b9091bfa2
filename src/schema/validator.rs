//! Validation engine
//!
//! Validation semantics:
//! - Depth-first over the declared schema, fields in declaration order
//! - Every failure is recorded; nothing short-circuits inside a record or list
//! - Absent optional fields receive their default
//! - Undeclared input fields never reach the output
//! - All-or-nothing: a value is returned only when no error was recorded
//!
//! The engine never mutates its input or the schema.

use serde_json::{Map, Value};

use crate::config::ValidationConfig;
use crate::observability::{log_event_with_fields, Event, MetricsRegistry};

use super::defaults::resolve_default;
use super::errors::{ErrorKind, FieldError, FieldPath, PathSegment, ValidationError};
use super::types::{RecordType, TypeDescriptor};

/// Validates raw value trees against schemas.
///
/// A validator holds options and counters only; schemas are passed per call.
/// It can be shared across threads.
#[derive(Debug, Default)]
pub struct Validator {
    config: ValidationConfig,
    metrics: MetricsRegistry,
}

impl Validator {
    pub fn new(config: ValidationConfig) -> Self {
        Self {
            config,
            metrics: MetricsRegistry::new(),
        }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    /// Validates `raw` against a record schema.
    ///
    /// # Errors
    ///
    /// Returns every field error found. A non-object `raw` yields exactly one
    /// `TYPE_MISMATCH` at the root path.
    pub fn validate(&self, record: &RecordType, raw: &Value) -> Result<Value, ValidationError> {
        self.run(record.name(), |walk| walk.record(record, raw))
    }

    /// Validates `raw` against any type descriptor.
    pub fn validate_type(&self, ty: &TypeDescriptor, raw: &Value) -> Result<Value, ValidationError> {
        self.run(&ty.describe(), |walk| walk.value(ty, raw))
    }

    fn run<F>(&self, subject: &str, check: F) -> Result<Value, ValidationError>
    where
        F: FnOnce(&mut Walk<'_>) -> Option<Value>,
    {
        if self.config.log_events {
            log_event_with_fields(Event::ValidationBegin, &[("subject", subject)]);
        }

        let mut walk = Walk::new(&self.config);
        let validated = check(&mut walk);

        match validated {
            Some(value) if walk.errors.is_empty() => {
                self.metrics.increment_passed();
                self.metrics.add_defaults_applied(walk.defaults_applied);
                if self.config.log_events {
                    log_event_with_fields(
                        Event::ValidationPassed,
                        &[
                            ("subject", subject),
                            ("defaults", &walk.defaults_applied.to_string()),
                        ],
                    );
                }
                Ok(value)
            }
            _ => {
                let err = ValidationError::new(walk.errors);
                self.metrics.record_failure(err.len() as u64);
                if self.config.log_events {
                    log_event_with_fields(
                        Event::ValidationFailed,
                        &[
                            ("subject", subject),
                            ("errors", &err.len().to_string()),
                            ("report", &err.format()),
                        ],
                    );
                }
                Err(err)
            }
        }
    }
}

/// Validates `raw` against a record schema with default options.
pub fn validate(record: &RecordType, raw: &Value) -> Result<Value, ValidationError> {
    Validator::default().validate(record, raw)
}

/// Validates `raw` against any type descriptor with default options.
pub fn validate_type(ty: &TypeDescriptor, raw: &Value) -> Result<Value, ValidationError> {
    Validator::default().validate_type(ty, raw)
}

/// State of one traversal.
///
/// Every `None` returned by a check method is matched by at least one
/// recorded error.
struct Walk<'a> {
    config: &'a ValidationConfig,
    path: FieldPath,
    errors: Vec<FieldError>,
    defaults_applied: u64,
}

impl<'a> Walk<'a> {
    fn new(config: &'a ValidationConfig) -> Self {
        Self {
            config,
            path: FieldPath::root(),
            errors: Vec::new(),
            defaults_applied: 0,
        }
    }

    fn value(&mut self, ty: &TypeDescriptor, raw: &Value) -> Option<Value> {
        match ty {
            TypeDescriptor::Int => match integral(raw) {
                Some(value) => Some(value),
                None => self.mismatch(ty, raw),
            },
            TypeDescriptor::Float => {
                if raw.is_number() {
                    Some(raw.clone())
                } else {
                    self.mismatch(ty, raw)
                }
            }
            TypeDescriptor::BoundedInt { min, max } => {
                let Some(value) = integral(raw) else {
                    return self.mismatch(&TypeDescriptor::Int, raw);
                };
                match value.as_i64() {
                    Some(n) if (*min..=*max).contains(&n) => Some(value),
                    _ => self.fail(ErrorKind::OutOfRange {
                        min: min.to_string(),
                        max: max.to_string(),
                        actual: value.to_string(),
                    }),
                }
            }
            TypeDescriptor::BoundedFloat { min, max } => {
                let Some(n) = raw.as_f64() else {
                    return self.mismatch(&TypeDescriptor::Float, raw);
                };
                if *min <= n && n <= *max {
                    Some(raw.clone())
                } else {
                    self.fail(ErrorKind::OutOfRange {
                        min: min.to_string(),
                        max: max.to_string(),
                        actual: raw.to_string(),
                    })
                }
            }
            TypeDescriptor::Bool => {
                if raw.is_boolean() {
                    Some(raw.clone())
                } else {
                    self.mismatch(ty, raw)
                }
            }
            TypeDescriptor::Str { min_len, max_len } => {
                let Some(text) = raw.as_str() else {
                    return self.mismatch(ty, raw);
                };
                let len = text.chars().count();
                if len > *max_len {
                    self.fail(ErrorKind::LengthExceeded {
                        what: "string",
                        unit: "characters",
                        max: *max_len,
                        actual: len,
                    })
                } else if len < *min_len {
                    self.fail(ErrorKind::LengthBelowMinimum {
                        what: "string",
                        unit: "characters",
                        min: *min_len,
                        actual: len,
                    })
                } else {
                    Some(raw.clone())
                }
            }
            TypeDescriptor::Enum { items } => {
                if let Some(item) = enumerated(items, raw) {
                    Some(item.clone())
                } else {
                    self.fail(ErrorKind::NotAllowed {
                        allowed: items.clone(),
                        actual: raw.clone(),
                    })
                }
            }
            TypeDescriptor::List {
                element,
                min_len,
                max_len,
            } => self.list(ty, element, *min_len, *max_len, raw),
            TypeDescriptor::Nullable { inner } => {
                if raw.is_null() {
                    Some(Value::Null)
                } else {
                    self.value(inner, raw)
                }
            }
            TypeDescriptor::Dict { record } => self.record(record, raw),
        }
    }

    fn list(
        &mut self,
        ty: &TypeDescriptor,
        element: &TypeDescriptor,
        min_len: Option<usize>,
        max_len: Option<usize>,
        raw: &Value,
    ) -> Option<Value> {
        let Some(items) = raw.as_array() else {
            return self.mismatch(ty, raw);
        };
        let before = self.errors.len();

        if let Some(max) = max_len.filter(|max| items.len() > *max) {
            self.report(ErrorKind::LengthExceeded {
                what: "list",
                unit: "elements",
                max,
                actual: items.len(),
            });
        }
        if let Some(min) = min_len.filter(|min| items.len() < *min) {
            self.report(ErrorKind::LengthBelowMinimum {
                what: "list",
                unit: "elements",
                min,
                actual: items.len(),
            });
        }

        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            self.path.push(PathSegment::Index(index));
            if let Some(value) = self.value(element, item) {
                out.push(value);
            }
            self.path.pop();
        }

        (self.errors.len() == before).then_some(Value::Array(out))
    }

    fn record(&mut self, record: &RecordType, raw: &Value) -> Option<Value> {
        let Some(input) = raw.as_object() else {
            return self.fail(ErrorKind::TypeMismatch {
                expected: format!("object '{}'", record.name()),
                found: json_type_name(raw),
            });
        };
        let before = self.errors.len();
        let mut out = Map::new();

        for (name, spec) in record.fields() {
            self.path.push(PathSegment::Field(name.to_string()));

            match input.get(name) {
                Some(raw_field) => {
                    if let Some(value) = self.value(&spec.ty, raw_field) {
                        out.insert(name.to_string(), value);
                    }
                }
                None if self.config.all_optional => {}
                None => match resolve_default(spec) {
                    Ok(Some(value)) => {
                        self.defaults_applied += 1;
                        out.insert(name.to_string(), value);
                    }
                    Ok(None) => self.report(ErrorKind::MissingField),
                    Err(missing) => {
                        for nested in &missing {
                            let path = self.path.join(nested);
                            self.errors.push(FieldError::new(path, ErrorKind::MissingField));
                        }
                    }
                },
            }

            self.path.pop();
        }

        (self.errors.len() == before).then_some(Value::Object(out))
    }

    fn report(&mut self, kind: ErrorKind) {
        self.errors.push(FieldError::new(self.path.clone(), kind));
    }

    fn fail(&mut self, kind: ErrorKind) -> Option<Value> {
        self.report(kind);
        None
    }

    fn mismatch(&mut self, ty: &TypeDescriptor, raw: &Value) -> Option<Value> {
        self.fail(ErrorKind::TypeMismatch {
            expected: ty.describe(),
            found: json_type_name(raw),
        })
    }
}

/// Returns `raw` as an integer value, accepting floats with no fractional part.
///
/// Integral floats within `i64` are normalised to integers. Larger magnitudes
/// only exist as floats in the value tree and are returned unchanged.
fn integral(raw: &Value) -> Option<Value> {
    let Value::Number(n) = raw else {
        return None;
    };
    if n.is_i64() || n.is_u64() {
        return Some(raw.clone());
    }
    let f = n.as_f64().filter(|f| f.is_finite() && f.fract() == 0.0)?;
    if f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(Value::from(f as i64))
    } else {
        Some(raw.clone())
    }
}

/// Returns the enumerated item equal to `raw`, comparing numbers by value.
fn enumerated<'v>(items: &'v [Value], raw: &Value) -> Option<&'v Value> {
    items.iter().find(|item| match (item.as_f64(), raw.as_f64()) {
        (Some(a), Some(b)) if item.is_f64() || raw.is_f64() => a == b,
        _ => *item == raw,
    })
}

/// Returns the JSON type name for error messages.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "int"
            } else {
                "float"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSpec;
    use serde_json::json;

    fn single_error(ty: &TypeDescriptor, raw: Value) -> FieldError {
        let err = validate_type(ty, &raw).unwrap_err();
        assert_eq!(err.len(), 1, "expected one error, got: {}", err);
        err.into_errors().remove(0)
    }

    #[test]
    fn test_int_accepts_integers() {
        let ty = TypeDescriptor::int();
        assert_eq!(validate_type(&ty, &json!(42)), Ok(json!(42)));
        assert_eq!(validate_type(&ty, &json!(-7)), Ok(json!(-7)));
        assert_eq!(validate_type(&ty, &json!(u64::MAX)), Ok(json!(u64::MAX)));
    }

    #[test]
    fn test_int_normalises_integral_floats() {
        let ty = TypeDescriptor::int();
        assert_eq!(validate_type(&ty, &json!(3.0)), Ok(json!(3)));
        assert_eq!(single_error(&ty, json!(3.5)).code(), "TYPE_MISMATCH");
    }

    #[test]
    fn test_int_accepts_any_magnitude() {
        let ty = TypeDescriptor::int();
        let huge: Value = serde_json::from_str("20000000000000000000").unwrap();

        let validated = validate_type(&ty, &huge).unwrap();
        assert_eq!(validated, huge);
        assert_eq!(validate_type(&ty, &validated), Ok(huge));
        assert_eq!(validate_type(&ty, &json!(-1e19)), Ok(json!(-1e19)));
    }

    #[test]
    fn test_int_rejects_other_kinds() {
        let ty = TypeDescriptor::int();
        for raw in [json!("42"), json!(true), json!(null), json!([1]), json!({})] {
            let err = single_error(&ty, raw);
            assert!(err.path().is_root());
            assert_eq!(err.code(), "TYPE_MISMATCH");
        }
    }

    #[test]
    fn test_bool_has_no_truthiness() {
        let ty = TypeDescriptor::bool();
        assert_eq!(validate_type(&ty, &json!(false)), Ok(json!(false)));
        for raw in [json!(0), json!(""), json!("false"), json!(null)] {
            assert_eq!(single_error(&ty, raw).code(), "TYPE_MISMATCH");
        }
    }

    #[test]
    fn test_str_length_bounds() {
        let ty = TypeDescriptor::str_between(2, 4).unwrap();
        assert_eq!(validate_type(&ty, &json!("abcd")), Ok(json!("abcd")));

        let err = single_error(&ty, json!("abcde"));
        assert_eq!(
            err.kind(),
            &ErrorKind::LengthExceeded {
                what: "string",
                unit: "characters",
                max: 4,
                actual: 5
            }
        );

        assert_eq!(single_error(&ty, json!("a")).code(), "LENGTH_BELOW_MINIMUM");
        assert_eq!(single_error(&ty, json!(12)).code(), "TYPE_MISMATCH");
    }

    #[test]
    fn test_str_counts_characters_not_bytes() {
        let ty = TypeDescriptor::str(2);
        assert!(validate_type(&ty, &json!("\u{1234}\u{1235}")).is_ok());
    }

    #[test]
    fn test_float_and_bounds() {
        assert_eq!(validate_type(&TypeDescriptor::float(), &json!(2.5)), Ok(json!(2.5)));
        assert_eq!(validate_type(&TypeDescriptor::float(), &json!(2)), Ok(json!(2)));

        let ty = TypeDescriptor::bounded_float(1.3, 2.4).unwrap();
        assert!(validate_type(&ty, &json!(1.41421)).is_ok());
        assert_eq!(single_error(&ty, json!(1.1)).code(), "OUT_OF_RANGE");
        assert_eq!(
            single_error(&ty, json!("2.0")).format(),
            "value: expected float, got string"
        );
    }

    #[test]
    fn test_bounded_int() {
        let ty = TypeDescriptor::bounded_int(1, 20).unwrap();
        assert_eq!(validate_type(&ty, &json!(15)), Ok(json!(15)));

        let err = single_error(&ty, json!(0));
        assert_eq!(
            err.kind(),
            &ErrorKind::OutOfRange {
                min: "1".into(),
                max: "20".into(),
                actual: "0".into()
            }
        );
        assert_eq!(single_error(&ty, json!(u64::MAX)).code(), "OUT_OF_RANGE");
        assert_eq!(single_error(&ty, json!(1e19)).code(), "OUT_OF_RANGE");
        assert_eq!(
            single_error(&ty, json!("15")).format(),
            "value: expected int, got string"
        );
    }

    #[test]
    fn test_enum() {
        let ty = TypeDescriptor::enumeration(["a", "b", "c"]).unwrap();
        assert_eq!(validate_type(&ty, &json!("b")), Ok(json!("b")));

        let err = single_error(&ty, json!("x"));
        assert_eq!(err.code(), "NOT_ALLOWED");
        assert_eq!(
            err.format(),
            "value: expected one of [\"a\", \"b\", \"c\"], got \"x\""
        );
    }

    #[test]
    fn test_enum_compares_numbers_by_value() {
        let ty = TypeDescriptor::enumeration([1, 2]).unwrap();
        assert_eq!(validate_type(&ty, &json!(1.0)), Ok(json!(1)));
        assert_eq!(validate_type(&ty, &json!(2)), Ok(json!(2)));
        assert_eq!(single_error(&ty, json!(1.5)).code(), "NOT_ALLOWED");
        assert_eq!(single_error(&ty, json!("1")).code(), "NOT_ALLOWED");
    }

    #[test]
    fn test_list_reports_every_failing_element() {
        let ty = TypeDescriptor::list(TypeDescriptor::int());
        let err = validate_type(&ty, &json!([1, "two", 3, null, 5])).unwrap_err();

        let paths: Vec<String> = err.errors().iter().map(|e| e.path().to_string()).collect();
        assert_eq!(paths, vec!["[1]", "[3]"]);
    }

    #[test]
    fn test_list_preserves_order() {
        let ty = TypeDescriptor::list(TypeDescriptor::str(4));
        assert_eq!(
            validate_type(&ty, &json!(["en", "fr", "de"])),
            Ok(json!(["en", "fr", "de"]))
        );
    }

    #[test]
    fn test_list_length_and_elements_both_reported() {
        let ty = TypeDescriptor::list_between(TypeDescriptor::int(), 0, 2).unwrap();
        let err = validate_type(&ty, &json!([1, "x", 3])).unwrap_err();

        assert_eq!(err.len(), 2);
        assert_eq!(err.errors()[0].code(), "LENGTH_EXCEEDED");
        assert!(err.errors()[0].path().is_root());
        assert_eq!(err.errors()[1].path().to_string(), "[1]");
    }

    #[test]
    fn test_nullable() {
        let ty = TypeDescriptor::nullable(TypeDescriptor::int());
        assert_eq!(validate_type(&ty, &json!(null)), Ok(json!(null)));
        assert_eq!(validate_type(&ty, &json!(4)), Ok(json!(4)));
        assert_eq!(single_error(&ty, json!("4")).code(), "TYPE_MISMATCH");
    }

    #[test]
    fn test_record_root_mismatch_is_single_error() {
        let record = RecordType::builder("Job")
            .field("a", TypeDescriptor::int())
            .field("b", TypeDescriptor::int())
            .build()
            .unwrap();

        let err = validate(&record, &json!([1, 2])).unwrap_err();
        assert_eq!(err.len(), 1);
        assert!(err.errors()[0].path().is_root());
        assert_eq!(err.format(), "value: expected object 'Job', got array");
    }

    #[test]
    fn test_nested_paths() {
        let inner = RecordType::builder("Inner")
            .field("key", TypeDescriptor::str(3))
            .build()
            .unwrap();
        let outer = RecordType::builder("Outer")
            .field("items", TypeDescriptor::list(TypeDescriptor::dict(inner)))
            .build()
            .unwrap();

        let err = validate(&outer, &json!({ "items": [{ "key": "ok" }, { "key": "long" }, {}] }))
            .unwrap_err();

        let paths: Vec<String> = err.errors().iter().map(|e| e.path().to_string()).collect();
        assert_eq!(paths, vec!["items[1].key", "items[2].key"]);
        assert_eq!(err.errors()[1].code(), "MISSING_FIELD");
    }

    #[test]
    fn test_unsatisfiable_default_reports_nested_paths() {
        let encryption = RecordType::builder("EncryptionDict")
            .field("key", TypeDescriptor::str(128))
            .field("iv", TypeDescriptor::str(8))
            .build()
            .unwrap();
        // The builder refuses this declaration; assemble it directly.
        let record = RecordType::unchecked(
            "Job",
            vec![(
                "encryption".to_string(),
                FieldSpec::from_type(TypeDescriptor::dict(encryption)),
            )],
        );

        let err = validate(&record, &json!({})).unwrap_err();
        let paths: Vec<String> = err.errors().iter().map(|e| e.path().to_string()).collect();
        assert_eq!(paths, vec!["encryption.key", "encryption.iv"]);
        assert!(err.errors().iter().all(|e| e.code() == "MISSING_FIELD"));
    }

    #[test]
    fn test_all_optional_skips_absent_fields() {
        let record = RecordType::builder("Job")
            .field("jobid", TypeDescriptor::int())
            .defaulted("nodeblock", TypeDescriptor::bool())
            .build()
            .unwrap();
        let validator = Validator::new(ValidationConfig::partial());

        assert_eq!(validator.validate(&record, &json!({})), Ok(json!({})));
        assert!(validator.validate(&record, &json!({ "jobid": "x" })).is_err());
    }

    #[test]
    fn test_metrics_track_runs() {
        let record = RecordType::builder("Job")
            .field("jobid", TypeDescriptor::int())
            .defaulted("nodeblock", TypeDescriptor::bool())
            .build()
            .unwrap();
        let validator = Validator::default();

        validator.validate(&record, &json!({ "jobid": 1 })).unwrap();
        validator.validate(&record, &json!({ "jobid": "x" })).unwrap_err();
        validator.validate(&record, &json!("nope")).unwrap_err();

        let snapshot = validator.metrics().snapshot();
        assert_eq!(snapshot.validations_passed, 1);
        assert_eq!(snapshot.validations_failed, 2);
        assert_eq!(snapshot.field_errors, 2);
        assert_eq!(snapshot.defaults_applied, 1);
    }

    #[test]
    fn test_logging_does_not_change_outcome() {
        let record = RecordType::builder("Job")
            .field("jobid", TypeDescriptor::int())
            .build()
            .unwrap();
        let quiet = Validator::default();
        let noisy = Validator::new(ValidationConfig::strict().with_logging());

        for raw in [json!({ "jobid": 1 }), json!({})] {
            assert_eq!(quiet.validate(&record, &raw), noisy.validate(&record, &raw));
        }
    }

    #[test]
    fn test_json_type_names() {
        assert_eq!(json_type_name(&json!(null)), "null");
        assert_eq!(json_type_name(&json!(1)), "int");
        assert_eq!(json_type_name(&json!(1.5)), "float");
        assert_eq!(json_type_name(&json!({})), "object");
    }
}
