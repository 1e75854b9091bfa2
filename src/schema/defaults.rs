//! Default resolution for absent optional fields
//!
//! A literal default is trusted as declared. A from-type default is the
//! declared type's zero value; for records that means a fully defaulted
//! instance, which cannot exist while any nested field is required.

use serde_json::{Map, Value};

use super::errors::FieldPath;
use super::types::{DefaultPolicy, FieldSpec, RecordType, TypeDescriptor};

/// Resolves the value for an absent field.
///
/// Returns `Ok(None)` for required fields. On failure returns the paths,
/// relative to the field, of every required field that has no default.
pub fn resolve_default(spec: &FieldSpec) -> Result<Option<Value>, Vec<FieldPath>> {
    match &spec.default {
        DefaultPolicy::NoDefault => Ok(None),
        DefaultPolicy::Literal(value) => Ok(Some(value.clone())),
        DefaultPolicy::FromType => spec.ty.zero_value().map(Some),
    }
}

impl TypeDescriptor {
    /// Returns the canonical empty value of this type
    pub fn zero_value(&self) -> Result<Value, Vec<FieldPath>> {
        let value = match self {
            TypeDescriptor::Int => Value::from(0),
            TypeDescriptor::Float => Value::from(0.0),
            TypeDescriptor::BoundedInt { min, .. } => Value::from(*min),
            TypeDescriptor::BoundedFloat { min, .. } => Value::from(*min),
            TypeDescriptor::Bool => Value::Bool(false),
            TypeDescriptor::Str { min_len, .. } => Value::String("\0".repeat(*min_len)),
            TypeDescriptor::Enum { items } => items.first().cloned().unwrap_or(Value::Null),
            TypeDescriptor::List { .. } => Value::Array(Vec::new()),
            TypeDescriptor::Nullable { .. } => Value::Null,
            TypeDescriptor::Dict { record } => return record.zero_value(),
        };
        Ok(value)
    }
}

impl RecordType {
    /// Returns an instance with every field defaulted
    pub fn zero_value(&self) -> Result<Value, Vec<FieldPath>> {
        let mut out = Map::new();
        let mut missing = Vec::new();

        for (name, spec) in self.fields() {
            let field = FieldPath::from(name);
            match resolve_default(spec) {
                Ok(Some(value)) => {
                    out.insert(name.to_string(), value);
                }
                Ok(None) => missing.push(field),
                Err(nested) => missing.extend(nested.iter().map(|path| field.join(path))),
            }
        }

        if missing.is_empty() {
            Ok(Value::Object(out))
        } else {
            Err(missing)
        }
    }
}
