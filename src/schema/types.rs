//! Type descriptors and record declarations
//!
//! Supported types:
//! - int, float, bounded int/float
//! - bool
//! - string with a mandatory maximum length
//! - enumeration of literal items
//! - list with a single element type
//! - nullable wrapper
//! - record (named, ordered field schema)

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

use super::defaults::resolve_default;
use super::errors::{SchemaError, SchemaResult};

/// Describes how one category of value is validated and defaulted.
///
/// Descriptors are immutable once built and may be shared across threads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TypeDescriptor {
    /// Integral number of any magnitude representable by the value tree
    Int,
    /// Any number
    Float,
    /// Integral number within `min..=max`
    BoundedInt { min: i64, max: i64 },
    /// Number within `min..=max`
    BoundedFloat { min: f64, max: f64 },
    /// Boolean, no truthiness coercion
    Bool,
    /// Text whose length in characters lies in `min_len..=max_len`
    Str {
        #[serde(default)]
        min_len: usize,
        max_len: usize,
    },
    /// One of a fixed set of literal values
    Enum { items: Vec<Value> },
    /// Homogeneous sequence
    List {
        element: Box<TypeDescriptor>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_len: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_len: Option<usize>,
    },
    /// Either null or a value of the inner type
    Nullable { inner: Box<TypeDescriptor> },
    /// Nested record
    Dict { record: Arc<RecordType> },
}

impl TypeDescriptor {
    pub fn int() -> Self {
        TypeDescriptor::Int
    }

    pub fn float() -> Self {
        TypeDescriptor::Float
    }

    pub fn bool() -> Self {
        TypeDescriptor::Bool
    }

    /// String of at most `max_len` characters
    pub fn str(max_len: usize) -> Self {
        TypeDescriptor::Str { min_len: 0, max_len }
    }

    /// String of `min_len..=max_len` characters
    pub fn str_between(min_len: usize, max_len: usize) -> SchemaResult<Self> {
        let ty = TypeDescriptor::Str { min_len, max_len };
        ty.check()?;
        Ok(ty)
    }

    pub fn bounded_int(min: i64, max: i64) -> SchemaResult<Self> {
        let ty = TypeDescriptor::BoundedInt { min, max };
        ty.check()?;
        Ok(ty)
    }

    pub fn bounded_float(min: f64, max: f64) -> SchemaResult<Self> {
        let ty = TypeDescriptor::BoundedFloat { min, max };
        ty.check()?;
        Ok(ty)
    }

    pub fn enumeration<I>(items: I) -> SchemaResult<Self>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let ty = TypeDescriptor::Enum {
            items: items.into_iter().map(Into::into).collect(),
        };
        ty.check()?;
        Ok(ty)
    }

    pub fn list(element: TypeDescriptor) -> Self {
        TypeDescriptor::List {
            element: Box::new(element),
            min_len: None,
            max_len: None,
        }
    }

    /// List holding `min_len..=max_len` elements
    pub fn list_between(element: TypeDescriptor, min_len: usize, max_len: usize) -> SchemaResult<Self> {
        let ty = TypeDescriptor::List {
            element: Box::new(element),
            min_len: Some(min_len),
            max_len: Some(max_len),
        };
        ty.check()?;
        Ok(ty)
    }

    pub fn nullable(inner: TypeDescriptor) -> Self {
        TypeDescriptor::Nullable {
            inner: Box::new(inner),
        }
    }

    pub fn dict(record: impl Into<Arc<RecordType>>) -> Self {
        TypeDescriptor::Dict {
            record: record.into(),
        }
    }

    /// Returns a human-readable description used in error messages
    pub fn describe(&self) -> String {
        match self {
            TypeDescriptor::Int => "int".to_string(),
            TypeDescriptor::Float => "float".to_string(),
            TypeDescriptor::BoundedInt { min, max } => format!("int between {} and {}", min, max),
            TypeDescriptor::BoundedFloat { min, max } => {
                format!("float between {} and {}", min, max)
            }
            TypeDescriptor::Bool => "bool".to_string(),
            TypeDescriptor::Str { min_len: 0, max_len } => {
                format!("string of length <= {}", max_len)
            }
            TypeDescriptor::Str { min_len, max_len } => {
                format!("string of length between {} and {}", min_len, max_len)
            }
            TypeDescriptor::Enum { .. } => "enumerated value".to_string(),
            TypeDescriptor::List { element, .. } => format!("list of {}", element.describe()),
            TypeDescriptor::Nullable { inner } => format!("{} or null", inner.describe()),
            TypeDescriptor::Dict { record } => format!("object '{}'", record.name()),
        }
    }

    /// Checks the descriptor's own parameters.
    ///
    /// Nested records are not re-checked; they were checked when built.
    pub fn check(&self) -> SchemaResult<()> {
        match self {
            TypeDescriptor::BoundedInt { min, max } if min > max => {
                Err(invalid_bounds(min, max))
            }
            TypeDescriptor::BoundedFloat { min, max }
                if !min.is_finite() || !max.is_finite() || min > max =>
            {
                Err(invalid_bounds(min, max))
            }
            TypeDescriptor::Str { min_len, max_len } if min_len > max_len => {
                Err(invalid_bounds(min_len, max_len))
            }
            TypeDescriptor::Enum { items } if items.is_empty() => Err(SchemaError::EmptyEnum),
            TypeDescriptor::List {
                element,
                min_len,
                max_len,
            } => {
                if let (Some(min), Some(max)) = (min_len, max_len) {
                    if min > max {
                        return Err(invalid_bounds(min, max));
                    }
                }
                element.check()
            }
            TypeDescriptor::Nullable { inner } => inner.check(),
            _ => Ok(()),
        }
    }
}

fn invalid_bounds(min: impl ToString, max: impl ToString) -> SchemaError {
    SchemaError::InvalidBounds {
        min: min.to_string(),
        max: max.to_string(),
    }
}

/// How an absent optional field obtains its value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultPolicy {
    /// No default; the field is required
    #[default]
    NoDefault,
    /// Use this value as given
    Literal(Value),
    /// Use the declared type's zero value
    FromType,
}

/// A named slot within a record.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub ty: TypeDescriptor,
    pub required: bool,
    pub default: DefaultPolicy,
}

impl FieldSpec {
    pub fn required(ty: TypeDescriptor) -> Self {
        Self {
            ty,
            required: true,
            default: DefaultPolicy::NoDefault,
        }
    }

    pub fn with_default(ty: TypeDescriptor, value: impl Into<Value>) -> Self {
        Self {
            ty,
            required: false,
            default: DefaultPolicy::Literal(value.into()),
        }
    }

    pub fn from_type(ty: TypeDescriptor) -> Self {
        Self {
            ty,
            required: false,
            default: DefaultPolicy::FromType,
        }
    }
}

/// A named record type: an ordered field schema.
///
/// Build with [`RecordType::builder`]. Fields are kept in declaration order,
/// which is also the order errors are reported in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RecordDeclaration", into = "RecordDeclaration")]
pub struct RecordType {
    name: String,
    fields: Vec<(String, FieldSpec)>,
}

impl RecordType {
    pub fn builder(name: impl Into<String>) -> RecordBuilder {
        RecordBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the fields in declaration order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.fields.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, spec)| spec)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Assembles a record without any declaration checks
    #[cfg(test)]
    pub(crate) fn unchecked(name: &str, fields: Vec<(String, FieldSpec)>) -> Self {
        Self {
            name: name.to_string(),
            fields,
        }
    }
}

/// Builder for [`RecordType`].
///
/// Declaration mistakes are collected and reported by [`RecordBuilder::build`].
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    name: String,
    fields: Vec<(String, FieldSpec)>,
    inherited: HashSet<String>,
    duplicates: Vec<String>,
}

impl RecordBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            inherited: HashSet::new(),
            duplicates: Vec::new(),
        }
    }

    /// Inherits every field of `parent` not already declared here.
    ///
    /// Inherited fields may be redeclared afterwards; the redeclaration
    /// replaces the inherited spec in place.
    pub fn extends(mut self, parent: &RecordType) -> Self {
        for (name, spec) in &parent.fields {
            if self.fields.iter().any(|(n, _)| n == name) {
                continue;
            }
            self.inherited.insert(name.clone());
            self.fields.push((name.clone(), spec.clone()));
        }
        self
    }

    /// Declares a required field
    pub fn field(self, name: impl Into<String>, ty: TypeDescriptor) -> Self {
        self.spec(name, FieldSpec::required(ty))
    }

    /// Declares an optional field with a literal default
    pub fn optional(self, name: impl Into<String>, ty: TypeDescriptor, default: impl Into<Value>) -> Self {
        self.spec(name, FieldSpec::with_default(ty, default))
    }

    /// Declares an optional field defaulting to its type's zero value
    pub fn defaulted(self, name: impl Into<String>, ty: TypeDescriptor) -> Self {
        self.spec(name, FieldSpec::from_type(ty))
    }

    /// Declares a field from an explicit spec
    pub fn spec(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) if self.inherited.remove(&name) => slot.1 = spec,
            Some(_) => self.duplicates.push(name),
            None => self.fields.push((name, spec)),
        }
        self
    }

    pub fn build(self) -> SchemaResult<RecordType> {
        if let Some(field) = self.duplicates.into_iter().next() {
            return Err(SchemaError::DuplicateField {
                record: self.name,
                field,
            });
        }

        for (field, spec) in &self.fields {
            spec.ty.check()?;

            match (spec.required, &spec.default) {
                (true, DefaultPolicy::NoDefault) => {}
                (false, DefaultPolicy::Literal(_) | DefaultPolicy::FromType) => {}
                (true, _) => {
                    return Err(SchemaError::RequiredWithDefault {
                        record: self.name.clone(),
                        field: field.clone(),
                    })
                }
                (false, DefaultPolicy::NoDefault) => {
                    return Err(SchemaError::OptionalWithoutDefault {
                        record: self.name.clone(),
                        field: field.clone(),
                    })
                }
            }

            if let Err(missing) = resolve_default(spec) {
                let missing: Vec<String> = missing.iter().map(ToString::to_string).collect();
                return Err(SchemaError::UnsatisfiableDefault {
                    record: self.name.clone(),
                    field: field.clone(),
                    missing: missing.join(", "),
                });
            }
        }

        Ok(RecordType {
            name: self.name,
            fields: self.fields,
        })
    }
}

/// Serialized form of a record declaration.
///
/// `required` and `default` are both taken as written and checked by the
/// builder like any other declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RecordDeclaration {
    name: String,
    #[serde(default)]
    fields: Vec<FieldDeclaration>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldDeclaration {
    name: String,
    #[serde(rename = "type")]
    ty: TypeDescriptor,
    required: bool,
    #[serde(default, skip_serializing_if = "is_no_default")]
    default: DefaultPolicy,
}

fn is_no_default(policy: &DefaultPolicy) -> bool {
    *policy == DefaultPolicy::NoDefault
}

impl TryFrom<RecordDeclaration> for RecordType {
    type Error = SchemaError;

    fn try_from(decl: RecordDeclaration) -> SchemaResult<Self> {
        decl.fields
            .into_iter()
            .fold(RecordType::builder(decl.name), |builder, field| {
                builder.spec(
                    field.name,
                    FieldSpec {
                        ty: field.ty,
                        required: field.required,
                        default: field.default,
                    },
                )
            })
            .build()
    }
}

impl From<RecordType> for RecordDeclaration {
    fn from(record: RecordType) -> Self {
        RecordDeclaration {
            name: record.name,
            fields: record
                .fields
                .into_iter()
                .map(|(name, spec)| FieldDeclaration {
                    name,
                    ty: spec.ty,
                    required: spec.required,
                    default: spec.default,
                })
                .collect(),
        }
    }
}
