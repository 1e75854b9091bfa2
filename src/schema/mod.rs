//! Schema declaration and validation
//!
//! Schemas are declared once and then used as a constant program against
//! which any number of independent validation runs execute.
//!
//! # Design Principles
//!
//! - Explicit default policy per field (no default, literal, from type)
//! - Misuse fails at declaration time, never at validation time
//! - Exhaustive error collection, all-or-nothing result
//! - Undeclared input fields are dropped
//! - No coercion beyond what each primitive type defines
//! - Deterministic validation

mod defaults;
mod errors;
mod types;
mod validator;

pub use defaults::resolve_default;
pub use errors::{
    ErrorKind, FieldError, FieldPath, PathSegment, SchemaError, SchemaResult, ValidationError,
};
pub use types::{DefaultPolicy, FieldSpec, RecordBuilder, RecordType, TypeDescriptor};
pub use validator::{validate, validate_type, Validator};
