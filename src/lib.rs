//! valid - declarative validation of untrusted value trees
//!
//! Callers declare the expected shape of their input as records of typed
//! fields, then validate raw `serde_json::Value` trees against it. A
//! successful run returns a new tree holding exactly the declared fields,
//! with defaults filled in. A failed run returns every problem found.
//!
//! ```ignore
//! use serde_json::json;
//! use valid::{validate, RecordType, TypeDescriptor};
//!
//! let job = RecordType::builder("Job")
//!     .field("jobid", TypeDescriptor::int())
//!     .defaulted("nodeblock", TypeDescriptor::bool())
//!     .field("languages", TypeDescriptor::list(TypeDescriptor::str(4)))
//!     .build()?;
//!
//! match validate(&job, &json!({ "languages": ["toolong5"] })) {
//!     Ok(value) => println!("{}", value),
//!     Err(e) => eprintln!("{}", e.format()),
//! }
//! ```

pub mod config;
pub mod observability;
pub mod schema;

pub use config::ValidationConfig;
pub use schema::{
    validate, validate_type, DefaultPolicy, ErrorKind, FieldError, FieldPath, FieldSpec,
    PathSegment, RecordBuilder, RecordType, SchemaError, SchemaResult, TypeDescriptor,
    ValidationError, Validator,
};
