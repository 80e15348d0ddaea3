//! JSON document validation that reports every violation.
//!
//! A schema is a tree of [`JsonSchema`] nodes: leaf [`SimpleTypeSchema`]s and
//! the [`ArraySchema`]/[`ObjectSchema`] containers. Validation walks the
//! schema and the document together and returns all violations, each with a
//! location built from `[index]` and `.name` segments.
//!
//! # Example
//!
//! ```
//! use jsoncheck::{ArraySchema, SimpleType, SimpleTypeSchema};
//! use serde_json::json;
//!
//! let mut day = SimpleTypeSchema::new(SimpleType::String);
//! day.set_format("date").unwrap();
//!
//! let mut days = ArraySchema::new();
//! days.set_items(day);
//! days.set_max_items(7);
//!
//! let errors = days.validate(&json!(["2011-05-10", 5, "2011-05-44"]));
//! assert_eq!(errors.len(), 2);
//! assert_eq!(errors[0].location, "[1]");
//! assert_eq!(errors[0].message, "Invalid type: must be a string");
//! assert_eq!(errors[1].location, "[2]");
//! ```
//!
//! # Assembly rules
//!
//! The leaf mutators reject constraints that make no sense for the declared
//! type, whichever order they are applied in:
//!
//! | Constraint | Allowed types |
//! |------------|---------------|
//! | `pattern`, `minLength`, `maxLength` | string |
//! | `minimum`, `maximum`, `exclusiveMinimum`, `exclusiveMaximum` | number, integer |
//! | `format` `date-time`, `date`, `time`, `regex`, `uri` | string |
//! | `format` `utc-millisec` | number, integer |
//! | `enum` | any type except null and any; members must match it |
//!
//! Schema documents can be compiled with [`SchemaCompiler`].

mod array;
mod compiler;
mod error;
mod format;
mod loader;
mod object;
mod schema;
mod simple;
mod types;
mod validator;

pub use array::ArraySchema;
pub use compiler::{compile_schema, SchemaCompiler};
pub use error::{ConfigError, ErrorMessage, LoadError, ValidateError};
pub use format::{Format, FormatChecker, FormatRegistry};
pub use loader::{load_json, load_json_str, navigate_fragment};
pub use object::{AdditionalProperties, ObjectSchema};
pub use schema::JsonSchema;
pub use simple::SimpleTypeSchema;
pub use types::SimpleType;
pub use validator::{validate, validate_against_schema};
