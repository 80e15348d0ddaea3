//! Error types for schema assembly, schema loading and document validation.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::types::SimpleType;

/// Invariant violations raised by the schema mutators.
///
/// These are schema-authoring bugs: the mutator refuses the change and the
/// schema keeps its previous, valid configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("pattern requires type string, schema type is {actual}")]
    PatternRequiresString { actual: SimpleType },

    #[error("format \"{format}\" is not compatible with type {actual}")]
    IncompatibleFormat { format: String, actual: SimpleType },

    #[error("{keyword} requires type string, schema type is {actual}")]
    LengthRequiresString {
        keyword: &'static str,
        actual: SimpleType,
    },

    #[error("{keyword} requires type number or integer, schema type is {actual}")]
    BoundRequiresNumeric {
        keyword: &'static str,
        actual: SimpleType,
    },

    #[error("enumeration is not allowed for type {actual}")]
    EnumerationNotAllowed { actual: SimpleType },

    #[error("enumeration value {value} is not of type {expected}")]
    EnumerationTypeMismatch { value: String, expected: SimpleType },

    #[error("enumeration must contain at least one value")]
    EmptyEnumeration,
}

/// Errors while loading or compiling a schema document.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    // Schema errors (exit code 2)
    #[error("invalid schema at {path}: {message}")]
    InvalidSchema { path: String, message: String },

    #[error("invalid schema at {path}: {source}")]
    Config {
        path: String,
        #[source]
        source: ConfigError,
    },

    #[error("cannot resolve $ref \"{reference}\" at {path}")]
    UnresolvedRef { path: String, reference: String },

    #[error("circular reference detected: {reference}")]
    CircularReference { reference: String },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            _ => 2,
        }
    }
}

/// Errors from the top-level validation entry points.
#[derive(Debug, Error)]
pub enum ValidateError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("validation failed with {} error(s)", errors.len())]
    Invalid { errors: Vec<ErrorMessage> },
}

impl ValidateError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ValidateError::Load(e) => e.exit_code(),
            ValidateError::Invalid { .. } => 1,
        }
    }
}

/// A single document violation.
///
/// `location` is `""` at the root and otherwise a chain of `[index]` and
/// `.name` segments from the root to the failing node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorMessage {
    pub location: String,
    pub message: String,
}

impl ErrorMessage {
    pub fn new(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            message: message.into(),
        }
    }

    /// An error reported by the node being validated.
    pub fn root(message: impl Into<String>) -> Self {
        Self::new("", message)
    }

    /// Re-home a child's error under `segment`.
    ///
    /// The segment is prepended verbatim; object segments carry their own
    /// leading `.`. The message is never altered.
    pub fn nested(segment: &str, child: ErrorMessage) -> Self {
        let mut location = String::with_capacity(segment.len() + child.location.len());
        location.push_str(segment);
        location.push_str(&child.location);
        Self {
            location,
            message: child.message,
        }
    }
}

/// A result list holding exactly one root error.
pub(crate) fn single_error(message: impl Into<String>) -> Vec<ErrorMessage> {
    vec![ErrorMessage::root(message)]
}

impl fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.location.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.location, self.message)
        }
    }
}
