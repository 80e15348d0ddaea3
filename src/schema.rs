//! The compiled schema tree.

use serde_json::Value;

use crate::array::ArraySchema;
use crate::error::ErrorMessage;
use crate::object::ObjectSchema;
use crate::simple::SimpleTypeSchema;

/// A node in a compiled schema tree.
///
/// The set of node kinds is closed; validation dispatches with an exhaustive
/// match. Once built, a tree is immutable and `validate` can be called from
/// any number of threads.
#[derive(Debug, Clone)]
pub enum JsonSchema {
    Simple(SimpleTypeSchema),
    Array(ArraySchema),
    Object(ObjectSchema),
}

impl JsonSchema {
    /// A schema that accepts every document.
    pub fn any() -> Self {
        JsonSchema::Simple(SimpleTypeSchema::any())
    }

    /// Validate `document`, returning every violation.
    ///
    /// An empty list means the document conforms. Errors are ordered
    /// depth-first, left to right through the document.
    pub fn validate(&self, document: &Value) -> Vec<ErrorMessage> {
        match self {
            JsonSchema::Simple(schema) => schema.validate(document),
            JsonSchema::Array(schema) => schema.validate(document),
            JsonSchema::Object(schema) => schema.validate(document),
        }
    }

    pub fn is_valid(&self, document: &Value) -> bool {
        self.validate(document).is_empty()
    }
}

impl Default for JsonSchema {
    fn default() -> Self {
        Self::any()
    }
}

impl From<SimpleTypeSchema> for JsonSchema {
    fn from(schema: SimpleTypeSchema) -> Self {
        JsonSchema::Simple(schema)
    }
}

impl From<ArraySchema> for JsonSchema {
    fn from(schema: ArraySchema) -> Self {
        JsonSchema::Array(schema)
    }
}

impl From<ObjectSchema> for JsonSchema {
    fn from(schema: ObjectSchema) -> Self {
        JsonSchema::Object(schema)
    }
}
