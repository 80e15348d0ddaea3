//! Primitive type model shared by the leaf schema and the compiler.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The primitive kinds a leaf schema can be declared with.
///
/// `Any` is the default and is also what an unset `items` schema uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimpleType {
    Null,
    Boolean,
    String,
    Number,
    Integer,
    #[default]
    Any,
}

impl SimpleType {
    /// Every variant, in declaration order.
    pub const ALL: [SimpleType; 6] = [
        SimpleType::Null,
        SimpleType::Boolean,
        SimpleType::String,
        SimpleType::Number,
        SimpleType::Integer,
        SimpleType::Any,
    ];

    /// Returns true when a document value of this kind satisfies the type.
    ///
    /// `Number` accepts integral and decimal values, `Integer` only integral
    /// ones (`42.0` parsed from JSON text is decimal). `Any` accepts arrays and
    /// objects too.
    pub fn is_acceptable_type(&self, value: &Value) -> bool {
        match self {
            SimpleType::Any => true,
            SimpleType::Null => value.is_null(),
            SimpleType::Boolean => value.is_boolean(),
            SimpleType::String => value.is_string(),
            SimpleType::Number => value.is_number(),
            SimpleType::Integer => value.is_i64() || value.is_u64(),
        }
    }

    /// Lowercase canonical name, used verbatim in mismatch messages.
    pub fn description(&self) -> &'static str {
        match self {
            SimpleType::Null => "null",
            SimpleType::Boolean => "boolean",
            SimpleType::String => "string",
            SimpleType::Number => "number",
            SimpleType::Integer => "integer",
            SimpleType::Any => "any",
        }
    }

    /// Parse a `type` keyword value.
    ///
    /// Returns `None` for unknown names and for the container kinds, which
    /// the compiler handles separately.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "null" => Some(SimpleType::Null),
            "boolean" => Some(SimpleType::Boolean),
            "string" => Some(SimpleType::String),
            "number" => Some(SimpleType::Number),
            "integer" => Some(SimpleType::Integer),
            "any" => Some(SimpleType::Any),
            _ => None,
        }
    }

    /// True for `Number` and `Integer`.
    pub fn is_numeric(&self) -> bool {
        matches!(self, SimpleType::Number | SimpleType::Integer)
    }
}

impl fmt::Display for SimpleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn samples() -> Vec<Value> {
        vec![
            json!(null),
            json!(true),
            json!("blah"),
            json!(42),
            json!(i64::MAX),
            json!(4.2),
            json!([]),
            json!({}),
        ]
    }

    fn accepted(ty: SimpleType) -> Vec<Value> {
        samples()
            .into_iter()
            .filter(|v| ty.is_acceptable_type(v))
            .collect()
    }

    #[test]
    fn string_accepts_only_strings() {
        assert_eq!(accepted(SimpleType::String), vec![json!("blah")]);
    }

    #[test]
    fn number_accepts_integral_and_decimal() {
        assert_eq!(
            accepted(SimpleType::Number),
            vec![json!(42), json!(i64::MAX), json!(4.2)]
        );
    }

    #[test]
    fn integer_accepts_only_integral() {
        assert_eq!(accepted(SimpleType::Integer), vec![json!(42), json!(i64::MAX)]);
        assert!(SimpleType::Integer.is_acceptable_type(&json!(u64::MAX)));
        assert!(!SimpleType::Integer.is_acceptable_type(&json!(42.0)));
    }

    #[test]
    fn boolean_and_null_accept_own_kind() {
        assert_eq!(accepted(SimpleType::Boolean), vec![json!(true)]);
        assert_eq!(accepted(SimpleType::Null), vec![json!(null)]);
    }

    #[test]
    fn any_accepts_everything() {
        assert_eq!(accepted(SimpleType::Any).len(), samples().len());
    }

    #[test]
    fn description_is_lowercase_name() {
        assert_eq!(SimpleType::String.description(), "string");
        assert_eq!(SimpleType::Null.description(), "null");
        assert_eq!(SimpleType::Integer.to_string(), "integer");
    }

    #[test]
    fn parse_round_trips_descriptions() {
        for ty in SimpleType::ALL {
            assert_eq!(SimpleType::parse(ty.description()), Some(ty));
        }
        assert_eq!(SimpleType::parse("array"), None);
        assert_eq!(SimpleType::parse("String"), None);
    }

    #[test]
    fn default_is_any() {
        assert_eq!(SimpleType::default(), SimpleType::Any);
    }
}
