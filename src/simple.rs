//! Leaf schema for primitive values.

use std::cmp::Ordering;

use fancy_regex::Regex;
use serde_json::{Number, Value};

use crate::error::{single_error, ConfigError, ErrorMessage};
use crate::format::{Format, FormatRegistry};
use crate::types::SimpleType;

/// Validates one primitive value. Never recurses.
///
/// Every mutator checks the cross-field rules before changing anything, so a
/// rejected call leaves the schema exactly as it was.
#[derive(Debug, Clone, Default)]
pub struct SimpleTypeSchema {
    ty: SimpleType,
    pattern: Option<Regex>,
    format: Option<Format>,
    max_length: Option<usize>,
    min_length: Option<usize>,
    minimum: Option<Number>,
    maximum: Option<Number>,
    exclusive_minimum: bool,
    exclusive_maximum: bool,
    enumeration: Option<Vec<Value>>,
}

impl SimpleTypeSchema {
    pub fn new(ty: SimpleType) -> Self {
        Self {
            ty,
            ..Self::default()
        }
    }

    /// A schema that accepts every value.
    pub fn any() -> Self {
        Self::new(SimpleType::Any)
    }

    pub fn simple_type(&self) -> SimpleType {
        self.ty
    }

    pub fn pattern(&self) -> Option<&Regex> {
        self.pattern.as_ref()
    }

    pub fn format(&self) -> Option<&Format> {
        self.format.as_ref()
    }

    pub fn max_length(&self) -> Option<usize> {
        self.max_length
    }

    pub fn min_length(&self) -> Option<usize> {
        self.min_length
    }

    pub fn minimum(&self) -> Option<&Number> {
        self.minimum.as_ref()
    }

    pub fn maximum(&self) -> Option<&Number> {
        self.maximum.as_ref()
    }

    pub fn exclusive_minimum(&self) -> bool {
        self.exclusive_minimum
    }

    pub fn exclusive_maximum(&self) -> bool {
        self.exclusive_maximum
    }

    pub fn enumeration(&self) -> Option<&[Value]> {
        self.enumeration.as_deref()
    }

    /// Returns the lowercase name of the declared type.
    pub fn description(&self) -> &'static str {
        self.ty.description()
    }

    pub fn is_acceptable_type(&self, value: &Value) -> bool {
        self.ty.is_acceptable_type(value)
    }

    /// Change the declared type.
    ///
    /// Fails when a constraint that is already set would be illegal for the
    /// new type.
    pub fn set_type(&mut self, ty: SimpleType) -> Result<(), ConfigError> {
        if self.pattern.is_some() {
            require_string_pattern(ty)?;
        }
        if let Some(format) = &self.format {
            require_format(format, ty)?;
        }
        if self.max_length.is_some() {
            require_string("maxLength", ty)?;
        }
        if self.min_length.is_some() {
            require_string("minLength", ty)?;
        }
        if self.minimum.is_some() {
            require_numeric("minimum", ty)?;
        }
        if self.maximum.is_some() {
            require_numeric("maximum", ty)?;
        }
        if self.exclusive_minimum {
            require_numeric("exclusiveMinimum", ty)?;
        }
        if self.exclusive_maximum {
            require_numeric("exclusiveMaximum", ty)?;
        }
        if let Some(values) = &self.enumeration {
            check_enumeration(values, ty)?;
        }
        self.ty = ty;
        Ok(())
    }

    pub fn set_pattern(&mut self, pattern: Regex) -> Result<(), ConfigError> {
        require_string_pattern(self.ty)?;
        self.pattern = Some(pattern);
        Ok(())
    }

    /// Set the format, resolving the name against the built-in registry.
    pub fn set_format(&mut self, name: &str) -> Result<(), ConfigError> {
        self.set_format_with(name, &FormatRegistry::default())
    }

    /// Set the format, resolving the name against `registry`.
    pub fn set_format_with(
        &mut self,
        name: &str,
        registry: &FormatRegistry,
    ) -> Result<(), ConfigError> {
        let format = registry.resolve(name);
        require_format(&format, self.ty)?;
        self.format = Some(format);
        Ok(())
    }

    pub fn set_max_length(&mut self, max_length: usize) -> Result<(), ConfigError> {
        require_string("maxLength", self.ty)?;
        self.max_length = Some(max_length);
        Ok(())
    }

    pub fn set_min_length(&mut self, min_length: usize) -> Result<(), ConfigError> {
        require_string("minLength", self.ty)?;
        self.min_length = Some(min_length);
        Ok(())
    }

    pub fn set_minimum(&mut self, minimum: impl Into<Number>) -> Result<(), ConfigError> {
        require_numeric("minimum", self.ty)?;
        self.minimum = Some(minimum.into());
        Ok(())
    }

    pub fn set_maximum(&mut self, maximum: impl Into<Number>) -> Result<(), ConfigError> {
        require_numeric("maximum", self.ty)?;
        self.maximum = Some(maximum.into());
        Ok(())
    }

    pub fn set_exclusive_minimum(&mut self, exclusive: bool) -> Result<(), ConfigError> {
        require_numeric("exclusiveMinimum", self.ty)?;
        self.exclusive_minimum = exclusive;
        Ok(())
    }

    pub fn set_exclusive_maximum(&mut self, exclusive: bool) -> Result<(), ConfigError> {
        require_numeric("exclusiveMaximum", self.ty)?;
        self.exclusive_maximum = exclusive;
        Ok(())
    }

    /// Restrict the value to one of `values`, compared by value.
    pub fn set_enumeration(&mut self, values: Vec<Value>) -> Result<(), ConfigError> {
        check_enumeration(&values, self.ty)?;
        self.enumeration = Some(values);
        Ok(())
    }

    /// Checks run in a fixed order and the first failure is the only error.
    pub fn validate(&self, document: &Value) -> Vec<ErrorMessage> {
        if !self.is_acceptable_type(document) {
            return single_error(format!("Invalid type: must be a {}", self.description()));
        }

        if let Some(values) = &self.enumeration {
            if !values.iter().any(|v| value_equal(v, document)) {
                let allowed = values
                    .iter()
                    .map(Value::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                return single_error(format!(
                    "Value {document} must be one of [{allowed}]"
                ));
            }
        }

        let failure = match document {
            Value::String(s) => self.check_string(s),
            Value::Number(n) => self.check_number(n),
            _ => None,
        };
        if let Some(message) = failure {
            return single_error(message);
        }

        if let Some(format) = &self.format {
            if !format.check(document) {
                return single_error(format!(
                    "Value {document} is not a valid \"{}\"",
                    format.name()
                ));
            }
        }

        Vec::new()
    }

    fn check_string(&self, s: &str) -> Option<String> {
        if let Some(pattern) = &self.pattern {
            // a match that exceeds the backtracking limit counts as a mismatch
            if !matches!(pattern.is_match(s), Ok(true)) {
                return Some(format!(
                    "String \"{s}\" does not match regex pattern /{}/",
                    pattern.as_str()
                ));
            }
        }

        let length = s.chars().count();
        if let Some(max) = self.max_length {
            if length > max {
                return Some(format!(
                    "String \"{s}\" has length {length}, longer than maxLength {max}"
                ));
            }
        }
        if let Some(min) = self.min_length {
            if length < min {
                return Some(format!(
                    "String \"{s}\" has length {length}, shorter than minLength {min}"
                ));
            }
        }
        None
    }

    fn check_number(&self, n: &Number) -> Option<String> {
        if let Some(min) = &self.minimum {
            let ord = compare_numbers(n, min);
            if self.exclusive_minimum && ord != Some(Ordering::Greater) {
                return Some(format!(
                    "Number {n} must be greater than {min} (exclusiveMinimum)"
                ));
            }
            if ord == Some(Ordering::Less) {
                return Some(format!(
                    "Number {n} is less than the required minimum value of {min}"
                ));
            }
        }
        if let Some(max) = &self.maximum {
            let ord = compare_numbers(n, max);
            if self.exclusive_maximum && ord != Some(Ordering::Less) {
                return Some(format!(
                    "Number {n} must be less than {max} (exclusiveMaximum)"
                ));
            }
            if ord == Some(Ordering::Greater) {
                return Some(format!(
                    "Number {n} is greater than the required maximum value of {max}"
                ));
            }
        }
        None
    }
}

fn require_string_pattern(ty: SimpleType) -> Result<(), ConfigError> {
    if ty == SimpleType::String {
        Ok(())
    } else {
        Err(ConfigError::PatternRequiresString { actual: ty })
    }
}

fn require_format(format: &Format, ty: SimpleType) -> Result<(), ConfigError> {
    if format.is_compatible(ty) {
        Ok(())
    } else {
        Err(ConfigError::IncompatibleFormat {
            format: format.name().to_string(),
            actual: ty,
        })
    }
}

fn require_string(keyword: &'static str, ty: SimpleType) -> Result<(), ConfigError> {
    if ty == SimpleType::String {
        Ok(())
    } else {
        Err(ConfigError::LengthRequiresString {
            keyword,
            actual: ty,
        })
    }
}

fn require_numeric(keyword: &'static str, ty: SimpleType) -> Result<(), ConfigError> {
    if ty.is_numeric() {
        Ok(())
    } else {
        Err(ConfigError::BoundRequiresNumeric {
            keyword,
            actual: ty,
        })
    }
}

fn check_enumeration(values: &[Value], ty: SimpleType) -> Result<(), ConfigError> {
    if matches!(ty, SimpleType::Null | SimpleType::Any) {
        return Err(ConfigError::EnumerationNotAllowed { actual: ty });
    }
    if values.is_empty() {
        return Err(ConfigError::EmptyEnumeration);
    }
    if let Some(bad) = values.iter().find(|v| !ty.is_acceptable_type(v)) {
        return Err(ConfigError::EnumerationTypeMismatch {
            value: bad.to_string(),
            expected: ty,
        });
    }
    Ok(())
}

/// Integer pairs compare exactly; anything involving a decimal goes through f64.
fn compare_numbers(a: &Number, b: &Number) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return Some(x.cmp(&y));
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return Some(x.cmp(&y));
    }
    a.as_f64()?.partial_cmp(&b.as_f64()?)
}

/// JSON equality, except that numbers compare by numeric value.
fn value_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => compare_numbers(x, y) == Some(Ordering::Equal),
        _ => a == b,
    }
}
