//! Format checkers for the `format` keyword.
//!
//! A [`FormatRegistry`] maps a format name to the types it may be declared
//! on and a predicate over the document value. Names missing from the
//! registry resolve to an advisory format that accepts every value.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike};
use fancy_regex::Regex;
use fluent_uri::UriRef;
use serde_json::Value;

use crate::types::SimpleType;

const STRING_ONLY: &[SimpleType] = &[SimpleType::String];
const NUMERIC: &[SimpleType] = &[SimpleType::Number, SimpleType::Integer];

/// How a single format is checked.
#[derive(Debug, Clone, Copy)]
pub struct FormatChecker {
    /// Schema types this format may be declared on.
    pub compatible_types: &'static [SimpleType],
    /// Returns false when the value violates the format.
    pub check: fn(&Value) -> bool,
}

impl FormatChecker {
    pub fn is_compatible(&self, ty: SimpleType) -> bool {
        self.compatible_types.contains(&ty)
    }
}

/// A format name resolved against a registry.
///
/// `checker` is `None` for names the registry does not know.
#[derive(Debug, Clone)]
pub struct Format {
    name: String,
    checker: Option<FormatChecker>,
}

impl Format {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unknown formats are compatible with every type.
    pub fn is_compatible(&self, ty: SimpleType) -> bool {
        self.checker.map_or(true, |c| c.is_compatible(ty))
    }

    pub fn is_known(&self) -> bool {
        self.checker.is_some()
    }

    pub fn check(&self, value: &Value) -> bool {
        self.checker.map_or(true, |c| (c.check)(value))
    }
}

/// Registry from format name to checker.
#[derive(Debug, Clone)]
pub struct FormatRegistry {
    checkers: HashMap<String, FormatChecker>,
}

impl FormatRegistry {
    /// A registry with no formats; every name is advisory.
    pub fn empty() -> Self {
        Self {
            checkers: HashMap::new(),
        }
    }

    /// Add or replace a format.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        compatible_types: &'static [SimpleType],
        check: fn(&Value) -> bool,
    ) -> &mut Self {
        self.checkers.insert(
            name.into(),
            FormatChecker {
                compatible_types,
                check,
            },
        );
        self
    }

    pub fn get(&self, name: &str) -> Option<&FormatChecker> {
        self.checkers.get(name)
    }

    pub fn resolve(&self, name: &str) -> Format {
        Format {
            name: name.to_string(),
            checker: self.get(name).copied(),
        }
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register("date-time", STRING_ONLY, |v| on_str(v, is_date_time))
            .register("date", STRING_ONLY, |v| on_str(v, is_date))
            .register("time", STRING_ONLY, |v| on_str(v, is_time))
            .register("regex", STRING_ONLY, |v| on_str(v, is_regex))
            .register("uri", STRING_ONLY, |v| on_str(v, is_uri))
            .register("utc-millisec", NUMERIC, |_| true);
        registry
    }
}

fn on_str(value: &Value, check: fn(&str) -> bool) -> bool {
    value.as_str().map_or(true, check)
}

/// RFC 3339 date-time, e.g. `2011-05-10T11:11:17Z`.
pub fn is_date_time(s: &str) -> bool {
    DateTime::parse_from_rfc3339(s).is_ok()
}

/// `YYYY-MM-DD` with exactly four, two and two digits.
pub fn is_date(s: &str) -> bool {
    has_shape(s, "dddd-dd-dd") && NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

/// `HH:MM:SS` with nothing after the seconds. A leap second (`:60`) is out
/// of range.
pub fn is_time(s: &str) -> bool {
    has_shape(s, "dd:dd:dd")
        && NaiveTime::parse_from_str(s, "%H:%M:%S")
            .is_ok_and(|time| time.nanosecond() < 1_000_000_000)
}

pub fn is_regex(s: &str) -> bool {
    Regex::new(s).is_ok()
}

/// An RFC 3986 URI reference: an absolute URI or a relative reference.
pub fn is_uri(s: &str) -> bool {
    UriRef::parse(s).is_ok()
}

/// `d` in the template matches an ASCII digit, anything else matches itself.
fn has_shape(s: &str, template: &str) -> bool {
    s.len() == template.len()
        && s.bytes().zip(template.bytes()).all(|(c, t)| match t {
            b'd' => c.is_ascii_digit(),
            _ => c == t,
        })
}
