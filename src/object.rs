//! Container schema for JSON objects.

use fancy_regex::Regex;
use serde_json::Value;

use crate::error::{single_error, ErrorMessage};
use crate::schema::JsonSchema;

/// What to do with a property that is neither declared nor matched by a
/// pattern.
#[derive(Debug, Clone, Default)]
pub enum AdditionalProperties {
    #[default]
    Allow,
    Deny,
    Schema(Box<JsonSchema>),
}

/// Validates an object's required keys and each of its entries.
#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    properties: Vec<(String, JsonSchema)>,
    required: Vec<String>,
    pattern_properties: Vec<(Regex, JsonSchema)>,
    additional_properties: AdditionalProperties,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn property(&self, name: &str) -> Option<&JsonSchema> {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, schema)| schema)
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &JsonSchema)> {
        self.properties.iter().map(|(n, s)| (n.as_str(), s))
    }

    pub fn required(&self) -> &[String] {
        &self.required
    }

    pub fn additional_properties(&self) -> &AdditionalProperties {
        &self.additional_properties
    }

    /// Declare a property, replacing an earlier declaration of the same name
    /// in place.
    pub fn set_property(&mut self, name: impl Into<String>, schema: impl Into<JsonSchema>) {
        let name = name.into();
        let schema = schema.into();
        match self.properties.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = schema,
            None => self.properties.push((name, schema)),
        }
    }

    /// Mark a property as required. Duplicates are ignored.
    pub fn add_required(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.required.contains(&name) {
            self.required.push(name);
        }
    }

    pub fn set_required<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required.clear();
        for name in names {
            self.add_required(name);
        }
    }

    pub fn add_pattern_property(&mut self, pattern: Regex, schema: impl Into<JsonSchema>) {
        self.pattern_properties.push((pattern, schema.into()));
    }

    pub fn set_additional_properties(&mut self, policy: AdditionalProperties) {
        self.additional_properties = policy;
    }

    /// Missing required properties come first, in declared order; then each
    /// document entry in document order.
    pub fn validate(&self, document: &Value) -> Vec<ErrorMessage> {
        let Some(entries) = document.as_object() else {
            return single_error("Invalid type: must be an object");
        };

        let mut results: Vec<ErrorMessage> = self
            .required
            .iter()
            .filter(|name| !entries.contains_key(name.as_str()))
            .map(|name| {
                ErrorMessage::new(
                    format!(".{name}"),
                    format!("Missing required property: {name}"),
                )
            })
            .collect();

        for (name, value) in entries {
            let segment = format!(".{name}");
            let mut nest = |errors: Vec<ErrorMessage>| {
                results.extend(
                    errors
                        .into_iter()
                        .map(|error| ErrorMessage::nested(&segment, error)),
                );
            };

            if let Some(schema) = self.property(name) {
                nest(schema.validate(value));
                continue;
            }

            let mut matched = false;
            for (pattern, schema) in &self.pattern_properties {
                if matches!(pattern.is_match(name), Ok(true)) {
                    matched = true;
                    nest(schema.validate(value));
                }
            }
            if matched {
                continue;
            }

            match &self.additional_properties {
                AdditionalProperties::Allow => {}
                AdditionalProperties::Deny => {
                    nest(single_error(format!("Unexpected property: {name}")))
                }
                AdditionalProperties::Schema(schema) => nest(schema.validate(value)),
            }
        }
        results
    }
}
