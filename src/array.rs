//! Container schema for JSON arrays.

use serde_json::Value;

use crate::error::{single_error, ErrorMessage};
use crate::schema::JsonSchema;

/// Validates an array and every one of its elements.
///
/// `min_items`/`max_items` of `0` mean "no bound".
#[derive(Debug, Clone, Default)]
pub struct ArraySchema {
    items: Box<JsonSchema>,
    min_items: usize,
    max_items: usize,
}

impl ArraySchema {
    /// An array schema whose items accept any value.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &JsonSchema {
        &self.items
    }

    pub fn min_items(&self) -> usize {
        self.min_items
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    pub fn set_items(&mut self, items: impl Into<JsonSchema>) {
        self.items = Box::new(items.into());
    }

    pub fn set_min_items(&mut self, min_items: usize) {
        self.min_items = min_items;
    }

    pub fn set_max_items(&mut self, max_items: usize) {
        self.max_items = max_items;
    }

    /// A size violation is reported on its own; otherwise every element is
    /// validated and its errors are re-homed under `[index]`.
    pub fn validate(&self, document: &Value) -> Vec<ErrorMessage> {
        let Some(elements) = document.as_array() else {
            return single_error("Invalid type: must be an array");
        };

        let size = elements.len();
        if self.max_items != 0 && size > self.max_items {
            return single_error(format!(
                "Current array size of {size} is greater than allowed maximum array size of {}",
                self.max_items
            ));
        }
        if self.min_items != 0 && size < self.min_items {
            return single_error(format!(
                "Current array size of {size} is less than allowed minimum array size of {}",
                self.min_items
            ));
        }

        let mut results = Vec::new();
        for (index, element) in elements.iter().enumerate() {
            let segment = format!("[{index}]");
            results.extend(
                self.items
                    .validate(element)
                    .into_iter()
                    .map(|error| ErrorMessage::nested(&segment, error)),
            );
        }
        results
    }
}
