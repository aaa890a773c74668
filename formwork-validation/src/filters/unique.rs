// Uniqueness across repeat rows

use super::Filter;
use crate::value::{as_text, is_absent};
use crate::{MessageTemplate, Severity};
use serde_json::Value;
use std::collections::HashSet;

/// Fails when a non-empty value occurs more than once in the field.
#[derive(Debug, Clone)]
pub struct Unique {
    message: MessageTemplate,
    severity: Severity,
}

message_builders!(Unique);

impl Unique {
    pub fn new() -> Self {
        Self {
            message: MessageTemplate::new("%s must not contain duplicate values"),
            severity: Severity::Error,
        }
    }
}

impl Default for Unique {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for Unique {
    fn name(&self) -> &str {
        "unique"
    }

    fn applies_to_field(&self) -> bool {
        true
    }

    fn check(&self, value: &Value, _index: Option<usize>) -> bool {
        let values: Vec<&Value> = match value {
            Value::Array(items) => items.iter().collect(),
            Value::Object(map) => map.values().collect(),
            _ => return true,
        };

        let mut seen = HashSet::new();
        for value in values.into_iter().filter(|value| !is_absent(value)) {
            let key = as_text(value)
                .map(|text| text.into_owned())
                .unwrap_or_else(|| value.to_string());
            if !seen.insert(key) {
                return false;
            }
        }
        true
    }

    fn message(&self) -> &MessageTemplate {
        &self.message
    }

    fn severity(&self) -> Severity {
        self.severity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_duplicates() {
        let unique = Unique::new();
        assert!(!unique.check(&json!({"0": "x", "1": "x"}), None));
        assert!(unique.check(&json!({"0": "x", "1": "y"}), None));
        assert!(!unique.check(&json!(["1", 1]), None));
    }

    #[test]
    fn test_empty_values_ignored() {
        let unique = Unique::new();
        assert!(unique.check(&json!(["", "", null]), None));
    }

    #[test]
    fn test_scalar_passes() {
        assert!(Unique::new().check(&json!("x"), None));
    }
}
