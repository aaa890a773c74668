// Runtime kind filter

use super::Filter;
use crate::value::PrimitiveKind;
use crate::{FormError, MessageTemplate, Result, Severity};
use serde_json::Value;

/// The value must be of one primitive kind.
#[derive(Debug, Clone)]
pub struct IsOfType {
    kind: PrimitiveKind,
    message: MessageTemplate,
    severity: Severity,
}

message_builders!(IsOfType);

impl IsOfType {
    /// Accepts `boolean`, `integer`, `float`, `string`, `array`,
    /// `object`, `resource` and `null`.
    pub fn new(kind: &str) -> Result<Self> {
        PrimitiveKind::parse(kind)
            .map(Self::of_kind)
            .ok_or_else(|| FormError::InvalidFilterArgument(format!("unknown primitive kind: {kind}")))
    }

    pub fn of_kind(kind: PrimitiveKind) -> Self {
        Self {
            kind,
            message: MessageTemplate::new("%s must be of type %s").bind(kind),
            severity: Severity::Error,
        }
    }

    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }
}

impl Filter for IsOfType {
    fn name(&self) -> &str {
        "type"
    }

    fn check(&self, value: &Value, _index: Option<usize>) -> bool {
        PrimitiveKind::of(value) == self.kind
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
    fn test_unknown_kind_rejected() {
        assert!(matches!(
            IsOfType::new("decimal"),
            Err(FormError::InvalidFilterArgument(_))
        ));
    }

    #[test]
    fn test_kinds() {
        assert!(IsOfType::new("integer").unwrap().check(&json!(3), None));
        assert!(!IsOfType::new("integer").unwrap().check(&json!(3.5), None));
        assert!(IsOfType::new("float").unwrap().check(&json!(3.5), None));
        assert!(IsOfType::new("string").unwrap().check(&json!("3"), None));
        assert!(IsOfType::new("Array").unwrap().check(&json!([1]), None));
        assert!(IsOfType::new("bool").unwrap().check(&json!(false), None));
    }

    #[test]
    fn test_resource_never_matches_json() {
        let filter = IsOfType::new("resource").unwrap();
        assert!(!filter.check(&json!({}), None));
    }
}
