// Closure-backed filter

use super::Filter;
use crate::{MessageTemplate, Severity};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

type Predicate = Arc<dyn Fn(&Value, Option<usize>) -> bool + Send + Sync>;

/// A filter built from a closure, for application-specific rules.
///
/// ```
/// use formwork_validation::{Callback, Filter};
/// use serde_json::json;
///
/// let even = Callback::new("even", |value, _| value.as_i64().is_some_and(|n| n % 2 == 0))
///     .with_message("%s must be even");
/// assert!(even.check(&json!(4), None));
/// ```
#[derive(Clone)]
pub struct Callback {
    name: String,
    predicate: Predicate,
    field_level: bool,
    message: MessageTemplate,
    severity: Severity,
}

message_builders!(Callback);

impl Callback {
    pub fn new<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value, Option<usize>) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
            field_level: false,
            message: MessageTemplate::new("%s is invalid"),
            severity: Severity::Error,
        }
    }

    /// Evaluate the closure once against the whole field value.
    pub fn field_level(mut self) -> Self {
        self.field_level = true;
        self
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("name", &self.name)
            .field("field_level", &self.field_level)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

impl Filter for Callback {
    fn name(&self) -> &str {
        &self.name
    }

    fn applies_to_field(&self) -> bool {
        self.field_level
    }

    fn check(&self, value: &Value, index: Option<usize>) -> bool {
        (self.predicate)(value, index)
    }

    fn message(&self) -> &MessageTemplate {
        &self.message
    }

    fn severity(&self) -> Severity {
        self.severity
    }
}
