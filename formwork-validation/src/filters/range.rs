// Integer range filter

use super::Filter;
use crate::value::as_i64;
use crate::{MessageTemplate, Severity};
use serde_json::Value;

/// The value must be an integer in `[min, max)`, or `[min, max]` when
/// the maximum is inclusive.
#[derive(Debug, Clone)]
pub struct InIntRange {
    min: i64,
    max: i64,
    inclusive_max: bool,
    message: MessageTemplate,
    severity: Severity,
}

message_builders!(InIntRange);

impl InIntRange {
    /// Bounds may be given in either order.
    pub fn new(a: i64, b: i64, inclusive_max: bool) -> Self {
        let (min, max) = (a.min(b), a.max(b));
        let template = if inclusive_max {
            "%s must be between %d and %d"
        } else {
            "%s must be at least %d and less than %d"
        };
        Self {
            min,
            max,
            inclusive_max,
            message: MessageTemplate::new(template).bind(min).bind(max),
            severity: Severity::Error,
        }
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    pub fn contains(&self, n: i64) -> bool {
        if self.inclusive_max {
            (self.min..=self.max).contains(&n)
        } else {
            (self.min..self.max).contains(&n)
        }
    }
}

impl Filter for InIntRange {
    fn name(&self) -> &str {
        "range"
    }

    fn check(&self, value: &Value, _index: Option<usize>) -> bool {
        as_i64(value).is_some_and(|n| self.contains(n))
    }

    fn message(&self) -> &MessageTemplate {
        &self.message
    }

    fn severity(&self) -> Severity {
        self.severity
    }
}
