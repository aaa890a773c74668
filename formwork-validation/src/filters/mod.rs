//! Filters: named predicates attached to fields.
//!
//! A filter either looks at each value of a field (one per repeat index)
//! or, when [`Filter::applies_to_field`] holds, once at the whole value.
//! On failure it formats its [`MessageTemplate`] and emits it through
//! the [`ValidationContext`] unless validation is silent.

use crate::{MessageTemplate, Severity, ValidationContext};
use serde_json::Value;
use std::fmt;

/// `with_message` / `with_severity` builders for filters storing
/// `message` and `severity` fields.
macro_rules! message_builders {
    ($ty:ty) => {
        impl $ty {
            /// Replace the message wording, keeping bound parameters.
            pub fn with_message(mut self, template: impl Into<String>) -> Self {
                self.message = self.message.with_template(template);
                self
            }

            pub fn with_severity(mut self, severity: $crate::Severity) -> Self {
                self.severity = severity;
                self
            }
        }
    };
}

mod callback;
mod db;
mod kind;
mod logic;
mod path;
mod range;
mod regexp;
mod unique;

pub use callback::Callback;
pub use db::{DbError, DoNotExistInDb, ExistsInDb, RowCounter, count_statement, sanitize_identifier};
pub use kind::IsOfType;
pub use logic::LogicOr;
pub use path::Path;
pub use range::InIntRange;
pub use regexp::{EMAIL_REGEX, RegExp, WordCase};
pub use unique::Unique;

/// A validation predicate with its diagnostic.
pub trait Filter: Send + Sync + fmt::Debug {
    /// Constraint name recorded on diagnostics
    fn name(&self) -> &str;

    /// Evaluate once against the whole value instead of per index.
    fn applies_to_field(&self) -> bool {
        false
    }

    /// Whether the filter may be skipped for an absent value of an
    /// optional field.
    fn may_be_skipped(&self, _index: Option<usize>) -> bool {
        true
    }

    /// The bare predicate.
    fn check(&self, value: &Value, index: Option<usize>) -> bool;

    fn message(&self) -> &MessageTemplate;

    fn severity(&self) -> Severity {
        Severity::Error
    }

    /// Check `value` and report a failure through `ctx`.
    fn validate(
        &self,
        field: &str,
        value: &Value,
        index: Option<usize>,
        ctx: &mut ValidationContext<'_>,
    ) -> bool {
        if self.check(value, index) {
            return true;
        }
        ctx.fail(field, index, self.name(), self.message(), self.severity())
    }
}
