// Disjunction of filters

use super::Filter;
use crate::{MessageTemplate, Severity, ValidationContext, ValidationError, ValidationErrors};
use serde_json::Value;
use std::sync::Arc;

/// Passes as soon as one sub-filter passes.
///
/// Sub-filters report into a private buffer; when all of them fail the
/// buffered messages are joined with a translated `" or "` and reported
/// once, at the highest severity seen.
#[derive(Debug, Clone)]
pub struct LogicOr {
    filters: Vec<Arc<dyn Filter>>,
    message: MessageTemplate,
    severity: Severity,
}

message_builders!(LogicOr);

impl LogicOr {
    pub fn new(filters: Vec<Arc<dyn Filter>>) -> Self {
        Self {
            filters,
            message: MessageTemplate::new("%s has an invalid value"),
            severity: Severity::Error,
        }
    }

    /// Append another alternative.
    pub fn or<F: Filter + 'static>(mut self, filter: F) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    pub fn filters(&self) -> &[Arc<dyn Filter>] {
        &self.filters
    }
}

impl Filter for LogicOr {
    fn name(&self) -> &str {
        "or"
    }

    fn check(&self, value: &Value, index: Option<usize>) -> bool {
        self.filters.iter().any(|filter| filter.check(value, index))
    }

    fn message(&self) -> &MessageTemplate {
        &self.message
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn validate(
        &self,
        field: &str,
        value: &Value,
        index: Option<usize>,
        ctx: &mut ValidationContext<'_>,
    ) -> bool {
        let mut collected = ValidationErrors::default();
        {
            let mut inner = ctx.redirect(&mut collected);
            for filter in &self.filters {
                if filter.validate(field, value, index, &mut inner) {
                    return true;
                }
            }
        }

        if collected.is_empty() {
            return ctx.fail(field, index, self.name(), &self.message, self.severity);
        }

        let separator = ctx.translate(" or ");
        let message = collected
            .errors
            .iter()
            .map(|error| error.message.as_str())
            .collect::<Vec<_>>()
            .join(separator.as_str());
        let severity = collected.max_severity().unwrap_or(self.severity);

        ctx.report(
            ValidationError::new(field, message)
                .with_index(index)
                .with_constraint(self.name())
                .with_severity(severity),
        );
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{InIntRange, RegExp};
    use crate::{MessageCatalog, Translator};
    use serde_json::json;

    fn zip_or_po_box() -> LogicOr {
        LogicOr::new(vec![Arc::new(RegExp::length(5).unwrap())])
            .or(RegExp::new("^PO[0-9]+$").unwrap().with_severity(Severity::Warning))
    }

    #[test]
    fn test_any_passes() {
        let filter = zip_or_po_box();
        let mut errors = ValidationErrors::default();
        assert!(filter.validate("zip", &json!("12345"), None, &mut ValidationContext::new(&mut errors)));
        assert!(filter.validate("zip", &json!("PO42"), None, &mut ValidationContext::new(&mut errors)));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_messages_joined_once() {
        let filter = zip_or_po_box();
        let mut errors = ValidationErrors::default();
        assert!(!filter.validate("zip", &json!("x"), Some(2), &mut ValidationContext::new(&mut errors)));

        assert_eq!(errors.len(), 1);
        let error = &errors.errors[0];
        assert_eq!(
            error.message,
            "zip must be exactly 5 characters long or zip has an invalid format"
        );
        assert_eq!(error.index, Some(2));
        assert_eq!(error.severity, Severity::Error);
    }

    #[test]
    fn test_all_warnings_report_warning() {
        let filter = LogicOr::new(vec![Arc::new(
            RegExp::length(5).unwrap().with_severity(Severity::Warning),
        )])
        .or(RegExp::new("^PO[0-9]+$").unwrap().with_severity(Severity::Warning));
        let mut errors = ValidationErrors::default();
        assert!(!filter.validate("zip", &json!("x"), None, &mut ValidationContext::new(&mut errors)));

        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors[0].severity, Severity::Warning);
        assert_eq!(errors.errors[0].constraint, filter.name());
    }

    #[test]
    fn test_separator_translated() {
        let catalog = MessageCatalog::new().with(" or ", " ou ");
        let filter = LogicOr::new(vec![
            Arc::new(InIntRange::new(0, 10, true)),
            Arc::new(InIntRange::new(100, 200, true)),
        ]);
        let mut errors = ValidationErrors::default();
        let mut ctx = ValidationContext::new(&mut errors).with_translator(&catalog);
        assert!(!filter.validate("n", &json!(50), None, &mut ctx));
        assert_eq!(
            errors.errors[0].message,
            "n must be between 0 and 10 ou n must be between 100 and 200"
        );
        assert_eq!(catalog.translate("other"), "other");
    }

    #[test]
    fn test_silent_reports_nothing() {
        let filter = zip_or_po_box();
        let mut errors = ValidationErrors::default();
        let mut ctx = ValidationContext::new(&mut errors).silent(true);
        assert!(!filter.validate("zip", &json!("x"), None, &mut ctx));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_empty_disjunction_fails() {
        let filter = LogicOr::new(Vec::new());
        let mut errors = ValidationErrors::default();
        assert!(!filter.validate("f", &json!("x"), None, &mut ValidationContext::new(&mut errors)));
        assert_eq!(errors.errors[0].message, "f has an invalid value");
    }
}
