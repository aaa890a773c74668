// Declaration errors and validation diagnostics

use crate::FieldType;
use std::fmt;
use thiserror::Error;

/// Errors raised while declaring or driving a form.
///
/// These are programmer or setup errors. Data problems found while
/// validating input are never returned as `FormError`; they surface as
/// a `false` result plus a [`ValidationError`] diagnostic.
#[derive(Debug, Error)]
pub enum FormError {
    /// A field type tag was bound to a variant twice
    #[error("Field type already registered: {0}")]
    DuplicateRegistration(FieldType),

    /// Field names must be non-empty
    #[error("Invalid field name: {0:?}")]
    InvalidFieldName(String),

    /// A field with this name is already declared
    #[error("Duplicate field name: {0}")]
    DuplicateFieldName(String),

    /// No field with this name is declared
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Field values may only be written through validation
    #[error("Field values are immutable outside of validation")]
    FieldValuesImmutable,

    /// A value of the wrong shape was given to a field
    #[error("Type mismatch for field {field}: {reason}")]
    TypeMismatch { field: String, reason: String },

    /// A repeatable field was rendered more often than its cap allows
    #[error("Repeat limit of {limit} exceeded for field {field}")]
    RepeatLimitExceeded { field: String, limit: usize },

    /// A filter was constructed with arguments it cannot work with
    #[error("Invalid filter argument: {0}")]
    InvalidFilterArgument(String),

    /// A variant-specific operation was used on another variant
    #[error("Operation {operation} is not supported by {field_type} fields")]
    UnsupportedOperation {
        operation: &'static str,
        field_type: FieldType,
    },

    /// A regular expression failed to compile
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// A request body could not be decoded
    #[error("Invalid form input: {0}")]
    InvalidInput(String),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for form declaration operations
pub type Result<T> = std::result::Result<T, FormError>;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Severity {
    Notice,
    Warning,
    #[default]
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Notice => "notice",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation diagnostic for a single field
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Field name that failed validation
    pub field: String,

    /// Repeat index the failure belongs to, if any
    pub index: Option<usize>,

    /// Formatted, translated message
    pub message: String,

    /// Check that failed (`required`, filter name, variant check)
    pub constraint: String,

    pub severity: Severity,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            index: None,
            message: message.into(),
            constraint: "custom".to_string(),
            severity: Severity::Error,
        }
    }

    /// Set the constraint name
    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraint = constraint.into();
        self
    }

    /// Attach the repeat index
    pub fn with_index(mut self, index: Option<usize>) -> Self {
        self.index = index;
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}[{}]: {}", self.field, index, self.message),
            None => write!(f, "{}: {}", self.field, self.message),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors {
    pub errors: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Create a new validation errors collection
    pub fn new(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }

    /// Check if there are any errors
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get the number of errors
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Add an error
    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Get errors for a specific field
    pub fn get_field_errors(&self, field: &str) -> Vec<&ValidationError> {
        self.errors.iter().filter(|e| e.field == field).collect()
    }

    /// Highest severity present, if any error was collected
    pub fn max_severity(&self) -> Option<Severity> {
        self.errors.iter().map(|e| e.severity).max()
    }

    /// Convert to JSON representation
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "errors": self.errors.iter().map(|e| {
                serde_json::json!({
                    "field": e.field,
                    "index": e.index,
                    "message": e.message,
                    "constraint": e.constraint,
                    "severity": e.severity.as_str(),
                })
            }).collect::<Vec<_>>()
        })
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for error in &self.errors {
            writeln!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self::new(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Notice < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn test_display_with_index() {
        let error = ValidationError::new("emails", "is not valid").with_index(Some(1));
        assert_eq!(error.to_string(), "emails[1]: is not valid");
    }

    #[test]
    fn test_errors_to_json() {
        let mut errors = ValidationErrors::default();
        errors.add(
            ValidationError::new("age", "age is required")
                .with_constraint("required")
                .with_severity(Severity::Warning),
        );

        let json = errors.to_json();
        assert_eq!(json["errors"][0]["field"], "age");
        assert_eq!(json["errors"][0]["constraint"], "required");
        assert_eq!(json["errors"][0]["severity"], "warning");
        assert_eq!(errors.max_severity(), Some(Severity::Warning));
    }
}
