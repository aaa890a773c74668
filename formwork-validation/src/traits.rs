// Diagnostics, translation and validation context

use crate::{Severity, ValidationError, ValidationErrors};
use std::collections::HashMap;

/// Receives the diagnostics a failing validation emits.
pub trait MessageDispatcher {
    fn dispatch(&mut self, error: ValidationError);
}

impl MessageDispatcher for ValidationErrors {
    fn dispatch(&mut self, error: ValidationError) {
        self.add(error);
    }
}

impl MessageDispatcher for Vec<ValidationError> {
    fn dispatch(&mut self, error: ValidationError) {
        self.push(error);
    }
}

/// Forwards diagnostics to `tracing`, one event per message.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDispatcher;

impl MessageDispatcher for LogDispatcher {
    fn dispatch(&mut self, error: ValidationError) {
        match error.severity {
            Severity::Notice => tracing::info!(
                field = %error.field,
                index = ?error.index,
                constraint = %error.constraint,
                "{}",
                error.message
            ),
            Severity::Warning => tracing::warn!(
                field = %error.field,
                index = ?error.index,
                constraint = %error.constraint,
                "{}",
                error.message
            ),
            Severity::Error => tracing::error!(
                field = %error.field,
                index = ?error.index,
                constraint = %error.constraint,
                "{}",
                error.message
            ),
        }
    }
}

/// Discards every diagnostic.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDispatcher;

impl MessageDispatcher for NullDispatcher {
    fn dispatch(&mut self, _error: ValidationError) {}
}

/// Opaque message lookup used before placeholders are filled in.
pub trait Translator: Send + Sync {
    fn translate(&self, message: &str) -> String;
}

impl<F> Translator for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn translate(&self, message: &str) -> String {
        self(message)
    }
}

/// Returns every message unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct Untranslated;

impl Translator for Untranslated {
    fn translate(&self, message: &str) -> String {
        message.to_string()
    }
}

/// Fixed message table, falling back to the untranslated message.
#[derive(Debug, Default, Clone)]
pub struct MessageCatalog {
    messages: HashMap<String, String>,
}

impl MessageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a translation
    pub fn with(mut self, message: impl Into<String>, translation: impl Into<String>) -> Self {
        self.messages.insert(message.into(), translation.into());
        self
    }
}

impl Translator for MessageCatalog {
    fn translate(&self, message: &str) -> String {
        self.messages
            .get(message)
            .cloned()
            .unwrap_or_else(|| message.to_string())
    }
}

static UNTRANSLATED: Untranslated = Untranslated;

/// Per-validation state handed down to fields and filters.
///
/// Silent mode suppresses emission only; every check still runs and
/// returns the same result.
pub struct ValidationContext<'a> {
    silent: bool,
    dispatcher: &'a mut dyn MessageDispatcher,
    translator: &'a dyn Translator,
}

impl<'a> ValidationContext<'a> {
    /// Create a context emitting into `dispatcher`
    pub fn new(dispatcher: &'a mut dyn MessageDispatcher) -> Self {
        Self {
            silent: false,
            dispatcher,
            translator: &UNTRANSLATED,
        }
    }

    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    pub fn with_translator(mut self, translator: &'a dyn Translator) -> Self {
        self.translator = translator;
        self
    }

    pub fn is_silent(&self) -> bool {
        self.silent
    }

    pub fn translator(&self) -> &'a dyn Translator {
        self.translator
    }

    pub fn translate(&self, message: &str) -> String {
        self.translator.translate(message)
    }

    /// A non-silent context with the same translator emitting into
    /// another dispatcher.
    pub fn redirect<'b>(&self, dispatcher: &'b mut dyn MessageDispatcher) -> ValidationContext<'b>
    where
        'a: 'b,
    {
        ValidationContext {
            silent: false,
            dispatcher,
            translator: self.translator,
        }
    }

    /// Emit a diagnostic unless silent.
    pub fn report(&mut self, error: ValidationError) {
        if !self.silent {
            self.dispatcher.dispatch(error);
        }
    }

    /// Format `template`, emit it unless silent, and return `false`.
    pub fn fail(
        &mut self,
        field: &str,
        index: Option<usize>,
        constraint: &str,
        template: &MessageTemplate,
        severity: Severity,
    ) -> bool {
        if !self.silent {
            let message = template.format(field, self.translator);
            self.dispatcher.dispatch(
                ValidationError::new(field, message)
                    .with_index(index)
                    .with_constraint(constraint)
                    .with_severity(severity),
            );
        }
        false
    }
}

/// Message with a `%s` slot for the field name followed by optional
/// bound `%s`/`%d` parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    template: String,
    params: Vec<String>,
}

impl MessageTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            params: Vec::new(),
        }
    }

    /// Bind the next placeholder after the field name
    pub fn bind(mut self, param: impl ToString) -> Self {
        self.params.push(param.to_string());
        self
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Same parameters, different wording.
    pub fn with_template(&self, template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            params: self.params.clone(),
        }
    }

    /// Translate the template, then fill in field name and parameters.
    pub fn format(&self, field: &str, translator: &dyn Translator) -> String {
        let translated = translator.translate(&self.template);
        let mut values = std::iter::once(field).chain(self.params.iter().map(String::as_str));
        let mut out = String::with_capacity(translated.len() + field.len());
        let mut chars = translated.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '%' {
                match chars.peek() {
                    Some('s') | Some('d') => {
                        chars.next();
                        out.push_str(values.next().unwrap_or_default());
                        continue;
                    }
                    Some('%') => {
                        chars.next();
                        out.push('%');
                        continue;
                    }
                    _ => {}
                }
            }
            out.push(c);
        }

        out
    }
}

impl From<&str> for MessageTemplate {
    fn from(template: &str) -> Self {
        Self::new(template)
    }
}

impl From<String> for MessageTemplate {
    fn from(template: String) -> Self {
        Self::new(template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_format() {
        let template = MessageTemplate::new("%s must be between %d and %d")
            .bind(1)
            .bind(10);
        assert_eq!(
            template.format("age", &Untranslated),
            "age must be between 1 and 10"
        );
    }

    #[test]
    fn test_template_escaped_percent() {
        let template = MessageTemplate::new("%s is 100%% wrong");
        assert_eq!(template.format("x", &Untranslated), "x is 100% wrong");
    }

    #[test]
    fn test_template_translated_first() {
        let catalog = MessageCatalog::new().with("%s is required", "%s est obligatoire");
        let template = MessageTemplate::new("%s is required");
        assert_eq!(template.format("nom", &catalog), "nom est obligatoire");
    }

    #[test]
    fn test_closure_translator() {
        let upper = |message: &str| message.to_uppercase();
        assert_eq!(MessageTemplate::new("%s or").format("a", &upper), "a OR");
    }

    #[test]
    fn test_silent_context_does_not_dispatch() {
        let mut errors = ValidationErrors::default();
        let template = MessageTemplate::new("%s failed");
        {
            let mut ctx = ValidationContext::new(&mut errors).silent(true);
            assert!(!ctx.fail("name", None, "custom", &template, Severity::Error));
        }
        assert!(errors.is_empty());

        {
            let mut ctx = ValidationContext::new(&mut errors);
            assert!(!ctx.fail("name", Some(2), "custom", &template, Severity::Warning));
        }
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors[0].message, "name failed");
        assert_eq!(errors.errors[0].index, Some(2));
    }
}
