// Text-like field variants

use super::{Field, FieldBehavior};
use crate::filters::{EMAIL_REGEX, WordCase};
use crate::value::as_text;
use crate::{FieldType, MessageTemplate, Severity, ValidationContext};
use serde_json::Value;

/// Generic single-line text; also the fallback for unregistered types.
#[derive(Debug, Default)]
pub struct Text;

impl FieldBehavior for Text {}

pub fn text_factory(_ty: FieldType) -> Box<dyn FieldBehavior> {
    Box::new(Text)
}

#[derive(Debug, Default)]
pub struct Hidden;

impl FieldBehavior for Hidden {
    fn html_type(&self) -> &'static str {
        "hidden"
    }
}

pub fn hidden_factory(_ty: FieldType) -> Box<dyn FieldBehavior> {
    Box::new(Hidden)
}

/// Never echoes the submitted value back into the form.
#[derive(Debug, Default)]
pub struct Password;

impl FieldBehavior for Password {
    fn html_type(&self) -> &'static str {
        "password"
    }

    fn renders_value(&self) -> bool {
        false
    }
}

pub fn password_factory(_ty: FieldType) -> Box<dyn FieldBehavior> {
    Box::new(Password)
}

#[derive(Debug, Default)]
pub struct TextArea;

impl FieldBehavior for TextArea {
    fn template(&self) -> &'static str {
        "textarea"
    }
}

pub fn textarea_factory(_ty: FieldType) -> Box<dyn FieldBehavior> {
    Box::new(TextArea)
}

#[derive(Debug, Default)]
pub struct Email;

impl FieldBehavior for Email {
    fn html_type(&self) -> &'static str {
        "email"
    }

    fn prepare(&self, _field: &str, value: Value) -> crate::Result<Value> {
        Ok(match value {
            Value::String(s) => Value::String(s.trim().to_string()),
            other => other,
        })
    }

    fn check(
        &self,
        field: &Field,
        value: &Value,
        index: Option<usize>,
        ctx: &mut ValidationContext<'_>,
    ) -> bool {
        if as_text(value).is_some_and(|text| EMAIL_REGEX.is_match(&text)) {
            return true;
        }
        ctx.fail(
            field.name(),
            index,
            "email",
            &MessageTemplate::new("%s must be a valid e-mail address"),
            Severity::Error,
        )
    }
}

pub fn email_factory(_ty: FieldType) -> Box<dyn FieldBehavior> {
    Box::new(Email)
}

/// A single word, optionally restricted to one letter case.
#[derive(Debug)]
pub struct Word {
    case: WordCase,
}

impl Word {
    pub fn new(case: WordCase) -> Self {
        Self { case }
    }

    pub fn case(&self) -> WordCase {
        self.case
    }
}

impl FieldBehavior for Word {
    fn check(
        &self,
        field: &Field,
        value: &Value,
        index: Option<usize>,
        ctx: &mut ValidationContext<'_>,
    ) -> bool {
        if as_text(value).is_some_and(|text| self.case.regex().is_match(&text)) {
            return true;
        }
        let message = match self.case {
            WordCase::Lower => "%s must be a single lowercase word",
            WordCase::Upper => "%s must be a single uppercase word",
            WordCase::Mixed => "%s must be a single word",
        };
        ctx.fail(
            field.name(),
            index,
            "word",
            &MessageTemplate::new(message),
            Severity::Error,
        )
    }
}

pub fn word_factory(ty: FieldType) -> Box<dyn FieldBehavior> {
    let case = match ty {
        FieldType::LowercaseWord => WordCase::Lower,
        FieldType::UppercaseWord => WordCase::Upper,
        _ => WordCase::Mixed,
    };
    Box::new(Word::new(case))
}

#[cfg(test)]
mod tests {
    use crate::{Field, FieldType, ValidationContext, ValidationErrors};
    use serde_json::json;

    fn validate_value(ty: FieldType, value: serde_json::Value) -> (bool, ValidationErrors) {
        let mut field = Field::create("f", ty, None, false).unwrap();
        field.set_value(value).unwrap();
        let mut errors = ValidationErrors::default();
        let valid = field.validate(&mut ValidationContext::new(&mut errors));
        (valid, errors)
    }

    #[test]
    fn test_email_shape() {
        assert!(validate_value(FieldType::Email, json!(" user@example.com ")).0);
        let (valid, errors) = validate_value(FieldType::Email, json!("not-an-email"));
        assert!(!valid);
        assert_eq!(errors.errors[0].message, "f must be a valid e-mail address");
    }

    #[test]
    fn test_word_cases() {
        assert!(validate_value(FieldType::Word, json!("Hello_1")).0);
        assert!(!validate_value(FieldType::Word, json!("two words")).0);
        assert!(validate_value(FieldType::LowercaseWord, json!("lower")).0);
        assert!(!validate_value(FieldType::LowercaseWord, json!("Lower")).0);
        assert!(validate_value(FieldType::UppercaseWord, json!("UPPER")).0);
        assert!(!validate_value(FieldType::UppercaseWord, json!("Upper")).0);
    }

    #[test]
    fn test_password_never_rendered() {
        let mut field = Field::create("secret", FieldType::Password, None, true).unwrap();
        field.set_value(json!("hunter2")).unwrap();
        let instruction = field.generate(&[], None).unwrap();
        assert_eq!(instruction.get("value"), Some(&serde_json::Value::Null));
        assert_eq!(instruction.get("type"), Some(&json!("password")));
    }

    #[test]
    fn test_textarea_template() {
        let mut field = Field::create("bio", FieldType::TextArea, None, false).unwrap();
        assert_eq!(field.generate(&[], None).unwrap().template, "textarea");
    }

    #[test]
    fn test_hidden_type() {
        let mut field = Field::create("id", FieldType::Hidden, Some(json!(7)), false).unwrap();
        let instruction = field.generate(&[], None).unwrap();
        assert_eq!(instruction.get("type"), Some(&json!("hidden")));
        assert_eq!(instruction.get("value"), Some(&json!(7)));
    }
}
