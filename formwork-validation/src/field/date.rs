// Date and date-time fields

use super::{Field, FieldBehavior, RenderInstruction};
use crate::value::as_text;
use crate::{FieldType, MessageTemplate, Severity, ValidationContext};
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

pub const DEFAULT_DATE_PATTERN: &str = "%Y-%m-%d";
pub const DEFAULT_DATETIME_PATTERN: &str = "%Y-%m-%d %H:%M";

/// Human-readable form of a `chrono` pattern: `%Y-%m-%d` gives
/// `YYYY-MM-DD`.
pub fn pattern_hint(pattern: &str) -> String {
    let mut hint = String::with_capacity(pattern.len() * 2);
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            hint.push(c);
            continue;
        }
        match chars.next() {
            Some('Y') => hint.push_str("YYYY"),
            Some('y') => hint.push_str("YY"),
            Some('m') => hint.push_str("MM"),
            Some('d') => hint.push_str("DD"),
            Some('H') => hint.push_str("hh"),
            Some('M') => hint.push_str("mm"),
            Some('S') => hint.push_str("ss"),
            Some('%') => hint.push('%'),
            Some(other) => {
                hint.push('%');
                hint.push(other);
            }
            None => hint.push('%'),
        }
    }
    hint
}

#[derive(Debug)]
pub struct DateField {
    pattern: String,
    with_time: bool,
}

impl DateField {
    pub fn date() -> Self {
        Self {
            pattern: DEFAULT_DATE_PATTERN.to_string(),
            with_time: false,
        }
    }

    pub fn date_time() -> Self {
        Self {
            pattern: DEFAULT_DATETIME_PATTERN.to_string(),
            with_time: true,
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn set_pattern(&mut self, pattern: impl Into<String>) {
        self.pattern = pattern.into();
    }

    pub fn has_time(&self) -> bool {
        self.with_time
    }

    pub fn parses(&self, text: &str) -> bool {
        let text = text.trim();
        if self.with_time {
            NaiveDateTime::parse_from_str(text, &self.pattern).is_ok()
        } else {
            NaiveDate::parse_from_str(text, &self.pattern).is_ok()
        }
    }
}

impl FieldBehavior for DateField {
    fn check(
        &self,
        field: &Field,
        value: &Value,
        index: Option<usize>,
        ctx: &mut ValidationContext<'_>,
    ) -> bool {
        if value.is_string() && as_text(value).is_some_and(|text| self.parses(&text)) {
            return true;
        }
        let constraint = if self.with_time { "date_time" } else { "date" };
        ctx.fail(
            field.name(),
            index,
            constraint,
            &MessageTemplate::new("%s must match the format %s").bind(pattern_hint(&self.pattern)),
            Severity::Error,
        )
    }

    fn decorate(&self, field: &Field, _current: &Value, instruction: &mut RenderInstruction) {
        let hint = pattern_hint(&self.pattern);
        instruction.update_extras(|extras| {
            extras
                .entry("placeholder")
                .or_insert_with(|| Value::from(hint.clone()));
        });
        if field.suffix().is_none() {
            instruction.set("suffix", format!("({hint})"));
        }
    }
}

pub fn date_factory(ty: FieldType) -> Box<dyn FieldBehavior> {
    match ty {
        FieldType::DateTime => Box::new(DateField::date_time()),
        _ => Box::new(DateField::date()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ValidationErrors;
    use serde_json::json;

    fn validate(field: &Field) -> (bool, ValidationErrors) {
        let mut errors = ValidationErrors::default();
        let valid = field.validate(&mut ValidationContext::new(&mut errors));
        (valid, errors)
    }

    #[test]
    fn test_pattern_hint() {
        assert_eq!(pattern_hint("%Y-%m-%d"), "YYYY-MM-DD");
        assert_eq!(pattern_hint("%d/%m/%Y %H:%M"), "DD/MM/YYYY hh:mm");
        assert_eq!(pattern_hint("100%%"), "100%");
    }

    #[test]
    fn test_date_validation() {
        let mut field = Field::create("born", FieldType::DateDate, None, false).unwrap();
        field.set_value(json!("1990-02-28")).unwrap();
        assert!(validate(&field).0);

        field.set_value(json!("1990-02-30")).unwrap();
        let (valid, errors) = validate(&field);
        assert!(!valid);
        assert_eq!(errors.errors[0].message, "born must match the format YYYY-MM-DD");
    }

    #[test]
    fn test_date_time_validation() {
        let mut field = Field::create("starts", FieldType::DateTime, None, false).unwrap();
        field.set_value(json!("2024-05-01 09:30")).unwrap();
        assert!(validate(&field).0);

        field.set_value(json!("2024-05-01")).unwrap();
        assert!(!validate(&field).0);
    }

    #[test]
    fn test_custom_pattern() {
        let mut field = Field::create("born", FieldType::DateDate, None, false).unwrap();
        field.set_pattern("%d/%m/%Y").unwrap();
        field.set_value(json!("28/02/1990")).unwrap();
        assert!(validate(&field).0);
        assert_eq!(field.behavior::<DateField>().unwrap().pattern(), "%d/%m/%Y");
    }

    #[test]
    fn test_placeholder_and_suffix() {
        let mut field = Field::create("starts", FieldType::DateTime, None, false).unwrap();
        let instruction = field.generate(&[], None).unwrap();
        assert_eq!(instruction.get("extras").unwrap()["placeholder"], "YYYY-MM-DD hh:mm");
        assert_eq!(instruction.get("suffix"), Some(&json!("(YYYY-MM-DD hh:mm)")));

        field.set_suffix("UTC");
        let instruction = field.generate(&[], None).unwrap();
        assert_eq!(instruction.get("suffix"), Some(&json!("UTC")));
    }

    #[test]
    fn test_set_pattern_on_text_is_unsupported() {
        let mut field = Field::create("name", FieldType::Text, None, false).unwrap();
        assert!(field.set_pattern("%Y").is_err());
    }
}
