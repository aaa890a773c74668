// Pattern filters

use super::Filter;
use crate::value::as_text;
use crate::{FormError, MessageTemplate, Result, Severity};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

pub static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$").unwrap()
});

static LOWER_WORD_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9_]+$").unwrap());

static UPPER_WORD_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z0-9_]+$").unwrap());

static WORD_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]+$").unwrap());

/// Letter case a word must be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordCase {
    Lower,
    Upper,
    Mixed,
}

impl WordCase {
    pub fn regex(&self) -> &'static Regex {
        match self {
            WordCase::Lower => &LOWER_WORD_REGEX,
            WordCase::Upper => &UPPER_WORD_REGEX,
            WordCase::Mixed => &WORD_REGEX,
        }
    }
}

/// The textual value must match a regular expression.
#[derive(Debug, Clone)]
pub struct RegExp {
    constraint: &'static str,
    regex: Regex,
    message: MessageTemplate,
    severity: Severity,
}

message_builders!(RegExp);

impl RegExp {
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self::from_regex("regexp", Regex::new(pattern)?, "%s has an invalid format"))
    }

    fn from_regex(constraint: &'static str, regex: Regex, message: impl Into<MessageTemplate>) -> Self {
        Self {
            constraint,
            regex,
            message: message.into(),
            severity: Severity::Error,
        }
    }

    /// Exactly `length` characters.
    pub fn length(length: usize) -> Result<Self> {
        let regex = Regex::new(&format!(r"(?s)^.{{{length}}}$"))?;
        Ok(Self::from_regex(
            "length",
            regex,
            MessageTemplate::new("%s must be exactly %d characters long").bind(length),
        ))
    }

    /// Between `min` and `max` characters, inclusive. Bounds may be
    /// given in either order.
    pub fn length_between(min: usize, max: usize) -> Result<Self> {
        let (min, max) = (min.min(max), min.max(max));
        let regex = Regex::new(&format!(r"(?s)^.{{{min},{max}}}$"))?;
        Ok(Self::from_regex(
            "length",
            regex,
            MessageTemplate::new("%s must be between %d and %d characters long")
                .bind(min)
                .bind(max),
        ))
    }

    pub fn word(case: WordCase) -> Self {
        let message = match case {
            WordCase::Lower => "%s must be a single lowercase word",
            WordCase::Upper => "%s must be a single uppercase word",
            WordCase::Mixed => "%s must be a single word",
        };
        Self::from_regex("word", case.regex().clone(), message)
    }

    /// Hexadecimal key of `bits` bits, e.g. 128 for 32 hex digits.
    pub fn hex_key(bits: usize) -> Result<Self> {
        if bits == 0 || bits % 4 != 0 {
            return Err(FormError::InvalidFilterArgument(format!(
                "hex key length must be a positive multiple of 4 bits, got {bits}"
            )));
        }
        let digits = bits / 4;
        let regex = Regex::new(&format!(r"^[0-9a-fA-F]{{{digits}}}$"))?;
        Ok(Self::from_regex(
            "hex_key",
            regex,
            MessageTemplate::new("%s must be a %d-bit hexadecimal key").bind(bits),
        ))
    }

    /// The value must equal `expected` exactly.
    pub fn equals(expected: &str) -> Result<Self> {
        let regex = Regex::new(&format!("^{}$", regex::escape(expected)))?;
        Ok(Self::from_regex("equals", regex, "%s does not match the expected value"))
    }

    pub fn email() -> Self {
        Self::from_regex("email", EMAIL_REGEX.clone(), "%s must be a valid e-mail address")
    }

    pub fn as_regex(&self) -> &Regex {
        &self.regex
    }
}

impl Filter for RegExp {
    fn name(&self) -> &str {
        self.constraint
    }

    fn check(&self, value: &Value, _index: Option<usize>) -> bool {
        as_text(value).is_some_and(|text| self.regex.is_match(&text))
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
    use crate::{ValidationContext, ValidationErrors};
    use serde_json::json;

    #[test]
    fn test_length() {
        let filter = RegExp::length(3).unwrap();
        assert!(filter.check(&json!("abc"), None));
        assert!(filter.check(&json!("äöü"), None));
        assert!(!filter.check(&json!("abcd"), None));
        assert!(filter.check(&json!(123), None));
    }

    #[test]
    fn test_length_between_normalizes_bounds() {
        let filter = RegExp::length_between(5, 2).unwrap();
        assert!(filter.check(&json!("ab"), None));
        assert!(filter.check(&json!("abcde"), None));
        assert!(!filter.check(&json!("abcdef"), None));

        let mut errors = ValidationErrors::default();
        filter.validate("nick", &json!("a"), None, &mut ValidationContext::new(&mut errors));
        assert_eq!(errors.errors[0].message, "nick must be between 2 and 5 characters long");
    }

    #[test]
    fn test_hex_key() {
        let filter = RegExp::hex_key(32).unwrap();
        assert!(filter.check(&json!("deadBEEF"), None));
        assert!(!filter.check(&json!("deadbeef0"), None));
        assert!(!filter.check(&json!("deadbeeg"), None));
        assert!(matches!(RegExp::hex_key(30), Err(FormError::InvalidFilterArgument(_))));
    }

    #[test]
    fn test_equals_escapes_pattern() {
        let filter = RegExp::equals("a.b").unwrap();
        assert!(filter.check(&json!("a.b"), None));
        assert!(!filter.check(&json!("axb"), None));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(matches!(RegExp::new("("), Err(FormError::Pattern(_))));
    }

    #[test]
    fn test_non_scalar_fails() {
        let filter = RegExp::word(WordCase::Mixed);
        assert!(!filter.check(&json!(["word"]), None));
    }

    #[test]
    fn test_custom_message_keeps_params() {
        let filter = RegExp::length(2).unwrap().with_message("%s: %d characters please");
        let mut errors = ValidationErrors::default();
        filter.validate("code", &json!("abc"), None, &mut ValidationContext::new(&mut errors));
        assert_eq!(errors.errors[0].message, "code: 2 characters please");
        assert_eq!(errors.errors[0].constraint, "length");
    }
}
