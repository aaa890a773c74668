//! Field values and helpers over raw JSON input.

use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// Values of a repeatable field, keyed by repeat index.
pub type IndexedValues = BTreeMap<usize, Value>;

/// The populated state of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Value of a non-repeatable field
    Single(Value),
    /// Values of a repeatable field
    Indexed(IndexedValues),
}

impl FieldValue {
    /// JSON form: the scalar itself, or an object keyed by index.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Single(value) => value.clone(),
            FieldValue::Indexed(values) => indexed_to_json(values),
        }
    }

    pub fn as_indexed(&self) -> Option<&IndexedValues> {
        match self {
            FieldValue::Indexed(values) => Some(values),
            FieldValue::Single(_) => None,
        }
    }
}

/// Render an index map as a JSON object with string keys.
pub fn indexed_to_json(values: &IndexedValues) -> Value {
    Value::Object(
        values
            .iter()
            .map(|(index, value)| (index.to_string(), value.clone()))
            .collect::<Map<String, Value>>(),
    )
}

/// `null`, `""` and empty collections count as "no value".
pub fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

/// Loose truthiness as form submissions use it.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Textual form of a scalar. Arrays, objects and null have none.
pub fn as_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(true) => Some(Cow::Borrowed("1")),
        Value::Bool(false) => Some(Cow::Borrowed("")),
        _ => None,
    }
}

/// Parse an integer-like key (`"0"`, `"12"`) as a repeat index.
/// Keys beyond `i64::MAX` are not indices.
pub fn parse_index(key: &str) -> Option<usize> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse::<i64>().ok().and_then(|index| usize::try_from(index).ok())
}

/// Interpret an object with integer-like keys, or an array, as indexed
/// values.
pub fn to_indexed(value: &Value) -> Option<IndexedValues> {
    match value {
        Value::Array(items) => Some(items.iter().cloned().enumerate().collect()),
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| parse_index(key).map(|index| (index, value.clone())))
            .collect(),
        _ => None,
    }
}

/// Integer value of a number or an integer-like string.
pub fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => {
            let s = s.trim();
            let digits = s.strip_prefix(|c: char| c == '-' || c == '+').unwrap_or(s);
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            s.parse().ok()
        }
        _ => None,
    }
}

/// Floating point value of a number or a numeric string.
pub fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Runtime kind of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Boolean,
    Integer,
    Float,
    String,
    Array,
    Object,
    /// Handles to external resources; JSON input never carries one
    Resource,
    Null,
}

impl PrimitiveKind {
    /// Parse a kind literal (`"boolean"`, `"integer"`, ...).
    pub fn parse(literal: &str) -> Option<Self> {
        match literal.to_ascii_lowercase().as_str() {
            "boolean" | "bool" => Some(PrimitiveKind::Boolean),
            "integer" | "int" => Some(PrimitiveKind::Integer),
            "float" | "double" => Some(PrimitiveKind::Float),
            "string" => Some(PrimitiveKind::String),
            "array" => Some(PrimitiveKind::Array),
            "object" => Some(PrimitiveKind::Object),
            "resource" => Some(PrimitiveKind::Resource),
            "null" => Some(PrimitiveKind::Null),
            _ => None,
        }
    }

    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => PrimitiveKind::Null,
            Value::Bool(_) => PrimitiveKind::Boolean,
            Value::Number(n) if n.is_f64() => PrimitiveKind::Float,
            Value::Number(_) => PrimitiveKind::Integer,
            Value::String(_) => PrimitiveKind::String,
            Value::Array(_) => PrimitiveKind::Array,
            Value::Object(_) => PrimitiveKind::Object,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Integer => "integer",
            PrimitiveKind::Float => "float",
            PrimitiveKind::String => "string",
            PrimitiveKind::Array => "array",
            PrimitiveKind::Object => "object",
            PrimitiveKind::Resource => "resource",
            PrimitiveKind::Null => "null",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_indexed_object() {
        let values = to_indexed(&json!({"0": "a", "5": "b"})).unwrap();
        assert_eq!(values.keys().copied().collect::<Vec<_>>(), vec![0, 5]);
    }

    #[test]
    fn test_to_indexed_rejects_named_keys() {
        assert!(to_indexed(&json!({"0": "a", "name": "b"})).is_none());
        assert!(to_indexed(&json!("scalar")).is_none());
    }

    #[test]
    fn test_to_indexed_array() {
        let values = to_indexed(&json!(["x", "y"])).unwrap();
        assert_eq!(values.get(&1), Some(&json!("y")));
    }

    #[test]
    fn test_as_i64() {
        assert_eq!(as_i64(&json!("5")), Some(5));
        assert_eq!(as_i64(&json!(" -3 ")), Some(-3));
        assert_eq!(as_i64(&json!(7)), Some(7));
        assert_eq!(as_i64(&json!("5.5")), None);
        assert_eq!(as_i64(&json!("-")), None);
        assert_eq!(as_i64(&json!(1.5)), None);
    }

    #[test]
    fn test_is_absent() {
        assert!(is_absent(&Value::Null));
        assert!(is_absent(&json!("")));
        assert!(is_absent(&json!([])));
        assert!(!is_absent(&json!(" ")));
        assert!(!is_absent(&json!(0)));
    }

    #[test]
    fn test_truthiness() {
        assert!(is_truthy(&json!("1")));
        assert!(is_truthy(&json!("on")));
        assert!(!is_truthy(&json!("0")));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&Value::Null));
        assert!(!is_truthy(&json!(0)));
    }

    #[test]
    fn test_primitive_kind() {
        assert_eq!(PrimitiveKind::of(&json!(1)), PrimitiveKind::Integer);
        assert_eq!(PrimitiveKind::of(&json!(1.5)), PrimitiveKind::Float);
        assert_eq!(PrimitiveKind::parse("DOUBLE"), Some(PrimitiveKind::Float));
        assert_eq!(PrimitiveKind::parse("callable"), None);
    }

    #[test]
    fn test_parse_index() {
        assert_eq!(parse_index("12"), Some(12));
        assert_eq!(parse_index("-1"), None);
        assert_eq!(parse_index(""), None);
        assert_eq!(parse_index("9223372036854775807"), usize::try_from(i64::MAX).ok());
        assert_eq!(parse_index("9223372036854775808"), None);
        assert_eq!(parse_index("18446744073709551615"), None);
    }
}
