//! Decoding submitted forms into the raw-input map.
//!
//! Bracketed keys nest: `rows[1][name]=b` becomes
//! `{"rows": {"1": {"name": "b"}}}` and `tags[]=x&tags[]=y` becomes
//! `{"tags": {"0": "x", "1": "y"}}`, which is the shape repeatable
//! fields and generation groups expect.

use crate::{FormError, Result};
use serde_json::{Map, Value};

/// Deepest bracket nesting expanded; deeper keys are kept whole.
pub const MAX_NESTING: usize = 64;

/// Decode an `application/x-www-form-urlencoded` body.
pub fn parse_form_input(body: &[u8]) -> Result<Map<String, Value>> {
    let pairs: Vec<(String, String)> =
        serde_urlencoded::from_bytes(body).map_err(|e| FormError::InvalidInput(e.to_string()))?;
    Ok(from_pairs(pairs))
}

/// Build the raw-input map from already decoded pairs, in order.
pub fn from_pairs<I, K, V>(pairs: I) -> Map<String, Value>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    let mut input = Map::new();
    for (key, value) in pairs {
        let segments = split_key(key.as_ref());
        insert(&mut input, &segments, Value::String(value.into()));
    }
    input
}

/// `a[b][]` gives `["a", "b", ""]`. Malformed keys, and keys nested
/// deeper than [`MAX_NESTING`], are kept whole.
fn split_key(key: &str) -> Vec<&str> {
    let Some(open) = key.find('[') else {
        return vec![key];
    };
    if open == 0 {
        return vec![key];
    }

    let mut segments = vec![&key[..open]];
    let mut rest = &key[open..];
    while !rest.is_empty() {
        let Some(inner) = rest.strip_prefix('[') else {
            return vec![key];
        };
        let Some(close) = inner.find(']') else {
            return vec![key];
        };
        if segments.len() > MAX_NESTING {
            tracing::debug!(key_len = key.len(), "form key nested too deeply");
            return vec![key];
        }
        segments.push(&inner[..close]);
        rest = &inner[close + 1..];
    }
    segments
}

fn insert(map: &mut Map<String, Value>, segments: &[&str], value: Value) {
    let Some((first, rest)) = segments.split_first() else {
        return;
    };
    let key = if first.is_empty() {
        map.len().to_string()
    } else {
        (*first).to_string()
    };

    if rest.is_empty() {
        map.insert(key, value);
        return;
    }

    let slot = map.entry(key).or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        tracing::debug!(segment = %first, "nested input replaces a scalar value");
        *slot = Value::Object(Map::new());
    }
    if let Value::Object(nested) = slot {
        insert(nested, rest, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flat_body() {
        let input = parse_form_input(b"name=Ada+Lovelace&email=ada%40example.com").unwrap();
        assert_eq!(Value::Object(input), json!({"name": "Ada Lovelace", "email": "ada@example.com"}));
    }

    #[test]
    fn test_indexed_and_nested_keys() {
        let input = parse_form_input(b"emails%5B0%5D=a&emails%5B1%5D=b&rows[1][name]=x").unwrap();
        assert_eq!(
            Value::Object(input),
            json!({"emails": {"0": "a", "1": "b"}, "rows": {"1": {"name": "x"}}})
        );
    }

    #[test]
    fn test_append_keys() {
        let input = from_pairs([("tags[]", "x"), ("tags[]", "y")]);
        assert_eq!(Value::Object(input), json!({"tags": {"0": "x", "1": "y"}}));
    }

    #[test]
    fn test_malformed_keys_kept_whole() {
        let input = from_pairs([("a[b", "1"), ("[x]", "2"), ("c]d", "3")]);
        assert_eq!(Value::Object(input), json!({"a[b": "1", "[x]": "2", "c]d": "3"}));
    }

    #[test]
    fn test_nesting_up_to_limit_expands() {
        let key = format!("a{}", "[x]".repeat(MAX_NESTING));
        let input = from_pairs([(key, "1")]);

        let mut node = &input["a"];
        for _ in 1..MAX_NESTING {
            node = &node["x"];
        }
        assert_eq!(node["x"], "1");
    }

    #[test]
    fn test_deep_nesting_kept_whole() {
        let key = format!("a{}", "[x]".repeat(MAX_NESTING + 1));
        let input = from_pairs([(key.clone(), "1")]);
        assert_eq!(input.len(), 1);
        assert_eq!(input[&key], "1");

        let body = format!("a{}=1", "%5Bx%5D".repeat(100_000));
        let input = parse_form_input(body.as_bytes()).unwrap();
        assert_eq!(input.len(), 1);
        assert!(input.values().all(|value| value == "1"));
    }

    #[test]
    fn test_last_scalar_wins() {
        let input = from_pairs([("name", "a"), ("name", "b")]);
        assert_eq!(input["name"], "b");
    }
}
