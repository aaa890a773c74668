//! Render instructions handed to the view layer.

use serde::Serialize;
use serde_json::{Map, Value};

/// Template reference plus the context a view binds literally.
///
/// The context always carries `type`, `name`, `required`, `readonly`,
/// `disabled`, `value`, `repeatable`, `repeat_counter`, `suffix` and
/// `extras`; variants may add more keys (`options`, `multiple`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderInstruction {
    pub template: String,
    pub context: Map<String, Value>,
}

impl RenderInstruction {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            context: Map::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.context.get(key)
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.context.insert(key.to_string(), value.into());
    }

    /// Wire name the view must use for the input
    pub fn name(&self) -> &str {
        self.context
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Edit the `extras` bag, creating it (or replacing a non-object)
    /// first.
    pub fn update_extras(&mut self, update: impl FnOnce(&mut Map<String, Value>)) {
        let slot = self
            .context
            .entry("extras")
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        if let Value::Object(extras) = slot {
            update(extras);
        }
    }
}

/// Position of the next repeat row to render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct RenderCursor(usize);

impl RenderCursor {
    pub fn new(position: usize) -> Self {
        Self(position)
    }

    pub fn position(&self) -> usize {
        self.0
    }

    #[must_use]
    pub fn advance(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Nest `name` inside the generation groups with bracket syntax:
/// `["contacts", "0"]` and `email` give `contacts[0][email]`.
pub fn wire_name(groups: &[String], name: &str) -> String {
    match groups.split_first() {
        None => name.to_string(),
        Some((outer, inner)) => {
            let mut wire = String::with_capacity(outer.len() + name.len() + 2 * groups.len());
            wire.push_str(outer);
            for group in inner {
                wire.push('[');
                wire.push_str(group);
                wire.push(']');
            }
            wire.push('[');
            wire.push_str(name);
            wire.push(']');
            wire
        }
    }
}
