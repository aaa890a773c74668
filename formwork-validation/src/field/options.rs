// Select, radio and multi-select fields

use super::{Field, FieldBehavior, RenderInstruction};
use crate::value::{as_text, is_absent, to_indexed};
use crate::{FieldType, MessageTemplate, Severity, ValidationContext};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

const INVALID_OPTION_MESSAGE: &str = "%s is not a valid value";

/// One selectable choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl FieldOption {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            label: None,
            group: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Label shown to the user; the value when unlabelled.
    pub fn display_label(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => as_text(&self.value).map(|text| text.into_owned()).unwrap_or_default(),
        }
    }

    fn matches(&self, candidate: &Value) -> bool {
        match (as_text(&self.value), as_text(candidate)) {
            (Some(own), Some(other)) => own == other,
            _ => self.value == *candidate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionStyle {
    Select,
    Radio,
    Multiple,
}

/// A field whose value must be one (or, for `Multiple`, several) of a
/// declared option list.
#[derive(Debug)]
pub struct WithOptions {
    options: Vec<FieldOption>,
    style: OptionStyle,
}

impl WithOptions {
    pub fn new(style: OptionStyle) -> Self {
        Self {
            options: Vec::new(),
            style,
        }
    }

    pub fn options(&self) -> &[FieldOption] {
        &self.options
    }

    pub fn set_options(&mut self, options: Vec<FieldOption>) {
        self.options = options;
    }

    pub fn style(&self) -> OptionStyle {
        self.style
    }

    fn is_option(&self, candidate: &Value) -> bool {
        self.options.iter().any(|option| option.matches(candidate))
    }

    fn is_selected(&self, option: &FieldOption, current: &Value) -> bool {
        match current {
            Value::Array(items) => items.iter().any(|item| option.matches(item)),
            Value::Null => false,
            other => option.matches(other),
        }
    }

    /// Options bucketed by group label. Ungrouped options come first,
    /// then groups in label order; order within a bucket is preserved.
    fn grouped(&self, current: &Value) -> Vec<Value> {
        let mut buckets: Vec<(Option<&str>, Vec<Value>)> = Vec::new();
        for option in &self.options {
            let group = option.group.as_deref();
            let entry = json!({
                "value": option.value,
                "label": option.display_label(),
                "selected": self.is_selected(option, current),
            });
            match buckets.iter_mut().find(|(label, _)| *label == group) {
                Some((_, entries)) => entries.push(entry),
                None => buckets.push((group, vec![entry])),
            }
        }
        buckets.sort_by(|(a, _), (b, _)| a.cmp(b));

        buckets
            .into_iter()
            .map(|(group, entries)| {
                let mut bucket = Map::new();
                bucket.insert("group".to_string(), group.map(Value::from).unwrap_or(Value::Null));
                bucket.insert("options".to_string(), Value::Array(entries));
                Value::Object(bucket)
            })
            .collect()
    }
}

impl FieldBehavior for WithOptions {
    fn html_type(&self) -> &'static str {
        match self.style {
            OptionStyle::Radio => "radio",
            OptionStyle::Select | OptionStyle::Multiple => "select",
        }
    }

    fn template(&self) -> &'static str {
        match self.style {
            OptionStyle::Radio => "radio",
            OptionStyle::Select | OptionStyle::Multiple => "select",
        }
    }

    /// Multi-selects store a list: index-keyed maps (`tags[]=a&tags[]=b`)
    /// become arrays and a lone value becomes a one-item array.
    fn prepare(&self, _field: &str, value: Value) -> crate::Result<Value> {
        if self.style != OptionStyle::Multiple || is_absent(&value) || value.is_array() {
            return Ok(value);
        }
        if value.is_object() {
            return Ok(to_indexed(&value)
                .map(|rows| Value::Array(rows.into_values().collect()))
                .unwrap_or(value));
        }
        Ok(Value::Array(vec![value]))
    }

    // The field has already passed its required check on the submitted
    // value; membership is checked against the value with defaults, so a
    // default outside the option list fails here.
    fn check(
        &self,
        field: &Field,
        value: &Value,
        index: Option<usize>,
        ctx: &mut ValidationContext<'_>,
    ) -> bool {
        let valid = match (self.style, value) {
            (OptionStyle::Multiple, Value::Array(items)) => items
                .iter()
                .filter(|item| !is_absent(item))
                .all(|item| self.is_option(item)),
            (_, Value::Array(_) | Value::Object(_)) => false,
            (_, other) => self.is_option(other),
        };
        if valid {
            return true;
        }
        ctx.fail(
            field.name(),
            index,
            "option",
            &MessageTemplate::new(INVALID_OPTION_MESSAGE),
            Severity::Error,
        )
    }

    fn decorate(&self, _field: &Field, current: &Value, instruction: &mut RenderInstruction) {
        instruction.set("options", self.grouped(current));
        if self.style == OptionStyle::Multiple {
            instruction.set("multiple", true);
            let name = format!("{}[]", instruction.name());
            instruction.set("name", name);
        }
    }
}

pub fn options_factory(ty: FieldType) -> Box<dyn FieldBehavior> {
    let style = match ty {
        FieldType::Radio => OptionStyle::Radio,
        FieldType::MultiSelect => OptionStyle::Multiple,
        _ => OptionStyle::Select,
    };
    Box::new(WithOptions::new(style))
}
