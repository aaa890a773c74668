//! Declared form fields.
//!
//! A [`Field`] keeps the declaration (type, default, required flag,
//! repeatability), the value populated from raw input, the attached
//! filters and the render cursor. Type-specific behaviour lives in a
//! [`FieldBehavior`] chosen once, when the registry creates the field.

mod behavior;
mod checkbox;
mod date;
mod file;
mod number;
mod options;
mod render;
mod text;

pub use behavior::{AsAny, FieldBehavior};
pub use checkbox::{CheckBox, checkbox_factory};
pub use date::{
    DEFAULT_DATE_PATTERN, DEFAULT_DATETIME_PATTERN, DateField, date_factory, pattern_hint,
};
pub use file::{FileUpload, UploadError, file_factory};
pub use number::{Integer, Number, integer_factory, number_factory};
pub use options::{FieldOption, OptionStyle, WithOptions, options_factory};
pub use render::{RenderCursor, RenderInstruction, wire_name};
pub use text::{
    Email, Hidden, Password, Text, TextArea, Word, email_factory, hidden_factory,
    password_factory, text_factory, textarea_factory, word_factory,
};

use crate::filters::Filter;
use crate::value::{FieldValue, IndexedValues, indexed_to_json, is_absent, to_indexed};
use crate::{FieldType, FormError, MessageTemplate, Result, Severity, ValidationContext};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

const REQUIRED_MESSAGE: &str = "%s is required";
const REQUIRED_AT_INDEX_MESSAGE: &str = "%s is required at position %d";

/// One named, typed input.
pub struct Field {
    name: String,
    field_type: FieldType,
    required: bool,
    default_value: Option<Value>,
    value: Option<FieldValue>,
    repeatable: bool,
    repeatable_up_to: Option<usize>,
    read_only: bool,
    enabled: bool,
    generate_with_value: bool,
    suffix: Option<String>,
    extras: Map<String, Value>,
    filters: Vec<Arc<dyn Filter>>,
    repeat_counter: RenderCursor,
    behavior: Box<dyn FieldBehavior>,
}

impl Field {
    /// Create a field through the process-wide type registry.
    pub fn create(
        name: impl Into<String>,
        field_type: FieldType,
        default_value: Option<Value>,
        required: bool,
    ) -> Result<Self> {
        crate::FieldTypeRegistry::global()
            .read()
            .create_field(name, field_type, default_value, required)
    }

    pub(crate) fn from_behavior(
        name: String,
        field_type: FieldType,
        default_value: Option<Value>,
        required: bool,
        behavior: Box<dyn FieldBehavior>,
    ) -> Result<Self> {
        if name.is_empty() {
            return Err(FormError::InvalidFieldName(name));
        }

        Ok(Self {
            name,
            field_type,
            required,
            default_value,
            value: None,
            repeatable: false,
            repeatable_up_to: None,
            read_only: false,
            enabled: true,
            generate_with_value: true,
            suffix: None,
            extras: Map::new(),
            filters: Vec::new(),
            repeat_counter: RenderCursor::default(),
            behavior,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn set_required(&mut self, required: bool) -> &mut Self {
        self.required = required;
        self
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }

    pub fn set_default_value(&mut self, default_value: Option<Value>) -> &mut Self {
        self.default_value = default_value;
        self
    }

    pub fn is_repeatable(&self) -> bool {
        self.repeatable
    }

    pub fn repeatable_up_to(&self) -> Option<usize> {
        self.repeatable_up_to
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn generates_with_value(&self) -> bool {
        self.generate_with_value
    }

    pub fn suffix(&self) -> Option<&str> {
        self.suffix.as_deref()
    }

    pub fn extras(&self) -> &Map<String, Value> {
        &self.extras
    }

    pub fn filters(&self) -> &[Arc<dyn Filter>] {
        &self.filters
    }

    pub fn repeat_counter(&self) -> RenderCursor {
        self.repeat_counter
    }

    /// HTML input type the variant renders by default
    pub fn html_type(&self) -> &'static str {
        self.behavior.html_type()
    }

    pub fn is_populated(&self) -> bool {
        self.value.is_some()
    }

    /// The populated state, without defaults
    pub fn populated_value(&self) -> Option<&FieldValue> {
        self.value.as_ref()
    }

    /// Store a raw value.
    ///
    /// Repeatable fields take a map with integer-like keys (or an array);
    /// indices at or beyond the repeat cap are dropped.
    pub fn set_value(&mut self, value: Value) -> Result<()> {
        if !self.repeatable {
            let value = self.behavior.prepare(&self.name, value)?;
            self.value = Some(FieldValue::Single(value));
            return Ok(());
        }

        let indexed = to_indexed(&value).ok_or_else(|| FormError::TypeMismatch {
            field: self.name.clone(),
            reason: "repeatable fields expect a map of index to value".to_string(),
        })?;

        let mut values = IndexedValues::new();
        for (index, raw) in indexed {
            if self.repeatable_up_to.is_some_and(|limit| index >= limit) {
                tracing::debug!(field = %self.name, index, "dropping value beyond repeat limit");
                continue;
            }
            values.insert(index, self.behavior.prepare(&self.name, raw)?);
        }
        self.value = Some(FieldValue::Indexed(values));
        Ok(())
    }

    /// Forget the populated value
    pub fn clear_value(&mut self) {
        self.value = None;
    }

    /// Populate with "nothing submitted": an empty map or null.
    pub(crate) fn revert_to_empty(&mut self) {
        self.value = Some(if self.repeatable {
            FieldValue::Indexed(IndexedValues::new())
        } else {
            FieldValue::Single(Value::Null)
        });
    }

    /// Populated value, else the default when `return_default`, else null.
    pub fn get_value(&self, return_default: bool) -> Value {
        match &self.value {
            Some(FieldValue::Single(value)) if !value.is_null() => value.clone(),
            Some(FieldValue::Indexed(values)) if !values.is_empty() => indexed_to_json(values),
            _ if return_default => self.default_value.clone().unwrap_or(Value::Null),
            _ => Value::Null,
        }
    }

    /// Value at a repeat index. Non-repeatable fields ignore the index.
    pub fn get_indexed_value(&self, index: usize, return_default: bool) -> Value {
        if !self.repeatable {
            return self.get_value(return_default);
        }

        if let Some(value) = self
            .value
            .as_ref()
            .and_then(FieldValue::as_indexed)
            .and_then(|values| values.get(&index))
        {
            return value.clone();
        }

        if !return_default {
            return Value::Null;
        }

        match &self.default_value {
            Some(default) => match to_indexed(default) {
                Some(defaults) if default.is_array() || default.is_object() => {
                    defaults.get(&index).cloned().unwrap_or(Value::Null)
                }
                _ => default.clone(),
            },
            None => Value::Null,
        }
    }

    /// Highest repeat index present, or -1.
    pub fn get_max_repeat_index(&self) -> i64 {
        if !self.repeatable {
            return -1;
        }

        if let Some(values) = self.value.as_ref().and_then(FieldValue::as_indexed) {
            if let Some(max) = values.keys().next_back() {
                return i64::try_from(*max).unwrap_or(i64::MAX);
            }
        }

        match &self.default_value {
            None | Some(Value::Null) => -1,
            Some(default @ (Value::Array(_) | Value::Object(_))) => to_indexed(default)
                .and_then(|defaults| {
                    defaults
                        .keys()
                        .next_back()
                        .map(|max| i64::try_from(*max).unwrap_or(i64::MAX))
                })
                .unwrap_or(-1),
            Some(_) => 0,
        }
    }

    /// Attach a filter, returning the handle [`Field::remove_filter`] takes.
    pub fn add_filter<F: Filter + 'static>(&mut self, filter: F) -> Arc<dyn Filter> {
        let filter: Arc<dyn Filter> = Arc::new(filter);
        self.filters.push(Arc::clone(&filter));
        filter
    }

    pub fn add_shared_filter(&mut self, filter: Arc<dyn Filter>) -> &mut Self {
        self.filters.push(filter);
        self
    }

    /// Builder form of [`Field::add_filter`]
    pub fn with_filter<F: Filter + 'static>(mut self, filter: F) -> Self {
        self.add_filter(filter);
        self
    }

    /// Detach a filter by identity.
    pub fn remove_filter(&mut self, filter: &Arc<dyn Filter>) -> bool {
        let before = self.filters.len();
        self.filters.retain(|attached| !Arc::ptr_eq(attached, filter));
        self.filters.len() != before
    }

    pub fn set_repeatable(&mut self, repeatable: bool, up_to: Option<usize>) -> &mut Self {
        self.repeatable = repeatable;
        self.repeatable_up_to = if repeatable { up_to } else { None };
        self
    }

    pub fn reset_repeat_counter(&mut self) -> &mut Self {
        self.repeat_counter = RenderCursor::default();
        self
    }

    pub fn set_read_only(&mut self, read_only: bool) -> &mut Self {
        self.read_only = read_only;
        self
    }

    pub fn set_enabled(&mut self, enabled: bool) -> &mut Self {
        self.enabled = enabled;
        self
    }

    pub fn set_generation_with_value(&mut self, generate_with_value: bool) -> &mut Self {
        self.generate_with_value = generate_with_value;
        self
    }

    /// Unit shown after the input (`kg`, `%`)
    pub fn set_suffix(&mut self, suffix: impl Into<String>) -> &mut Self {
        self.suffix = Some(suffix.into());
        self
    }

    pub fn add_extra(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.extras.insert(key.into(), value.into());
        self
    }

    /// Typed access to the variant behaviour.
    pub fn behavior<T: FieldBehavior>(&self) -> Option<&T> {
        (*self.behavior).as_any().downcast_ref::<T>()
    }

    pub fn behavior_mut<T: FieldBehavior>(&mut self) -> Option<&mut T> {
        (*self.behavior).as_any_mut().downcast_mut::<T>()
    }

    /// Replace the options of a select, radio or multi-select field.
    pub fn set_options(&mut self, options: Vec<FieldOption>) -> Result<&mut Self> {
        let field_type = self.field_type;
        self.behavior_mut::<WithOptions>()
            .ok_or(FormError::UnsupportedOperation {
                operation: "set_options",
                field_type,
            })?
            .set_options(options);
        Ok(self)
    }

    /// Replace the `chrono` pattern of a date or date-time field.
    pub fn set_pattern(&mut self, pattern: impl Into<String>) -> Result<&mut Self> {
        let field_type = self.field_type;
        self.behavior_mut::<DateField>()
            .ok_or(FormError::UnsupportedOperation {
                operation: "set_pattern",
                field_type,
            })?
            .set_pattern(pattern);
        Ok(self)
    }

    /// Whether an absent submission populates the field as empty.
    pub fn revert_to_default_if_not_populated(&self) -> bool {
        self.behavior.revert_to_default_if_not_populated(self.enabled)
    }

    /// Run the validation state machine.
    pub fn validate(&self, ctx: &mut ValidationContext<'_>) -> bool {
        if !self.enabled {
            return true;
        }

        let valid = if self.repeatable {
            self.validate_repeatable(ctx)
        } else {
            self.validate_single(ctx)
        };

        if !valid {
            tracing::debug!(field = %self.name, field_type = %self.field_type, "field failed validation");
        }
        valid
    }

    fn validate_single(&self, ctx: &mut ValidationContext<'_>) -> bool {
        // Required-ness looks at what was submitted, never at the default.
        if self.required && is_absent(&self.get_value(false)) {
            return self.fail_required(None, ctx);
        }

        if !self.run_field_filters(ctx) {
            return false;
        }

        let value = self.get_value(true);
        self.validate_value(&value, None, ctx)
    }

    fn validate_repeatable(&self, ctx: &mut ValidationContext<'_>) -> bool {
        let max_index = self.get_max_repeat_index();
        let populated = self.value.as_ref().and_then(FieldValue::as_indexed);

        if self.required && (max_index < 0 || populated.is_none()) {
            return self.fail_required(None, ctx);
        }

        if !self.run_field_filters(ctx) {
            return false;
        }

        let Ok(last) = usize::try_from(max_index) else {
            return true;
        };

        for index in self.rows_to_validate(populated, last) {
            if let Some(raw) = populated.and_then(|values| values.get(&index)) {
                if self.required && is_absent(raw) {
                    return self.fail_required(Some(index), ctx);
                }
            }

            let value = self.get_indexed_value(index, true);
            if !self.validate_value(&value, Some(index), ctx) {
                return false;
            }
        }

        true
    }

    /// Indices up to `last` that hold a populated or indexed default
    /// value, plus the first index that holds neither. Every index
    /// without its own value resolves to the same fallback, so that
    /// fallback is checked once, at the first such index.
    fn rows_to_validate(&self, populated: Option<&IndexedValues>, last: usize) -> BTreeSet<usize> {
        let mut rows: BTreeSet<usize> = populated
            .into_iter()
            .flat_map(|values| values.keys().copied())
            .collect();
        if let Some(default @ (Value::Array(_) | Value::Object(_))) = &self.default_value {
            if let Some(defaults) = to_indexed(default) {
                rows.extend(defaults.keys().copied());
            }
        }
        rows.retain(|index| *index <= last);

        if let Some(gap) = (0..=last).find(|index| !rows.contains(index)) {
            rows.insert(gap);
        }
        rows
    }

    fn run_field_filters(&self, ctx: &mut ValidationContext<'_>) -> bool {
        let whole = self.get_value(true);
        self.filters
            .iter()
            .filter(|filter| filter.applies_to_field())
            .all(|filter| filter.validate(&self.name, &whole, None, ctx))
    }

    fn validate_value(&self, value: &Value, index: Option<usize>, ctx: &mut ValidationContext<'_>) -> bool {
        let absent = is_absent(value);

        if !absent && !self.behavior.check(self, value, index, ctx) {
            return false;
        }

        for filter in self.filters.iter().filter(|filter| !filter.applies_to_field()) {
            if absent && !self.required && filter.may_be_skipped(index) {
                continue;
            }
            if !filter.validate(&self.name, value, index, ctx) {
                return false;
            }
        }

        true
    }

    fn fail_required(&self, index: Option<usize>, ctx: &mut ValidationContext<'_>) -> bool {
        let template = match index {
            Some(index) => MessageTemplate::new(REQUIRED_AT_INDEX_MESSAGE).bind(index),
            None => MessageTemplate::new(REQUIRED_MESSAGE),
        };
        ctx.fail(&self.name, index, "required", &template, Severity::Error)
    }

    /// Produce the render instruction at `cursor` without touching the
    /// field, returning the cursor for the next row.
    pub fn render(
        &self,
        groups: &[String],
        type_override: Option<&str>,
        cursor: RenderCursor,
    ) -> Result<(RenderInstruction, RenderCursor)> {
        let position = cursor.position();

        if self.repeatable {
            if let Some(limit) = self.repeatable_up_to {
                if position + 1 > limit {
                    return Err(FormError::RepeatLimitExceeded {
                        field: self.name.clone(),
                        limit,
                    });
                }
            }
        }

        let mut name = wire_name(groups, &self.name);
        if self.repeatable {
            name.push_str(&format!("[{position}]"));
        }

        let current = if self.repeatable {
            self.get_indexed_value(position, true)
        } else {
            self.get_value(true)
        };
        let value = if self.generate_with_value && self.behavior.renders_value() {
            current.clone()
        } else {
            Value::Null
        };

        let mut instruction = RenderInstruction::new(self.behavior.template());
        instruction.set("type", self.behavior.html_type());
        instruction.set("name", name);
        instruction.set("required", self.required);
        instruction.set("readonly", self.read_only);
        instruction.set("disabled", !self.enabled);
        instruction.set("value", value);
        instruction.set("repeatable", self.repeatable);
        instruction.set("repeat_counter", position);
        instruction.set("suffix", self.suffix.clone());
        instruction.set("extras", Value::Object(self.extras.clone()));

        self.behavior.decorate(self, &current, &mut instruction);

        if let Some(html_type) = type_override {
            instruction.set("type", html_type);
        }

        Ok((instruction, cursor.advance()))
    }

    /// Render at the stored cursor and advance it.
    pub fn generate(&mut self, groups: &[String], type_override: Option<&str>) -> Result<RenderInstruction> {
        let (instruction, next) = self.render(groups, type_override, self.repeat_counter)?;
        self.repeat_counter = next;
        Ok(instruction)
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("field_type", &self.field_type)
            .field("required", &self.required)
            .field("default_value", &self.default_value)
            .field("value", &self.value)
            .field("repeatable", &self.repeatable)
            .field("repeatable_up_to", &self.repeatable_up_to)
            .field("enabled", &self.enabled)
            .field("filters", &self.filters)
            .field("behavior", &self.behavior)
            .finish()
    }
}
