//! The per-request form object.
//!
//! A [`DataValidator`] owns the declared fields in declaration order,
//! populates them from raw input, validates them and renders them. One
//! instance serves one request:
//!
//! ```
//! use formwork_validation::{DataValidator, FieldType, RegExp, ValidationErrors};
//! use serde_json::{json, Map};
//!
//! let mut form = DataValidator::new();
//! form.create_field("email", FieldType::Email, None, true, Map::new()).unwrap();
//! form.create_field("nick", FieldType::Text, Some(json!("anon")), false, Map::new())
//!     .unwrap()
//!     .add_filter(RegExp::length_between(2, 16).unwrap());
//!
//! let raw = json!({"email": "ada@example.com"});
//! let mut errors = ValidationErrors::default();
//! assert!(form.validate(raw.as_object().unwrap(), false, &mut errors));
//! assert_eq!(form.get("nick").unwrap(), json!("anon"));
//! ```

use crate::config::FormsConfig;
use crate::field::{Field, RenderInstruction};
use crate::{
    FieldType, FormError, MessageDispatcher, MessageTemplate, Result, Severity, Translator,
    Untranslated, ValidationContext, ValidationErrors,
};
use indexmap::IndexMap;
use indexmap::map::Entry;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

const INVALID_SHAPE_MESSAGE: &str = "%s has an invalid format";

/// How extracted values are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueOptions {
    /// Fall back to the declared default when nothing was submitted
    pub return_default: bool,
    /// Turn whitespace-only strings into `null`
    pub blank_as_null: bool,
}

impl Default for ValueOptions {
    fn default() -> Self {
        Self {
            return_default: true,
            blank_as_null: false,
        }
    }
}

impl ValueOptions {
    pub fn with_default(mut self, return_default: bool) -> Self {
        self.return_default = return_default;
        self
    }

    pub fn blank_as_null(mut self, blank_as_null: bool) -> Self {
        self.blank_as_null = blank_as_null;
        self
    }

    fn apply(&self, value: Value) -> Value {
        if self.blank_as_null {
            blank_to_null(value)
        } else {
            value
        }
    }
}

fn blank_to_null(value: Value) -> Value {
    match value {
        Value::String(s) if s.trim().is_empty() => Value::Null,
        Value::Array(items) => Value::Array(items.into_iter().map(blank_to_null).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, blank_to_null(value)))
                .collect(),
        ),
        other => other,
    }
}

/// Declared fields plus the generation-group stack.
pub struct DataValidator {
    fields: IndexMap<String, Field>,
    generation_groups: Vec<String>,
    config: FormsConfig,
    translator: Arc<dyn Translator>,
}

impl DataValidator {
    pub fn new() -> Self {
        Self::with_config(FormsConfig::default())
    }

    pub fn with_config(config: FormsConfig) -> Self {
        Self {
            fields: IndexMap::new(),
            generation_groups: Vec::new(),
            config,
            translator: Arc::new(Untranslated),
        }
    }

    /// Translate messages (and the `" or "` separator) with `translator`.
    pub fn with_translator<T: Translator + 'static>(mut self, translator: T) -> Self {
        self.translator = Arc::new(translator);
        self
    }

    pub fn config(&self) -> &FormsConfig {
        &self.config
    }

    /// Add a field built elsewhere, e.g. from an isolated registry.
    pub fn add_field(&mut self, field: Field) -> Result<&mut Field> {
        match self.fields.entry(field.name().to_string()) {
            Entry::Occupied(entry) => Err(FormError::DuplicateFieldName(entry.key().clone())),
            Entry::Vacant(entry) => Ok(entry.insert(field)),
        }
    }

    /// Create a field through the global registry and add it. Date fields
    /// take their pattern from the configuration.
    pub fn create_field(
        &mut self,
        name: impl Into<String>,
        field_type: FieldType,
        default_value: Option<Value>,
        required: bool,
        extras: Map<String, Value>,
    ) -> Result<&mut Field> {
        let mut field = Field::create(name, field_type, default_value, required)?;
        for (key, value) in extras {
            field.add_extra(key, value);
        }
        match field_type {
            FieldType::DateDate => {
                field.set_pattern(self.config.date_pattern.clone())?;
            }
            FieldType::DateTime => {
                field.set_pattern(self.config.datetime_pattern.clone())?;
            }
            _ => {}
        }
        self.add_field(field)
    }

    pub fn field(&self, name: &str) -> Result<&Field> {
        self.fields
            .get(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))
    }

    pub fn field_mut(&mut self, name: &str) -> Result<&mut Field> {
        self.fields
            .get_mut(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Field names in declaration order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.values()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Populate every field from `raw` and validate them in declaration
    /// order, stopping at the first failure.
    ///
    /// With `silent` set no diagnostic reaches `dispatcher`; the result
    /// is the same either way.
    pub fn validate(
        &mut self,
        raw: &Map<String, Value>,
        silent: bool,
        dispatcher: &mut dyn MessageDispatcher,
    ) -> bool {
        let malformed = self.populate(raw);

        let translator: &dyn Translator = self.translator.as_ref();
        let mut ctx = ValidationContext::new(dispatcher)
            .silent(silent)
            .with_translator(translator);

        for field in self.fields.values() {
            if field.is_enabled() && malformed.contains(field.name()) {
                return ctx.fail(
                    field.name(),
                    None,
                    "type",
                    &MessageTemplate::new(INVALID_SHAPE_MESSAGE),
                    Severity::Error,
                );
            }
            if !field.validate(&mut ctx) {
                return false;
            }
        }

        tracing::debug!(fields = self.fields.len(), "form data validated");
        true
    }

    /// Validate and collect the diagnostic of the first failure.
    pub fn check(&mut self, raw: &Map<String, Value>) -> std::result::Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if self.validate(raw, false, &mut errors) {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Returns the names of fields whose submitted value had the wrong
    /// shape.
    fn populate(&mut self, raw: &Map<String, Value>) -> HashSet<String> {
        let mut malformed = HashSet::new();

        for (name, field) in self.fields.iter_mut() {
            field.clear_value();

            match raw.get(name) {
                Some(value) => {
                    if let Err(e) = field.set_value(value.clone()) {
                        tracing::warn!(field = %name, error = %e, "submitted value rejected");
                        field.revert_to_empty();
                        malformed.insert(name.clone());
                    }
                }
                None if field.revert_to_default_if_not_populated() => {
                    tracing::debug!(field = %name, "absent field populated as empty");
                    field.revert_to_empty();
                }
                None => {}
            }
        }

        malformed
    }

    /// Options honouring the configured blank handling
    pub fn value_options(&self) -> ValueOptions {
        ValueOptions::default().blank_as_null(self.config.blank_as_null)
    }

    pub fn get_field_value(&self, name: &str, options: ValueOptions) -> Result<Value> {
        let field = self.field(name)?;
        Ok(options.apply(field.get_value(options.return_default)))
    }

    pub fn get_indexed_field_value(&self, name: &str, index: usize, options: ValueOptions) -> Result<Value> {
        let field = self.field(name)?;
        Ok(options.apply(field.get_indexed_value(index, options.return_default)))
    }

    /// Every field's value, in declaration order.
    pub fn get_field_values(&self, options: ValueOptions) -> IndexMap<String, Value> {
        self.fields
            .iter()
            .map(|(name, field)| (name.clone(), options.apply(field.get_value(options.return_default))))
            .collect()
    }

    /// Every field's value at one repeat index, in declaration order.
    pub fn get_indexed_field_values(&self, index: usize, options: ValueOptions) -> IndexMap<String, Value> {
        self.fields
            .iter()
            .map(|(name, field)| {
                let value = field.get_indexed_value(index, options.return_default);
                (name.clone(), options.apply(value))
            })
            .collect()
    }

    /// Map-style read, with defaults and the configured blank handling.
    pub fn get(&self, name: &str) -> Result<Value> {
        self.get_field_value(name, self.value_options())
    }

    /// Values are only written by [`DataValidator::validate`].
    pub fn set(&mut self, _name: &str, _value: Value) -> Result<()> {
        Err(FormError::FieldValuesImmutable)
    }

    /// Render the next instruction of `name` inside the current
    /// generation groups.
    pub fn generate(&mut self, name: &str, type_override: Option<&str>) -> Result<RenderInstruction> {
        let field = self
            .fields
            .get_mut(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?;
        let mut instruction = field.generate(&self.generation_groups, type_override)?;
        instruction.template = format!("{}{}", self.config.template_prefix, instruction.template);
        Ok(instruction)
    }

    pub fn push_generation_group(&mut self, group: impl Into<String>) -> &mut Self {
        self.generation_groups.push(group.into());
        self
    }

    pub fn pop_generation_group(&mut self) -> Option<String> {
        self.generation_groups.pop()
    }

    pub fn generation_groups(&self) -> &[String] {
        &self.generation_groups
    }

    /// Rewind every field's render cursor
    pub fn reset_repeat_counters(&mut self) {
        for field in self.fields.values_mut() {
            field.reset_repeat_counter();
        }
    }
}

impl Default for DataValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DataValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataValidator")
            .field("fields", &self.fields)
            .field("generation_groups", &self.generation_groups)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
