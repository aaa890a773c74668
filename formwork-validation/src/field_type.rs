//! Semantic field types and the registry binding them to field variants.

use crate::field::{self, Field, FieldBehavior};
use crate::{FormError, Result};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Semantic tag of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Text,
    Integer,
    PositiveInteger,
    Number,
    Email,
    CheckBox,
    Select,
    Radio,
    MultiSelect,
    File,
    Password,
    DateDate,
    DateTime,
    TextArea,
    Word,
    LowercaseWord,
    UppercaseWord,
    Hidden,
    /// Application-defined tag; rendered as text unless registered
    Custom(&'static str),
}

impl FieldType {
    /// Every built-in tag.
    pub const BUILTIN: [FieldType; 18] = [
        FieldType::Text,
        FieldType::Integer,
        FieldType::PositiveInteger,
        FieldType::Number,
        FieldType::Email,
        FieldType::CheckBox,
        FieldType::Select,
        FieldType::Radio,
        FieldType::MultiSelect,
        FieldType::File,
        FieldType::Password,
        FieldType::DateDate,
        FieldType::DateTime,
        FieldType::TextArea,
        FieldType::Word,
        FieldType::LowercaseWord,
        FieldType::UppercaseWord,
        FieldType::Hidden,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Integer => "integer",
            FieldType::PositiveInteger => "positive_integer",
            FieldType::Number => "number",
            FieldType::Email => "email",
            FieldType::CheckBox => "checkbox",
            FieldType::Select => "select",
            FieldType::Radio => "radio",
            FieldType::MultiSelect => "multi_select",
            FieldType::File => "file",
            FieldType::Password => "password",
            FieldType::DateDate => "date",
            FieldType::DateTime => "date_time",
            FieldType::TextArea => "textarea",
            FieldType::Word => "word",
            FieldType::LowercaseWord => "lowercase_word",
            FieldType::UppercaseWord => "uppercase_word",
            FieldType::Hidden => "hidden",
            FieldType::Custom(tag) => tag,
        }
    }

    /// Parse a built-in tag from its textual form.
    pub fn parse(tag: &str) -> Option<Self> {
        Self::BUILTIN
            .into_iter()
            .find(|ty| ty.as_str().eq_ignore_ascii_case(tag))
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FieldType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Builds the variant behaviour for a tag.
pub type FieldFactory = fn(FieldType) -> Box<dyn FieldBehavior>;

/// Binds field type tags to field variants.
///
/// A tag can be bound once; later attempts fail with
/// [`FormError::DuplicateRegistration`]. Unbound tags resolve to the
/// generic text variant.
#[derive(Clone, Default)]
pub struct FieldTypeRegistry {
    factories: HashMap<FieldType, FieldFactory>,
}

static GLOBAL: Lazy<RwLock<FieldTypeRegistry>> =
    Lazy::new(|| RwLock::new(FieldTypeRegistry::with_builtins()));

impl FieldTypeRegistry {
    /// Create a registry with no bindings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with every built-in tag bound
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for ty in FieldType::BUILTIN {
            registry.factories.insert(ty, builtin_factory(ty));
        }
        registry
    }

    /// The process-wide registry, created with the built-ins on first use.
    pub fn global() -> &'static RwLock<FieldTypeRegistry> {
        &GLOBAL
    }

    /// Bind `ty` to `factory`.
    pub fn register_class_for_type(&mut self, ty: FieldType, factory: FieldFactory) -> Result<()> {
        if self.factories.contains_key(&ty) {
            return Err(FormError::DuplicateRegistration(ty));
        }
        tracing::debug!(field_type = %ty, "registered field type");
        self.factories.insert(ty, factory);
        Ok(())
    }

    /// Factory bound to `ty`, or the generic text variant.
    pub fn resolve(&self, ty: FieldType) -> FieldFactory {
        self.factories
            .get(&ty)
            .copied()
            .unwrap_or(field::text_factory as FieldFactory)
    }

    pub fn is_registered(&self, ty: FieldType) -> bool {
        self.factories.contains_key(&ty)
    }

    /// Create a field of type `ty` through its bound variant.
    pub fn create_field(
        &self,
        name: impl Into<String>,
        ty: FieldType,
        default_value: Option<Value>,
        required: bool,
    ) -> Result<Field> {
        let behavior = self.resolve(ty)(ty);
        Field::from_behavior(name.into(), ty, default_value, required, behavior)
    }
}

impl fmt::Debug for FieldTypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldTypeRegistry")
            .field("types", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Bind `ty` in the process-wide registry.
pub fn register_class_for_type(ty: FieldType, factory: FieldFactory) -> Result<()> {
    FieldTypeRegistry::global()
        .write()
        .register_class_for_type(ty, factory)
}

fn builtin_factory(ty: FieldType) -> FieldFactory {
    match ty {
        FieldType::Integer | FieldType::PositiveInteger => field::integer_factory,
        FieldType::Number => field::number_factory,
        FieldType::Email => field::email_factory,
        FieldType::CheckBox => field::checkbox_factory,
        FieldType::Select | FieldType::Radio | FieldType::MultiSelect => field::options_factory,
        FieldType::File => field::file_factory,
        FieldType::Password => field::password_factory,
        FieldType::DateDate | FieldType::DateTime => field::date_factory,
        FieldType::TextArea => field::textarea_factory,
        FieldType::Word | FieldType::LowercaseWord | FieldType::UppercaseWord => {
            field::word_factory
        }
        FieldType::Hidden => field::hidden_factory,
        FieldType::Text | FieldType::Custom(_) => field::text_factory,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = FieldTypeRegistry::new();
        registry
            .register_class_for_type(FieldType::Custom("slug"), field::word_factory)
            .unwrap();

        let result = registry.register_class_for_type(FieldType::Custom("slug"), field::text_factory);
        assert!(matches!(
            result,
            Err(FormError::DuplicateRegistration(FieldType::Custom("slug")))
        ));
    }

    #[test]
    fn test_builtins_cannot_be_rebound() {
        let mut registry = FieldTypeRegistry::with_builtins();
        assert!(registry
            .register_class_for_type(FieldType::Email, field::text_factory)
            .is_err());
    }

    #[test]
    fn test_unregistered_resolves_to_text() {
        let registry = FieldTypeRegistry::with_builtins();
        let field = registry
            .create_field("color", FieldType::Custom("color"), None, false)
            .unwrap();
        assert_eq!(field.field_type(), FieldType::Custom("color"));
        assert_eq!(field.html_type(), "text");
    }

    #[test]
    fn test_parse_round_trip() {
        for ty in FieldType::BUILTIN {
            assert_eq!(FieldType::parse(ty.as_str()), Some(ty));
        }
        assert_eq!(FieldType::parse("DATE_TIME"), Some(FieldType::DateTime));
        assert_eq!(FieldType::parse("unknown"), None);
    }

    #[test]
    fn test_global_registry_has_builtins() {
        let registry = FieldTypeRegistry::global().read();
        assert!(registry.is_registered(FieldType::MultiSelect));
        assert!(!registry.is_registered(FieldType::Custom("never_registered")));
    }
}
