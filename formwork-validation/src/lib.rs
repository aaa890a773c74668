//! Form declaration, validation and generation for Formwork
//!
//! Declare typed fields on a [`DataValidator`], populate and validate
//! them from submitted data, read back normalized values and render
//! instructions a view layer can bind.
//!
//! # Examples
//!
//! ## Validating a submission
//!
//! ```
//! use formwork_validation::{DataValidator, FieldType, InIntRange, input};
//! use serde_json::{json, Map};
//!
//! let mut form = DataValidator::new();
//! form.create_field("name", FieldType::Text, None, true, Map::new()).unwrap();
//! form.create_field("age", FieldType::PositiveInteger, None, false, Map::new())
//!     .unwrap()
//!     .add_filter(InIntRange::new(18, 130, true));
//!
//! let raw = input::parse_form_input(b"name=Ada&age=36").unwrap();
//! assert!(form.check(&raw).is_ok());
//! assert_eq!(form.get("age").unwrap(), json!(36));
//!
//! let raw = input::parse_form_input(b"name=Ada&age=12").unwrap();
//! let errors = form.check(&raw).unwrap_err();
//! assert_eq!(errors.errors[0].message, "age must be between 18 and 130");
//! ```
//!
//! ## Repeatable fields
//!
//! ```
//! use formwork_validation::{DataValidator, FieldType, Unique};
//! use serde_json::{json, Map};
//!
//! let mut form = DataValidator::new();
//! form.create_field("email", FieldType::Email, None, true, Map::new())
//!     .unwrap()
//!     .set_repeatable(true, Some(3))
//!     .add_filter(Unique::new());
//!
//! let raw = json!({"email": {"0": "a@example.com", "1": "a@example.com"}});
//! assert!(form.check(raw.as_object().unwrap()).is_err());
//!
//! // One instruction per row, named so the submission round-trips.
//! let row = form.generate("email", None).unwrap();
//! assert_eq!(row.name(), "email[0]");
//! assert_eq!(row.template, "forms/input");
//! ```
//!
//! ## Custom field types
//!
//! ```
//! use formwork_validation::{FieldBehavior, FieldType, FieldTypeRegistry, Hidden};
//!
//! fn honeypot(_: FieldType) -> Box<dyn FieldBehavior> {
//!     Box::new(Hidden)
//! }
//!
//! let mut registry = FieldTypeRegistry::with_builtins();
//! registry.register_class_for_type(FieldType::Custom("honeypot"), honeypot).unwrap();
//! assert!(registry.register_class_for_type(FieldType::Custom("honeypot"), honeypot).is_err());
//!
//! let field = registry
//!     .create_field("website", FieldType::Custom("honeypot"), None, false)
//!     .unwrap();
//! assert_eq!(field.html_type(), "hidden");
//! ```

mod errors;
mod field;
mod field_type;
mod filters;
mod traits;
mod validator;

pub mod config;
pub mod input;
pub mod logging;
pub mod value;

pub use config::FormsConfig;
pub use errors::*;
pub use field::*;
pub use field_type::*;
pub use filters::*;
pub use traits::*;
pub use validator::*;

/// The types most applications need.
pub mod prelude {
    pub use crate::{
        Callback, DataValidator, Field, FieldOption, FieldType, Filter, FormError, FormsConfig,
        InIntRange, IsOfType, LogDispatcher, LogicOr, MessageDispatcher, RegExp, RenderInstruction,
        Severity, Unique, ValidationError, ValidationErrors, ValueOptions, input,
    };
}
