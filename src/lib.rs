// Formwork - typed form declaration, validation and generation
//
// This library re-exports the engine crate and offers a prelude for
// request handlers.

// Re-export the engine
pub use formwork_validation::*;

pub use formwork_validation as validation;

/// Prelude for common imports.
///
/// ```
/// use formwork::prelude::*;
/// use serde_json::Map;
///
/// let mut form = DataValidator::new();
/// form.create_field("q", FieldType::Text, None, true, Map::new()).unwrap();
/// assert!(form.check(&Map::new()).is_err());
/// ```
pub mod prelude {
    pub use formwork_validation::prelude::*;
    pub use formwork_validation::{
        FieldTypeRegistry, NullDispatcher, Path, RowCounter, Translator, WordCase, config, logging,
    };
}
