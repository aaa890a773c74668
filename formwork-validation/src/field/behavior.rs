// Variant behaviour of a field

use super::{Field, RenderInstruction};
use crate::{Result, ValidationContext};
use serde_json::Value;
use std::any::Any;
use std::fmt;

/// Upcast to `Any` for typed access to a variant.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// What distinguishes one field type from another.
///
/// Every hook has a text-input default, so a variant only overrides the
/// parts it changes.
pub trait FieldBehavior: AsAny + fmt::Debug + Send + Sync + 'static {
    /// HTML `type` attribute
    fn html_type(&self) -> &'static str {
        "text"
    }

    /// Template reference, relative to the configured prefix
    fn template(&self) -> &'static str {
        "input"
    }

    /// Normalize or reject a single raw value before it is stored.
    fn prepare(&self, _field: &str, value: Value) -> Result<Value> {
        Ok(value)
    }

    /// Whether an absent submission counts as an empty one.
    fn revert_to_default_if_not_populated(&self, _enabled: bool) -> bool {
        false
    }

    /// Type-level check of one present value. Emits its own diagnostic.
    fn check(
        &self,
        _field: &Field,
        _value: &Value,
        _index: Option<usize>,
        _ctx: &mut ValidationContext<'_>,
    ) -> bool {
        true
    }

    /// Whether the current value may be put into the render context
    fn renders_value(&self) -> bool {
        true
    }

    /// Adjust the instruction after the common keys are set. `current`
    /// is the value at the render cursor, defaults included.
    fn decorate(&self, _field: &Field, _current: &Value, _instruction: &mut RenderInstruction) {}
}
