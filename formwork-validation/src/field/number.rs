// Numeric field variants

use super::{Field, FieldBehavior, RenderInstruction};
use crate::value::{as_f64, as_i64};
use crate::{FieldType, MessageTemplate, Result, Severity, ValidationContext};
use serde_json::{Number as JsonNumber, Value};

/// Whole numbers; `PositiveInteger` additionally requires `> 0`.
#[derive(Debug)]
pub struct Integer {
    positive_only: bool,
}

impl Integer {
    pub fn new(positive_only: bool) -> Self {
        Self { positive_only }
    }

    pub fn is_positive_only(&self) -> bool {
        self.positive_only
    }
}

impl FieldBehavior for Integer {
    fn html_type(&self) -> &'static str {
        "number"
    }

    /// Integer-like strings are stored as JSON integers; anything else is
    /// kept as submitted so validation can reject it.
    fn prepare(&self, _field: &str, value: Value) -> Result<Value> {
        if !value.is_string() {
            return Ok(value);
        }
        Ok(as_i64(&value).map(Value::from).unwrap_or(value))
    }

    fn check(
        &self,
        field: &Field,
        value: &Value,
        index: Option<usize>,
        ctx: &mut ValidationContext<'_>,
    ) -> bool {
        match as_i64(value) {
            None => ctx.fail(
                field.name(),
                index,
                "integer",
                &MessageTemplate::new("%s must be an integer"),
                Severity::Error,
            ),
            Some(n) if self.positive_only && n <= 0 => ctx.fail(
                field.name(),
                index,
                "positive_integer",
                &MessageTemplate::new("%s must be a positive integer"),
                Severity::Error,
            ),
            Some(_) => true,
        }
    }

    fn decorate(&self, _field: &Field, _current: &Value, instruction: &mut RenderInstruction) {
        let positive_only = self.positive_only;
        instruction.update_extras(|extras| {
            extras.entry("step").or_insert(Value::from(1));
            if positive_only {
                extras.entry("min").or_insert(Value::from(1));
            }
        });
    }
}

pub fn integer_factory(ty: FieldType) -> Box<dyn FieldBehavior> {
    Box::new(Integer::new(ty == FieldType::PositiveInteger))
}

/// Any finite number.
#[derive(Debug, Default)]
pub struct Number;

impl FieldBehavior for Number {
    fn html_type(&self) -> &'static str {
        "number"
    }

    fn prepare(&self, _field: &str, value: Value) -> Result<Value> {
        if !value.is_string() {
            return Ok(value);
        }
        if let Some(n) = as_i64(&value) {
            return Ok(Value::from(n));
        }
        Ok(as_f64(&value)
            .and_then(JsonNumber::from_f64)
            .map(Value::Number)
            .unwrap_or(value))
    }

    fn check(
        &self,
        field: &Field,
        value: &Value,
        index: Option<usize>,
        ctx: &mut ValidationContext<'_>,
    ) -> bool {
        if as_f64(value).is_some() {
            return true;
        }
        ctx.fail(
            field.name(),
            index,
            "number",
            &MessageTemplate::new("%s must be a number"),
            Severity::Error,
        )
    }

    fn decorate(&self, _field: &Field, _current: &Value, instruction: &mut RenderInstruction) {
        instruction.update_extras(|extras| {
            extras.entry("step").or_insert(Value::from("any"));
        });
    }
}

pub fn number_factory(_ty: FieldType) -> Box<dyn FieldBehavior> {
    Box::new(Number)
}
