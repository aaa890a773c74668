// Checkbox field variant

use super::{Field, FieldBehavior, RenderInstruction};
use crate::value::{as_text, is_truthy};
use crate::{FieldType, MessageTemplate, Severity, ValidationContext};
use serde_json::Value;

const CHECKED_MARKERS: [&str; 5] = ["1", "on", "yes", "true", "checked"];

/// A browser omits unchecked boxes from the submission entirely, so an
/// absent checkbox is read as unchecked rather than missing.
#[derive(Debug, Default)]
pub struct CheckBox;

impl FieldBehavior for CheckBox {
    fn html_type(&self) -> &'static str {
        "checkbox"
    }

    fn template(&self) -> &'static str {
        "checkbox"
    }

    fn revert_to_default_if_not_populated(&self, enabled: bool) -> bool {
        enabled
    }

    fn check(
        &self,
        field: &Field,
        value: &Value,
        index: Option<usize>,
        ctx: &mut ValidationContext<'_>,
    ) -> bool {
        let accepted = match value {
            Value::Bool(_) => true,
            other => as_text(other).is_some_and(|text| {
                text == "0"
                    || CHECKED_MARKERS
                        .iter()
                        .any(|marker| text.eq_ignore_ascii_case(marker))
            }),
        };
        if accepted {
            return true;
        }
        ctx.fail(
            field.name(),
            index,
            "checkbox",
            &MessageTemplate::new("%s has an invalid state"),
            Severity::Error,
        )
    }

    fn decorate(&self, _field: &Field, current: &Value, instruction: &mut RenderInstruction) {
        instruction.set("value", 1);
        if is_truthy(current) {
            instruction.update_extras(|extras| {
                extras.insert("checked".to_string(), Value::Bool(true));
            });
        }
    }
}

pub fn checkbox_factory(_ty: FieldType) -> Box<dyn FieldBehavior> {
    Box::new(CheckBox)
}
