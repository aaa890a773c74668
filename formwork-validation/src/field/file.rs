// File upload field

use super::{Field, FieldBehavior};
use crate::{FieldType, FormError, MessageTemplate, Result, Severity, ValidationContext};
use serde_json::Value;

/// Upload status reported alongside each submitted file.
///
/// The codes follow the multipart upload convention where `0` is
/// success and `4` means no file was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadError {
    Ok,
    IniSize,
    FormSize,
    Partial,
    NoFile,
    NoTmpDir,
    CantWrite,
    Extension,
    Unknown(i64),
}

impl UploadError {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Ok,
            1 => Self::IniSize,
            2 => Self::FormSize,
            3 => Self::Partial,
            4 => Self::NoFile,
            6 => Self::NoTmpDir,
            7 => Self::CantWrite,
            8 => Self::Extension,
            other => Self::Unknown(other),
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            Self::Ok => 0,
            Self::IniSize => 1,
            Self::FormSize => 2,
            Self::Partial => 3,
            Self::NoFile => 4,
            Self::NoTmpDir => 6,
            Self::CantWrite => 7,
            Self::Extension => 8,
            Self::Unknown(code) => *code,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            Self::Ok => "",
            Self::IniSize | Self::FormSize => "%s exceeds the maximum upload size",
            Self::Partial => "%s was only partially uploaded",
            Self::NoFile => "%s is required",
            Self::NoTmpDir | Self::CantWrite => "%s could not be stored",
            Self::Extension => "%s was rejected by the server",
            Self::Unknown(_) => "%s could not be uploaded",
        }
    }
}

fn error_code(value: &Value) -> Option<i64> {
    value.get("error").and_then(crate::value::as_i64)
}

/// Expects an upload descriptor object such as
/// `{"name": "a.png", "tmp_name": "...", "size": 10, "error": 0}`.
#[derive(Debug, Default)]
pub struct FileUpload;

impl FieldBehavior for FileUpload {
    fn html_type(&self) -> &'static str {
        "file"
    }

    fn prepare(&self, field: &str, value: Value) -> Result<Value> {
        if value.is_null() {
            return Ok(value);
        }
        if !value.is_object() {
            return Err(FormError::TypeMismatch {
                field: field.to_string(),
                reason: "file fields expect an upload descriptor".to_string(),
            });
        }
        match error_code(&value) {
            None => Err(FormError::TypeMismatch {
                field: field.to_string(),
                reason: "upload descriptor has no error indicator".to_string(),
            }),
            Some(code) if UploadError::from_code(code) == UploadError::NoFile => Ok(Value::Null),
            Some(_) => Ok(value),
        }
    }

    fn revert_to_default_if_not_populated(&self, _enabled: bool) -> bool {
        true
    }

    fn check(
        &self,
        field: &Field,
        value: &Value,
        index: Option<usize>,
        ctx: &mut ValidationContext<'_>,
    ) -> bool {
        let status = match error_code(value) {
            Some(code) => UploadError::from_code(code),
            None => UploadError::Unknown(-1),
        };
        if status == UploadError::Ok {
            return true;
        }
        tracing::debug!(field = %field.name(), code = status.code(), "upload rejected");
        ctx.fail(
            field.name(),
            index,
            "upload",
            &MessageTemplate::new(status.message()),
            Severity::Error,
        )
    }

    fn renders_value(&self) -> bool {
        false
    }
}

pub fn file_factory(_ty: FieldType) -> Box<dyn FieldBehavior> {
    Box::new(FileUpload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ValidationErrors;
    use serde_json::json;

    fn upload(error: i64) -> Value {
        json!({"name": "avatar.png", "tmp_name": "/tmp/php123", "size": 2048, "error": error})
    }

    #[test]
    fn test_no_file_stored_as_null() {
        let mut field = Field::create("avatar", FieldType::File, None, false).unwrap();
        field.set_value(upload(4)).unwrap();
        assert_eq!(field.get_value(false), Value::Null);
    }

    #[test]
    fn test_descriptor_without_error_rejected() {
        let mut field = Field::create("avatar", FieldType::File, None, false).unwrap();
        assert!(matches!(
            field.set_value(json!({"name": "a.png"})),
            Err(FormError::TypeMismatch { .. })
        ));
        assert!(matches!(
            field.set_value(json!("a.png")),
            Err(FormError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_error_codes() {
        let mut field = Field::create("avatar", FieldType::File, None, true).unwrap();
        field.set_value(upload(0)).unwrap();
        let mut errors = ValidationErrors::default();
        assert!(field.validate(&mut ValidationContext::new(&mut errors)));

        field.set_value(upload(3)).unwrap();
        assert!(!field.validate(&mut ValidationContext::new(&mut errors)));
        assert_eq!(errors.errors[0].message, "avatar was only partially uploaded");
    }

    #[test]
    fn test_missing_required_upload() {
        let mut field = Field::create("avatar", FieldType::File, None, true).unwrap();
        field.set_value(upload(4)).unwrap();
        let mut errors = ValidationErrors::default();
        assert!(!field.validate(&mut ValidationContext::new(&mut errors)));
        assert_eq!(errors.errors[0].constraint, "required");
    }

    #[test]
    fn test_never_renders_value() {
        let mut field = Field::create("avatar", FieldType::File, Some(upload(0)), false).unwrap();
        let instruction = field.generate(&[], None).unwrap();
        assert_eq!(instruction.get("value"), Some(&Value::Null));
        assert_eq!(instruction.get("type"), Some(&json!("file")));
    }

    #[test]
    fn test_code_round_trip() {
        assert_eq!(UploadError::from_code(7), UploadError::CantWrite);
        assert_eq!(UploadError::Unknown(42).code(), 42);
    }
}
