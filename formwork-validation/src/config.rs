// Form engine configuration

use crate::field::{DEFAULT_DATE_PATTERN, DEFAULT_DATETIME_PATTERN};
use crate::{FormError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Prefix of the environment variables read by [`FormsConfig::from_env`]
pub const ENV_PREFIX: &str = "FORMWORK_";

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Toml,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            _ => None,
        }
    }
}

/// Settings applied by a [`DataValidator`](crate::DataValidator).
///
/// ```toml
/// template_prefix = "admin/forms/"
/// date_pattern = "%d.%m.%Y"
/// datetime_pattern = "%d.%m.%Y %H:%M"
/// blank_as_null = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormsConfig {
    /// Prepended to every template reference
    pub template_prefix: String,
    /// `chrono` pattern for new date fields
    pub date_pattern: String,
    /// `chrono` pattern for new date-time fields
    pub datetime_pattern: String,
    /// Default for [`ValueOptions::blank_as_null`](crate::ValueOptions)
    pub blank_as_null: bool,
}

impl Default for FormsConfig {
    fn default() -> Self {
        Self {
            template_prefix: "forms/".to_string(),
            date_pattern: DEFAULT_DATE_PATTERN.to_string(),
            datetime_pattern: DEFAULT_DATETIME_PATTERN.to_string(),
            blank_as_null: false,
        }
    }
}

impl FormsConfig {
    /// Load from a TOML or JSON file, chosen by extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| FormError::Config(format!("No file extension found: {}", path.display())))?;
        let format = FileFormat::from_extension(ext)
            .ok_or_else(|| FormError::Config(format!("Unsupported format: {}", ext)))?;

        let content = fs::read_to_string(path)?;
        let config = Self::parse(format, &content)?;
        tracing::debug!(path = %path.display(), "loaded forms configuration");
        Ok(config)
    }

    /// Parse configuration from a string
    pub fn parse(format: FileFormat, content: &str) -> Result<Self> {
        match format {
            FileFormat::Json => serde_json::from_str(content)
                .map_err(|e| FormError::Config(format!("JSON parse error: {}", e))),
            FileFormat::Toml => toml::from_str(content)
                .map_err(|e| FormError::Config(format!("TOML parse error: {}", e))),
        }
    }

    /// Apply `FORMWORK_*` variables from `vars`; other keys are ignored.
    pub fn with_overrides<I, K, V>(mut self, vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (key, value) in vars {
            let Some(name) = key.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let value: String = value.into();
            match name {
                "TEMPLATE_PREFIX" => self.template_prefix = value,
                "DATE_PATTERN" => self.date_pattern = value,
                "DATETIME_PATTERN" => self.datetime_pattern = value,
                "BLANK_AS_NULL" => self.blank_as_null = parse_flag(name, &value)?,
                _ => {}
            }
        }
        Ok(self)
    }

    /// Defaults overridden by the environment, after loading `.env` if
    /// one exists.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::default().with_overrides(std::env::vars())
    }

    /// File settings (or defaults) overridden by the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        base.with_overrides(std::env::vars())
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(FormError::Config(format!(
            "{}{} must be a boolean, got {:?}",
            ENV_PREFIX, name, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = FormsConfig::default();
        assert_eq!(config.template_prefix, "forms/");
        assert_eq!(config.date_pattern, "%Y-%m-%d");
        assert!(!config.blank_as_null);
    }

    #[test]
    fn test_parse_toml_partial() {
        let config = FormsConfig::parse(FileFormat::Toml, r#"template_prefix = "admin/""#).unwrap();
        assert_eq!(config.template_prefix, "admin/");
        assert_eq!(config.datetime_pattern, DEFAULT_DATETIME_PATTERN);
    }

    #[test]
    fn test_parse_json() {
        let config = FormsConfig::parse(FileFormat::Json, r#"{"blank_as_null": true}"#).unwrap();
        assert!(config.blank_as_null);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "date_pattern = \"%d.%m.%Y\"").unwrap();

        let config = FormsConfig::from_file(file.path()).unwrap();
        assert_eq!(config.date_pattern, "%d.%m.%Y");
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        assert!(matches!(FormsConfig::from_file(file.path()), Err(FormError::Config(_))));
    }

    #[test]
    fn test_overrides() {
        let config = FormsConfig::default()
            .with_overrides([
                ("FORMWORK_TEMPLATE_PREFIX", "shop/"),
                ("FORMWORK_BLANK_AS_NULL", "yes"),
                ("OTHER_TEMPLATE_PREFIX", "ignored/"),
                ("FORMWORK_LOG_LEVEL", "debug"),
            ])
            .unwrap();
        assert_eq!(config.template_prefix, "shop/");
        assert!(config.blank_as_null);
    }

    #[test]
    fn test_bad_flag() {
        let result = FormsConfig::default().with_overrides([("FORMWORK_BLANK_AS_NULL", "sometimes")]);
        assert!(matches!(result, Err(FormError::Config(_))));
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(FileFormat::from_extension("JSON"), Some(FileFormat::Json));
        assert_eq!(FileFormat::from_extension("toml"), Some(FileFormat::Toml));
        assert_eq!(FileFormat::from_extension("env"), None);
    }
}
