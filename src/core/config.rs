//! Logger and handler configuration
//!
//! Both structs deserialize with per-field defaults, so a configuration
//! document only needs to name what it changes.
//!
//! ```
//! use context_logger::{Level, LoggerConfig, OutputFormat};
//!
//! let config = LoggerConfig::from_json(r#"{"min_level":"WARN","format":"json"}"#).unwrap();
//! assert_eq!(config.min_level, Level::Warn);
//! assert_eq!(config.format, OutputFormat::Json);
//! assert_eq!(config.handler.path_separator, ".");
//! ```

use super::error::{LoggerError, Result};
use super::level::Level;
use super::timestamp::TimestampFormat;
use serde::{Deserialize, Serialize};

/// Key renderers write the level under
pub const LEVEL_KEY: &str = "level";

/// Key renderers write the message under
pub const MESSAGE_KEY: &str = "msg";

/// Field names and path settings of a record handler
///
/// An empty key disables the corresponding synthesized field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandlerConfig {
    /// Key of the timestamp group
    pub time_key: String,
    /// Key of the call-site location group
    pub source_key: String,
    /// Key of the logger path
    pub path_key: String,
    /// Separator placed before every non-empty path segment
    pub path_separator: String,
    /// Format of the `time` entry inside the timestamp group
    pub timestamp_format: TimestampFormat,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            time_key: "t".to_string(),
            source_key: "src".to_string(),
            path_key: "mod".to_string(),
            path_separator: ".".to_string(),
            timestamp_format: TimestampFormat::default(),
        }
    }
}

impl HandlerConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_time_key(mut self, key: impl Into<String>) -> Self {
        self.time_key = key.into();
        self
    }

    #[must_use]
    pub fn with_source_key(mut self, key: impl Into<String>) -> Self {
        self.source_key = key.into();
        self
    }

    #[must_use]
    pub fn with_path_key(mut self, key: impl Into<String>) -> Self {
        self.path_key = key.into();
        self
    }

    #[must_use]
    pub fn with_path_separator(mut self, separator: impl Into<String>) -> Self {
        self.path_separator = separator.into();
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Keys user attributes can never occupy
    pub fn reserved_keys(&self) -> impl Iterator<Item = &str> {
        [
            LEVEL_KEY,
            MESSAGE_KEY,
            self.time_key.as_str(),
            self.source_key.as_str(),
            self.path_key.as_str(),
        ]
        .into_iter()
        .filter(|k| !k.is_empty())
    }

    /// Reject configurations whose synthesized keys collide or whose
    /// timestamp format cannot be rendered
    pub fn validate(&self) -> Result<()> {
        self.timestamp_format.validate()?;
        let keys: Vec<&str> = self.reserved_keys().collect();
        for (idx, key) in keys.iter().enumerate() {
            if keys[..idx].contains(key) {
                return Err(LoggerError::config(
                    "HandlerConfig",
                    format!("key '{}' is used more than once", key),
                ));
            }
        }
        Ok(())
    }
}

/// Line encoding used by [`LoggerConfig`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `key=value` text lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Complete configuration of a root logger
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub min_level: Level,
    pub format: OutputFormat,
    pub handler: HandlerConfig,
}

impl LoggerConfig {
    /// Parse and validate a JSON configuration document
    pub fn from_json(text: &str) -> Result<Self> {
        let config: LoggerConfig = serde_json::from_str(text)?;
        config.handler.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HandlerConfig::default();
        assert_eq!(config.time_key, "t");
        assert_eq!(config.source_key, "src");
        assert_eq!(config.path_key, "mod");
        assert_eq!(config.path_separator, ".");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = HandlerConfig::new()
            .with_time_key("ts")
            .with_source_key("")
            .with_path_key("path")
            .with_path_separator("::");

        let reserved: Vec<&str> = config.reserved_keys().collect();
        assert_eq!(reserved, vec!["level", "msg", "ts", "path"]);
    }

    #[test]
    fn test_colliding_keys_rejected() {
        let config = HandlerConfig::new().with_time_key("msg");
        assert!(matches!(
            config.validate(),
            Err(LoggerError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_invalid_timestamp_format_rejected() {
        let config = HandlerConfig::new().with_timestamp_format(TimestampFormat::Custom("%Q".into()));
        assert!(config.validate().is_err());

        let doc = r#"{"handler":{"timestamp_format":{"Custom":"%Q"}}}"#;
        assert!(matches!(
            LoggerConfig::from_json(doc),
            Err(LoggerError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_partial_document() {
        let config =
            LoggerConfig::from_json(r#"{"min_level":"nonsense","handler":{"path_key":"module"}}"#)
                .unwrap();
        assert_eq!(config.min_level, Level::Info);
        assert_eq!(config.format, OutputFormat::Text);
        assert_eq!(config.handler.path_key, "module");
        assert_eq!(config.handler.time_key, "t");
    }

    #[test]
    fn test_invalid_document() {
        assert!(matches!(
            LoggerConfig::from_json("{not json"),
            Err(LoggerError::JsonError(_))
        ));
    }
}
