//! Configuration parsing
//!
//! Supports TOML (primary) and JSON (optional) formats.

use contracts::{TrackerError, TrackerOptions};

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML format (recommended)
    Toml,
    /// JSON format
    Json,
}

impl ConfigFormat {
    /// Infer the format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse TOML configuration
pub fn parse_toml(content: &str) -> Result<TrackerOptions, TrackerError> {
    toml::from_str(content).map_err(|e| TrackerError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse JSON configuration
pub fn parse_json(content: &str) -> Result<TrackerOptions, TrackerError> {
    serde_json::from_str(content).map_err(|e| TrackerError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse configuration in the given format
pub fn parse(content: &str, format: ConfigFormat) -> Result<TrackerOptions, TrackerError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Disabled;

    #[test]
    fn test_parse_toml_full() {
        let content = r#"
debug = true
disabled = ["gio"]
default_channels = ["console", "gio"]
key_sep = ":"
fallback_emit = false
"#;
        let result = parse_toml(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let options = result.unwrap();
        assert_eq!(options.debug, Some(true));
        assert_eq!(options.disabled, Some(Disabled::Channels(vec!["gio".into()])));
        assert_eq!(
            options.default_channels,
            Some(vec!["console".into(), "gio".into()])
        );
    }

    #[test]
    fn test_parse_toml_partial() {
        let options = parse_toml("debug = true").unwrap();
        assert_eq!(options.debug, Some(true));
        assert_eq!(options.key_sep, None);
        assert_eq!(options.default_channels, None);
    }

    #[test]
    fn test_parse_toml_disabled_flag() {
        let options = parse_toml("disabled = true").unwrap();
        assert_eq!(options.disabled, Some(Disabled::All(true)));
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "debug": false,
            "default_channels": ["console"],
            "key_sep": "/"
        }"#;
        let result = parse_json(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let options = result.unwrap();
        assert_eq!(options.key_sep.as_deref(), Some("/"));
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let content = "invalid toml [[[";
        let result = parse_toml(content);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, TrackerError::ConfigParse { .. }));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("toml"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("TOML"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("json"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
