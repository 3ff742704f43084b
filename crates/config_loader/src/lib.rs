//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate configuration legality
//! - Produce a `TrackerOptions` overlay for the dispatcher configuration
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let options = ConfigLoader::load_from_path(Path::new("tracker.toml")).unwrap();
//! println!("debug: {:?}", options.debug);
//! ```

mod parser;
mod validator;

pub use contracts::TrackerOptions;
pub use parser::ConfigFormat;

use contracts::TrackerError;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<TrackerOptions, TrackerError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<TrackerOptions, TrackerError> {
        Self::parse_and_validate(content, format)
    }

    /// Serialize TrackerOptions to TOML string
    pub fn to_toml(options: &TrackerOptions) -> Result<String, TrackerError> {
        toml::to_string_pretty(options)
            .map_err(|e| TrackerError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize TrackerOptions to JSON string
    pub fn to_json(options: &TrackerOptions) -> Result<String, TrackerError> {
        serde_json::to_string_pretty(options)
            .map_err(|e| TrackerError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, TrackerError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            TrackerError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            TrackerError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, TrackerError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Parse and validate configuration content
    fn parse_and_validate(
        content: &str,
        format: ConfigFormat,
    ) -> Result<TrackerOptions, TrackerError> {
        let options = parser::parse(content, format)?;
        validator::validate(&options)?;
        Ok(options)
    }
}
