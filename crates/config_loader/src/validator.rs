//! Configuration validation
//!
//! Validation rules:
//! - key_sep non-empty
//! - channel names non-blank
//! - default_channels free of duplicates
//! - disabled name list free of duplicates

use std::collections::HashSet;

use contracts::{ChannelName, Disabled, TrackerError, TrackerOptions};

/// Validate a TrackerOptions overlay
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(options: &TrackerOptions) -> Result<(), TrackerError> {
    validate_key_sep(options)?;
    validate_default_channels(options)?;
    validate_disabled(options)?;
    Ok(())
}

fn validate_key_sep(options: &TrackerOptions) -> Result<(), TrackerError> {
    if let Some(key_sep) = &options.key_sep {
        if key_sep.is_empty() {
            return Err(TrackerError::config_validation(
                "key_sep",
                "separator must not be empty",
            ));
        }
    }
    Ok(())
}

fn validate_default_channels(options: &TrackerOptions) -> Result<(), TrackerError> {
    if let Some(channels) = &options.default_channels {
        validate_channel_names("default_channels", channels)?;
    }
    Ok(())
}

fn validate_disabled(options: &TrackerOptions) -> Result<(), TrackerError> {
    if let Some(Disabled::Channels(channels)) = &options.disabled {
        validate_channel_names("disabled", channels)?;
    }
    Ok(())
}

fn validate_channel_names(field: &str, channels: &[ChannelName]) -> Result<(), TrackerError> {
    let mut seen: HashSet<&str> = HashSet::new();
    for name in channels {
        if name.trim().is_empty() {
            return Err(TrackerError::config_validation(
                field,
                "channel name must not be blank",
            ));
        }
        if !seen.insert(name.as_str()) {
            return Err(TrackerError::config_validation(
                field,
                format!("duplicate channel name '{name}'"),
            ));
        }
    }
    Ok(())
}
