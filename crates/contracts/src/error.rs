//! Layered error definitions
//!
//! Categorized by source: config / channel / vendor. Dispatch itself never
//! surfaces errors to callers; failures travel to the configured error
//! handler wrapped in [`DispatchFailure`].

use thiserror::Error;

use crate::DispatchContext;

/// Unified error type
#[derive(Debug, Error)]
pub enum TrackerError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Channel Errors =====
    /// Channel action failure
    #[error("channel '{channel}' action '{action}' failed: {message}")]
    Action {
        channel: String,
        action: String,
        message: String,
    },

    /// Vendor SDK delivery failure
    #[error("vendor delivery failed: {message}")]
    Vendor { message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl TrackerError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create channel action error
    pub fn action(
        channel: impl Into<String>,
        action: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Action {
            channel: channel.into(),
            action: action.into(),
            message: message.into(),
        }
    }

    /// Create vendor delivery error
    pub fn vendor(message: impl Into<String>) -> Self {
        Self::Vendor {
            message: message.into(),
        }
    }
}

/// A channel failure with the originating dispatch context attached.
///
/// This is the only shape in which action failures become observable: both
/// a synchronous `Err` from [`crate::Channel::perform`] and a rejected
/// pending outcome arrive at the error handler as a `DispatchFailure`.
#[derive(Debug)]
pub struct DispatchFailure {
    /// The underlying failure.
    pub error: TrackerError,
    /// The dispatch that triggered it: action, key, data, channel.
    pub context: DispatchContext,
}

impl std::fmt::Display for DispatchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "channel '{}' failed during '{}:{}': {}",
            self.context.channel, self.context.action, self.context.key, self.error
        )
    }
}

impl std::error::Error for DispatchFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
