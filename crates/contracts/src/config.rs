//! Tracker configuration
//!
//! Constructed once at application start and threaded to the dispatcher and
//! resolver via [`SharedConfig`]; read on every dispatch, mutable any time.

use std::fmt;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::{ChannelName, DispatchFailure, CONSOLE_CHANNEL};

/// Handler receiving every isolated channel failure.
pub type ErrorHandler = Arc<dyn Fn(&DispatchFailure) + Send + Sync>;

/// Channel suppression: everything, nothing, or a name list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Disabled {
    /// Suppress all channels (`true`) or none (`false`).
    All(bool),
    /// Suppress only the named channels.
    Channels(Vec<ChannelName>),
}

impl Disabled {
    /// Whether the named channel is currently suppressed.
    pub fn is_disabled(&self, channel: &str) -> bool {
        match self {
            Self::All(all) => *all,
            Self::Channels(names) => names.iter().any(|n| n == channel),
        }
    }
}

impl Default for Disabled {
    fn default() -> Self {
        Self::All(false)
    }
}

/// Tracker runtime configuration.
#[derive(Clone)]
pub struct TrackerConfig {
    /// Global disable behavior
    pub disabled: Disabled,
    /// Whether to turn on debug mode (diagnostics + console mirroring)
    pub debug: bool,
    /// Error handling function
    pub error_handler: ErrorHandler,
    /// Default dispatch channels
    pub default_channels: Vec<ChannelName>,
    /// Event key separator
    pub key_sep: String,
    /// Emit anyway when no context source finalizes a bubbled event
    pub fallback_emit: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            disabled: Disabled::default(),
            debug: false,
            error_handler: Arc::new(|failure| {
                tracing::error!(error = %failure, "channel failure");
            }),
            default_channels: vec![CONSOLE_CHANNEL.into()],
            key_sep: ":".to_string(),
            fallback_emit: false,
        }
    }
}

impl TrackerConfig {
    /// Overlay a partial options set onto this configuration.
    pub fn apply(&mut self, options: TrackerOptions) {
        let TrackerOptions {
            disabled,
            debug,
            default_channels,
            key_sep,
            fallback_emit,
        } = options;
        if let Some(disabled) = disabled {
            self.disabled = disabled;
        }
        if let Some(debug) = debug {
            self.debug = debug;
        }
        if let Some(default_channels) = default_channels {
            self.default_channels = default_channels;
        }
        if let Some(key_sep) = key_sep {
            self.key_sep = key_sep;
        }
        if let Some(fallback_emit) = fallback_emit {
            self.fallback_emit = fallback_emit;
        }
    }
}

impl fmt::Debug for TrackerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackerConfig")
            .field("disabled", &self.disabled)
            .field("debug", &self.debug)
            .field("default_channels", &self.default_channels)
            .field("key_sep", &self.key_sep)
            .field("fallback_emit", &self.fallback_emit)
            .finish_non_exhaustive()
    }
}

/// Partial configuration overlay, the serde-facing subset of
/// [`TrackerConfig`] (the error handler is set programmatically).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<Disabled>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_channels: Option<Vec<ChannelName>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_sep: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_emit: Option<bool>,
}

/// Clone-handle to a shared, mutable [`TrackerConfig`].
///
/// Dispatch reads a fresh snapshot per call, so host mutations take effect
/// on the next event.
#[derive(Clone, Default)]
pub struct SharedConfig {
    inner: Arc<RwLock<TrackerConfig>>,
}

impl SharedConfig {
    /// Wrap a configuration.
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Clone the current configuration.
    pub fn snapshot(&self) -> TrackerConfig {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Mutate the configuration in place.
    pub fn update(&self, f: impl FnOnce(&mut TrackerConfig)) {
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard);
    }

    /// Overlay a partial options set.
    pub fn apply(&self, options: TrackerOptions) {
        self.update(|config| config.apply(options));
    }
}

impl fmt::Debug for SharedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedConfig").field(&self.snapshot()).finish()
    }
}
