//! DispatchContext - per-(channel, event) dispatch record
//!
//! Transient: created for one dispatch call, returned to the caller, never
//! persisted or mutated afterwards.

use serde::Serialize;
use serde_json::Value;

use crate::{ChannelName, Payload};

/// Outcome slot of one [`DispatchContext`]. Set exactly once during dispatch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub enum DispatchResult {
    /// No invocation took place: unknown channel, missing action, or the
    /// channel was disabled at dispatch time.
    #[default]
    Skipped,
    /// The action completed synchronously without a value.
    Done,
    /// The action completed synchronously with a value.
    Value(Value),
    /// The action's outcome was handed to the async runtime; failures, if
    /// any, reach the configured error handler, not this record.
    Pending,
}

impl DispatchResult {
    /// The synchronous value, if the action produced one.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }
}

/// Record of one (channel, event) dispatch.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchContext {
    /// Resolved action name (`track` for unprefixed keys).
    pub action: String,
    /// Event sub-key.
    pub key: String,
    /// Payload handed to the channel action.
    pub data: Payload,
    /// Target channel name.
    pub channel: ChannelName,
    /// Invocation outcome.
    pub result: DispatchResult,
}

impl DispatchContext {
    /// Create a context for a channel that has not been invoked yet.
    pub fn new(
        action: impl Into<String>,
        key: impl Into<String>,
        data: Payload,
        channel: ChannelName,
    ) -> Self {
        Self {
            action: action.into(),
            key: key.into(),
            data,
            channel,
            result: DispatchResult::Skipped,
        }
    }
}
