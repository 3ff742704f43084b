//! PipeChannel - in-memory channel returning the event instead of delivering it

use contracts::{
    ActionOutcome, Channel, Payload, TrackerError, ACTION_BY, ACTION_CONFIG, ACTION_TRACK,
};
use serde_json::json;

/// Channel whose actions synchronously return a `{type, key, data}` record.
///
/// Performs no I/O. Context resolution routes through this channel when the
/// caller wants the resolved payload itself rather than delivery.
#[derive(Debug, Default)]
pub struct PipeChannel;

impl PipeChannel {
    /// Create a new PipeChannel.
    pub fn new() -> Self {
        Self
    }
}

impl Channel for PipeChannel {
    fn supports(&self, action: &str) -> bool {
        matches!(action, ACTION_TRACK | ACTION_CONFIG | ACTION_BY)
    }

    fn perform(
        &self,
        action: &str,
        key: &str,
        data: &Payload,
    ) -> Result<ActionOutcome, TrackerError> {
        // Resolution-finalized events surface as plain track events
        let label = match action {
            ACTION_BY => ACTION_TRACK,
            other => other,
        };
        Ok(ActionOutcome::Value(json!({
            "type": label,
            "key": key,
            "data": data,
        })))
    }
}
