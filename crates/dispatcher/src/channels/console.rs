//! ConsoleChannel - mirrors events to structured tracing logs

use contracts::{
    ActionOutcome, Channel, Payload, TrackerError, ACTION_BY, ACTION_CONFIG, ACTION_TRACK,
};
use tracing::debug;

/// Channel that logs every event for debugging.
///
/// This is the channel the dispatcher mirrors to in debug mode; it is also
/// the default target when no channel list is configured.
#[derive(Debug, Default)]
pub struct ConsoleChannel;

impl ConsoleChannel {
    /// Create a new ConsoleChannel.
    pub fn new() -> Self {
        Self
    }
}

impl Channel for ConsoleChannel {
    fn supports(&self, action: &str) -> bool {
        matches!(action, ACTION_TRACK | ACTION_CONFIG | ACTION_BY)
    }

    fn perform(
        &self,
        action: &str,
        key: &str,
        data: &Payload,
    ) -> Result<ActionOutcome, TrackerError> {
        // Resolution-finalized events log as plain track events
        let label = match action {
            ACTION_BY => ACTION_TRACK,
            other => other,
        };
        debug!(
            action = label,
            key,
            data = %serde_json::Value::Object(data.clone()),
            "event mirrored"
        );
        Ok(ActionOutcome::Done)
    }
}
