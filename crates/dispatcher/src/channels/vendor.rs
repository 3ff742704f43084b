//! VendorChannel - adapter forwarding events to an external analytics SDK

use std::sync::Arc;

use contracts::{
    ActionOutcome, Channel, Payload, TrackerError, VendorCall, VendorSdk, ACTION_BY,
    ACTION_CONFIG, ACTION_TRACK,
};
use serde_json::Value;

/// Channel that forwards `track`/`by` events and `config:user` identity
/// updates to a [`VendorSdk`]. Delivery is asynchronous: every forwarded
/// call settles in the background.
pub struct VendorChannel<S> {
    sdk: Arc<S>,
}

impl<S> VendorChannel<S> {
    /// Wrap a vendor SDK.
    pub fn new(sdk: S) -> Self {
        Self { sdk: Arc::new(sdk) }
    }

    /// Wrap an already-shared vendor SDK.
    pub fn from_shared(sdk: Arc<S>) -> Self {
        Self { sdk }
    }
}

impl<S> Channel for VendorChannel<S>
where
    S: VendorSdk + Send + Sync + 'static,
{
    fn supports(&self, action: &str) -> bool {
        matches!(action, ACTION_TRACK | ACTION_CONFIG | ACTION_BY)
    }

    fn perform(
        &self,
        action: &str,
        key: &str,
        data: &Payload,
    ) -> Result<ActionOutcome, TrackerError> {
        let call = match action {
            ACTION_TRACK | ACTION_BY => VendorCall::Track {
                key: key.to_string(),
                data: data.clone(),
            },
            ACTION_CONFIG => match key {
                "user" => VendorCall::Identify {
                    user_id: data.get("id").cloned().unwrap_or(Value::Null),
                },
                // Unrecognized config keys are ignored
                _ => return Ok(ActionOutcome::Done),
            },
            other => {
                return Err(TrackerError::action(
                    "vendor",
                    other,
                    "action not supported by vendor adapter",
                ))
            }
        };

        let sdk = Arc::clone(&self.sdk);
        Ok(ActionOutcome::pending(async move { sdk.deliver(call).await }))
    }
}

impl<S> std::fmt::Debug for VendorChannel<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VendorChannel").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::payload;
    use std::sync::Mutex;

    /// SDK double recording every delivered call.
    #[derive(Default)]
    struct RecordingSdk {
        calls: Mutex<Vec<VendorCall>>,
        fail: bool,
    }

    impl VendorSdk for RecordingSdk {
        async fn deliver(&self, call: VendorCall) -> Result<(), TrackerError> {
            if self.fail {
                return Err(TrackerError::vendor("delivery refused"));
            }
            self.calls.lock().unwrap().push(call);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_track_forwards_to_sdk() {
        let sdk = Arc::new(RecordingSdk::default());
        let channel = VendorChannel::from_shared(Arc::clone(&sdk));

        let outcome = channel
            .perform("track", "login", &payload!({ "id": 2 }))
            .unwrap();
        match outcome {
            ActionOutcome::Pending(pending) => pending.await.unwrap(),
            other => panic!("unexpected outcome: {other:?}"),
        }

        let calls = sdk.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0],
            VendorCall::Track {
                key: "login".to_string(),
                data: payload!({ "id": 2 }),
            }
        );
    }

    #[tokio::test]
    async fn test_config_user_maps_to_identify() {
        let sdk = Arc::new(RecordingSdk::default());
        let channel = VendorChannel::from_shared(Arc::clone(&sdk));

        match channel.perform("config", "user", &payload!({ "id": 2 })).unwrap() {
            ActionOutcome::Pending(pending) => pending.await.unwrap(),
            other => panic!("unexpected outcome: {other:?}"),
        }

        let calls = sdk.calls.lock().unwrap();
        assert_eq!(
            calls[0],
            VendorCall::Identify {
                user_id: serde_json::json!(2)
            }
        );
    }

    #[tokio::test]
    async fn test_unrecognized_config_key_is_ignored() {
        let sdk = Arc::new(RecordingSdk::default());
        let channel = VendorChannel::from_shared(Arc::clone(&sdk));

        let outcome = channel
            .perform("config", "theme", &payload!({ "dark": true }))
            .unwrap();
        assert!(matches!(outcome, ActionOutcome::Done));
        assert!(sdk.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_delivery_rejects_pending_outcome() {
        let channel = VendorChannel::new(RecordingSdk {
            fail: true,
            ..RecordingSdk::default()
        });

        match channel.perform("track", "login", &Payload::new()).unwrap() {
            ActionOutcome::Pending(pending) => {
                assert!(pending.await.is_err());
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
