//! Dispatch metric recording
//!
//! Recorded through the `metrics` facade; exported by the Prometheus
//! exporter installed in [`crate::init_with_config`].

use metrics::{counter, gauge};

/// Record one dispatch call and its resolved channel count.
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_event_dispatched;
///
/// let contexts = dispatcher.dispatch("config:user", data, None);
/// record_event_dispatched("config", contexts.len());
/// ```
pub fn record_event_dispatched(action: &str, channel_count: usize) {
    counter!("tracker_events_total", "action" => action.to_string()).increment(1);
    gauge!("tracker_last_channel_count").set(channel_count as f64);
}

/// Record one isolated channel failure.
pub fn record_channel_failure(channel: &str) {
    counter!("tracker_channel_failures_total", "channel" => channel.to_string()).increment(1);
}

/// Record the outcome of one context resolution walk.
///
/// `outcome` is one of `emitted`, `prevented`, `unresolved`.
pub fn record_resolution(outcome: &'static str) {
    counter!("tracker_resolutions_total", "outcome" => outcome).increment(1);
}

/// Record a binding attach.
pub fn record_binding_attached() {
    counter!("tracker_bindings_attached_total").increment(1);
}

/// Record a binding detach.
pub fn record_binding_detached() {
    counter!("tracker_bindings_detached_total").increment(1);
}
