//! # Dispatcher
//!
//! Event dispatch module.
//!
//! Responsibilities:
//! - Resolve an event key to an action name and sub-key
//! - Fan-out to the targeted channels
//! - Isolate per-channel failures, never failing the caller

pub mod channels;
pub mod dispatcher;
pub mod metrics;
pub mod registry;
mod settle;

pub use contracts::{ActionMap, Channel, DispatchContext, DispatchResult};
pub use channels::{ConsoleChannel, PipeChannel, VendorChannel};
pub use dispatcher::{split_event_key, Dispatcher, DispatcherBuilder};
pub use metrics::{DispatchMetrics, MetricsSnapshot};
pub use registry::ChannelRegistry;
