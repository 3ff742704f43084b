//! # Contracts
//!
//! Frozen interface contracts, defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are
//! prohibited.
//!
//! ## Event Model
//! - An event key is `<action><sep><sub-key>`; a key without the separator
//!   carries the canonical `track` action
//! - A channel is a named set of actions invoked as `(sub-key, payload)`
//! - Every dispatch produces one [`DispatchContext`] per targeted channel

mod channel;
mod channel_name;
mod config;
mod context;
mod error;
mod payload;
mod vendor;

pub use channel::*;
pub use channel_name::ChannelName;
pub use config::*;
pub use context::*;
pub use error::*;
pub use payload::Payload;
pub use vendor::{VendorCall, VendorSdk};
