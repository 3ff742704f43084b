//! VendorSdk trait - external analytics SDK interface
//!
//! Defines the abstract interface a vendor adapter channel forwards to.

use serde::Serialize;
use serde_json::Value;

use crate::{Payload, TrackerError};

/// One call forwarded to a vendor analytics SDK.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum VendorCall {
    /// Deliver a named event with its payload.
    Track { key: String, data: Payload },
    /// Identify the current user to the vendor.
    Identify { user_id: Value },
}

/// External analytics SDK transport.
///
/// All vendor adapters forward through this trait; delivery is asynchronous
/// and failures surface as rejected pending outcomes.
#[trait_variant::make(VendorSdk: Send)]
pub trait LocalVendorSdk {
    /// Deliver one call to the vendor.
    ///
    /// # Errors
    /// Returns the transport failure (should include context)
    async fn deliver(&self, call: VendorCall) -> Result<(), TrackerError>;
}
