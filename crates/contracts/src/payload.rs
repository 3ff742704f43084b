//! Event payload type.

use serde_json::{Map, Value};

/// Free-form event payload: a JSON object of named fields.
///
/// Payloads are merged field-by-field during context resolution, so the
/// top level is always an object; individual field values are arbitrary JSON.
pub type Payload = Map<String, Value>;

/// Build a [`Payload`] with `serde_json::json!` object syntax.
///
/// # Examples
/// ```
/// use contracts::payload;
///
/// let data = payload!({ "id": 2, "source": "menu" });
/// assert_eq!(data.len(), 2);
/// ```
#[macro_export]
macro_rules! payload {
    ({ $($body:tt)* }) => {{
        match ::serde_json::json!({ $($body)* }) {
            ::serde_json::Value::Object(map) => map,
            _ => unreachable!("json! with object syntax always yields an object"),
        }
    }};
}
