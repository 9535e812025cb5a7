//! Access to fields inside the hub's `{"data": {...}}` response envelope.
//!
//! Every lookup yields an explicit `Option`: a missing envelope, a `data`
//! value that is not an object, and a missing field all come back as `None`.

use serde_json::Value;

/// Look up `data.<field>` in a decoded response body.
pub fn data_field<'a>(body: &'a Value, field: &str) -> Option<&'a Value> {
    body.get("data")?.as_object()?.get(field)
}

/// `data.<field>` as a non-empty string.
pub fn data_str<'a>(body: &'a Value, field: &str) -> Option<&'a str> {
    data_field(body, field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Move `data.<field>` out of the body if it is an array.
pub fn into_data_list(mut body: Value, field: &str) -> Option<Vec<Value>> {
    let slot = body.get_mut("data")?.as_object_mut()?.get_mut(field)?;
    match slot.take() {
        Value::Array(items) => Some(items),
        _ => None,
    }
}

/// Top-level `message` the hub attaches to most responses.
pub fn message(body: &Value) -> Option<&str> {
    body.get("message").and_then(Value::as_str)
}
