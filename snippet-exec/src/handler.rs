//! Decoding of invocation events into execution requests.

use serde_json::Value;

use crate::{
    error::Error,
    types::{ExecutionRequest, NamingMode},
};

/// Decode an invocation event.
///
/// The derived-name variant also accepts the request wrapped in a `body`
/// field, either as a nested object or as a JSON-encoded string.
pub fn parse_event(event: Value, mode: NamingMode) -> Result<ExecutionRequest, Error> {
    let payload = match (mode, event) {
        (NamingMode::Derived, Value::Object(mut map)) => match map.remove("body") {
            Some(Value::String(body)) => serde_json::from_str(&body)?,
            Some(body) => body,
            None => Value::Object(map),
        },
        (_, event) => event,
    };

    Ok(serde_json::from_value(payload)?)
}

/// Decode raw request bytes, as received by an HTTP endpoint.
pub fn parse_event_bytes(bytes: &[u8], mode: NamingMode) -> Result<ExecutionRequest, Error> {
    let event: Value = serde_json::from_slice(bytes)?;
    parse_event(event, mode)
}
