//! Event envelope: the parsed unit of work handed from the queue to dispatch.

use serde_json::Value;

/// One domain event as published by a backend service.
///
/// The wire shape is `{ "event": string, "payload": any, "rooms": [string]? }`.
/// An envelope exists only for the duration of one dispatch; it is never
/// persisted or retried by this core.
#[derive(Clone, Debug)]
pub struct Envelope {
    /// Event type name, e.g. `"restaurant.created"`.
    pub event_type: String,
    /// Event payload, forwarded to subscribers untouched.
    pub payload: Value,
    /// Explicit target rooms. When present and non-empty these are
    /// authoritative and bypass policy resolution entirely.
    pub rooms: Option<Vec<String>>,
}

impl Envelope {
    /// Interprets a parsed JSON value as a typed domain event.
    ///
    /// Returns `None` when the value is not an object or carries no string
    /// `"event"` field; the caller treats that as the degraded
    /// generic-broadcast case, not an error. A missing payload becomes
    /// `Value::Null`, a malformed `rooms` field is ignored, and non-string
    /// room entries are dropped.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let event_type = object.get("event")?.as_str()?.to_string();
        let payload = object.get("payload").cloned().unwrap_or(Value::Null);
        let rooms = object.get("rooms").and_then(Value::as_array).map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        });

        Some(Self {
            event_type,
            payload,
            rooms,
        })
    }
}
