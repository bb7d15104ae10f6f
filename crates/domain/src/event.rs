//! Decoding untyped event payloads into per-aggregate tagged unions.

use events::{DomainEvent, Payload};
use serde::de::DeserializeOwned;

use crate::PayloadError;

/// The fixed set of event kinds one aggregate type emits.
///
/// Implementors map `(event_type, data)` pairs onto strongly typed variants.
/// Event types outside the set decode to `Ok(None)`: a stream may carry
/// events meant for other consumers.
pub trait TypedEvent: Sized {
    /// Type tag of the aggregate (and of the read models built from it).
    const AGGREGATE_TYPE: &'static str;

    /// Decodes a payload for the given event type.
    fn decode(event_type: &str, data: &Payload) -> Result<Option<Self>, PayloadError>;

    /// Returns the event type name of this variant.
    fn event_type(&self) -> &'static str;

    /// Decodes a delivered domain event.
    fn from_event(event: &dyn DomainEvent) -> Result<Option<Self>, PayloadError> {
        Self::decode(event.event_type(), event.data())
    }
}

/// Deserializes a payload map into a schema struct.
pub(crate) fn decode_payload<T: DeserializeOwned>(
    event_type: &str,
    data: &Payload,
) -> Result<T, PayloadError> {
    serde_json::from_value(serde_json::Value::Object(data.clone())).map_err(|source| {
        PayloadError::Malformed {
            event_type: event_type.to_string(),
            source,
        }
    })
}

/// Tags a validation failure with the event type it came from.
pub(crate) fn invalid(event_type: &str) -> impl FnOnce(crate::ValueObjectError) -> PayloadError {
    let event_type = event_type.to_string();
    move |source| PayloadError::InvalidValue { event_type, source }
}
