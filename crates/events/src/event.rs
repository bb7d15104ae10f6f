use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AggregateId, EventError, Result};

/// Untyped event data: field name to JSON value.
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// Unique identifier for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Creates a new random event ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an event ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for EventId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// An immutable fact about an aggregate, as delivered by the event bus.
///
/// This is the only thing a projection sees of an event. Delivery is
/// at-least-once and in append order per aggregate.
pub trait DomainEvent: Send + Sync {
    /// The aggregate the event belongs to.
    fn aggregate_id(&self) -> &AggregateId;

    /// The event type (e.g., "OrderCreated").
    fn event_type(&self) -> &str;

    /// The untyped event payload.
    fn data(&self) -> &Payload;

    /// When the event happened on the write side.
    fn occurred_at(&self) -> DateTime<Utc>;
}

/// An event envelope containing an event along with its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique identifier for this event.
    pub event_id: EventId,

    /// The type of the event (e.g., "OrderCreated", "UserUpdated").
    pub event_type: String,

    /// The aggregate this event belongs to.
    pub aggregate_id: AggregateId,

    /// When the event was created.
    pub timestamp: DateTime<Utc>,

    /// The event payload.
    #[serde(default)]
    pub payload: Payload,

    /// Additional metadata about the event.
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl EventEnvelope {
    /// Creates a new event envelope builder.
    pub fn builder() -> EventEnvelopeBuilder {
        EventEnvelopeBuilder::default()
    }
}

impl DomainEvent for EventEnvelope {
    fn aggregate_id(&self) -> &AggregateId {
        &self.aggregate_id
    }

    fn event_type(&self) -> &str {
        &self.event_type
    }

    fn data(&self) -> &Payload {
        &self.payload
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Builder for constructing event envelopes.
#[derive(Debug, Default)]
pub struct EventEnvelopeBuilder {
    event_id: Option<EventId>,
    event_type: Option<String>,
    aggregate_id: Option<AggregateId>,
    timestamp: Option<DateTime<Utc>>,
    payload: Payload,
    metadata: HashMap<String, serde_json::Value>,
}

impl EventEnvelopeBuilder {
    /// Sets the event ID. If not set, a new ID will be generated.
    pub fn event_id(mut self, id: EventId) -> Self {
        self.event_id = Some(id);
        self
    }

    /// Sets the event type.
    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    /// Sets the aggregate ID.
    pub fn aggregate_id(mut self, id: impl Into<AggregateId>) -> Self {
        self.aggregate_id = Some(id.into());
        self
    }

    /// Sets the timestamp. If not set, the current time will be used.
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Sets the payload from a serializable value.
    ///
    /// Fails unless the value serializes to a JSON object.
    pub fn payload<T: Serialize>(mut self, payload: &T) -> Result<Self> {
        match serde_json::to_value(payload)? {
            serde_json::Value::Object(map) => {
                self.payload = map;
                Ok(self)
            }
            other => Err(EventError::PayloadNotObject(json_kind(&other))),
        }
    }

    /// Sets the payload from a raw JSON map.
    pub fn payload_raw(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    /// Adds a single payload field.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// Adds a metadata entry.
    pub fn metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Builds the event envelope.
    ///
    /// # Panics
    ///
    /// Panics if `event_type` or `aggregate_id` is not set.
    pub fn build(self) -> EventEnvelope {
        EventEnvelope {
            event_id: self.event_id.unwrap_or_default(),
            event_type: self.event_type.expect("event_type is required"),
            aggregate_id: self.aggregate_id.expect("aggregate_id is required"),
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            payload: self.payload,
            metadata: self.metadata,
        }
    }

    /// Tries to build the event envelope, returning None if required fields are missing.
    pub fn try_build(self) -> Option<EventEnvelope> {
        Some(EventEnvelope {
            event_id: self.event_id.unwrap_or_default(),
            event_type: self.event_type?,
            aggregate_id: self.aggregate_id?,
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            payload: self.payload,
            metadata: self.metadata,
        })
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_id_new_creates_unique_ids() {
        let id1 = EventId::new();
        let id2 = EventId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn event_envelope_builder() {
        let envelope = EventEnvelope::builder()
            .event_type("OrderCreated")
            .aggregate_id("o1")
            .field("total_amount", 100)
            .field("status", "pending")
            .metadata("correlation_id", json!("123"))
            .build();

        assert_eq!(envelope.event_type, "OrderCreated");
        assert_eq!(envelope.aggregate_id.as_str(), "o1");
        assert_eq!(envelope.payload.get("total_amount"), Some(&json!(100)));
        assert_eq!(envelope.payload.get("status"), Some(&json!("pending")));
        assert_eq!(
            envelope.metadata.get("correlation_id"),
            Some(&json!("123"))
        );
    }

    #[test]
    fn domain_event_accessors_expose_envelope_fields() {
        let at = Utc::now();
        let envelope = EventEnvelope::builder()
            .event_type("UserDeleted")
            .aggregate_id("u1")
            .timestamp(at)
            .build();
        let event: &dyn DomainEvent = &envelope;

        assert_eq!(event.aggregate_id().as_str(), "u1");
        assert_eq!(event.event_type(), "UserDeleted");
        assert!(event.data().is_empty());
        assert_eq!(event.occurred_at(), at);
    }

    #[test]
    fn payload_from_struct_must_be_an_object() {
        #[derive(Serialize)]
        struct Shipped {
            status: &'static str,
        }

        let builder = EventEnvelope::builder()
            .payload(&Shipped { status: "shipped" })
            .unwrap();
        let envelope = builder.event_type("OrderUpdated").aggregate_id("o1").build();
        assert_eq!(envelope.payload.get("status"), Some(&json!("shipped")));

        let err = EventEnvelope::builder().payload(&42).unwrap_err();
        assert!(matches!(err, EventError::PayloadNotObject("a number")));
    }

    #[test]
    fn event_envelope_try_build_returns_none_on_missing_fields() {
        assert!(EventEnvelope::builder().try_build().is_none());
        assert!(
            EventEnvelope::builder()
                .event_type("OrderCreated")
                .try_build()
                .is_none()
        );
    }

    #[test]
    fn envelope_deserializes_without_payload_or_metadata() {
        let envelope: EventEnvelope = serde_json::from_value(json!({
            "event_id": "6f1d3c2e-8a55-4a59-9a41-2f0f6f1d2a10",
            "event_type": "OrderDeleted",
            "aggregate_id": "o1",
            "timestamp": "2026-01-01T00:00:00Z"
        }))
        .unwrap();

        assert!(envelope.payload.is_empty());
        assert!(envelope.metadata.is_empty());
    }
}
