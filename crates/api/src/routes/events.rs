//! Event ingest endpoint.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use events::{EventEnvelope, EventId, Payload};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;

// -- Request types --

/// A domain event as published by the write side.
#[derive(Debug, Deserialize)]
pub struct EventRequest {
    pub event_type: String,
    pub aggregate_id: String,
    #[serde(default)]
    pub data: Payload,
    pub event_id: Option<Uuid>,
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl EventRequest {
    fn into_envelope(self) -> Result<EventEnvelope, ApiError> {
        if self.event_type.trim().is_empty() {
            return Err(ApiError::BadRequest("event_type must not be blank".to_string()));
        }
        if self.aggregate_id.trim().is_empty() {
            return Err(ApiError::BadRequest(
                "aggregate_id must not be blank".to_string(),
            ));
        }

        let mut builder = EventEnvelope::builder()
            .event_id(self.event_id.map(EventId::from_uuid).unwrap_or_default())
            .event_type(self.event_type)
            .aggregate_id(self.aggregate_id)
            .timestamp(self.timestamp.unwrap_or_else(Utc::now))
            .payload_raw(self.data);
        for (key, value) in self.metadata {
            builder = builder.metadata(key, value);
        }
        builder
            .try_build()
            .ok_or_else(|| ApiError::BadRequest("incomplete event".to_string()))
    }
}

// -- Response types --

#[derive(Debug, Serialize)]
pub struct EventAcceptedResponse {
    pub event_id: String,
    /// Number of read models the event changed.
    pub applied: usize,
}

// -- Handlers --

/// POST /events — apply a delivered event to every projection.
#[tracing::instrument(skip_all)]
pub async fn ingest(
    State(state): State<Arc<AppState>>,
    body: Result<Json<EventRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<EventAcceptedResponse>), ApiError> {
    let Json(req) = body.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let envelope = req.into_envelope()?;
    metrics::counter!("api_events_received").increment(1);

    let applied = state.processor.process_event(&envelope).await?;
    tracing::info!(
        event_id = %envelope.event_id,
        event_type = %envelope.event_type,
        aggregate_id = %envelope.aggregate_id,
        applied,
        "event processed"
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(EventAcceptedResponse {
            event_id: envelope.event_id.to_string(),
            applied,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(value: serde_json::Value) -> EventRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_into_envelope_keeps_supplied_fields() {
        let envelope = request(json!({
            "event_type": "OrderCreated",
            "aggregate_id": "o1",
            "event_id": "6f1d3c2e-8a55-4a59-9a41-2f0f6f1d2a10",
            "timestamp": "2026-01-01T00:00:00Z",
            "data": {"total_amount": 100, "status": "pending"},
            "metadata": {"source": "orders-service"}
        }))
        .into_envelope()
        .unwrap();

        assert_eq!(
            envelope.event_id.to_string(),
            "6f1d3c2e-8a55-4a59-9a41-2f0f6f1d2a10"
        );
        assert_eq!(envelope.timestamp.to_rfc3339(), "2026-01-01T00:00:00+00:00");
        assert_eq!(envelope.payload.get("status"), Some(&json!("pending")));
        assert_eq!(envelope.metadata.get("source"), Some(&json!("orders-service")));
    }

    #[test]
    fn test_into_envelope_defaults_optional_fields() {
        let envelope = request(json!({"event_type": "OrderDeleted", "aggregate_id": "o1"}))
            .into_envelope()
            .unwrap();
        assert!(envelope.payload.is_empty());
        assert!(envelope.metadata.is_empty());
    }

    #[test]
    fn test_blank_identifiers_are_rejected() {
        let err = request(json!({"event_type": " ", "aggregate_id": "o1"}))
            .into_envelope()
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(msg) if msg.contains("event_type")));

        let err = request(json!({"event_type": "OrderCreated", "aggregate_id": ""}))
            .into_envelope()
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(msg) if msg.contains("aggregate_id")));
    }
}
