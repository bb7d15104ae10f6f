//! Integration tests: delivered envelopes → typed order and user events.

use domain::{Email, OrderEvent, PayloadError, TypedEvent, UserEvent};
use events::EventEnvelope;
use serde_json::json;

fn envelope(event_type: &str, data: serde_json::Value) -> EventEnvelope {
    let serde_json::Value::Object(payload) = data else {
        panic!("payload must be an object");
    };
    EventEnvelope::builder()
        .aggregate_id("agg-1")
        .event_type(event_type)
        .payload_raw(payload)
        .build()
}

#[test]
fn test_order_created_from_envelope() {
    let event = envelope(
        "OrderCreated",
        json!({
            "user_id": "u1",
            "total_amount": 99.5,
            "status": "pending",
            "shipping_address": {"street": "1 Main St", "city": "Springfield", "zip_code": "12345"},
            "created_at": "2026-03-01T10:00:00Z",
            "channel": "web"
        }),
    );

    let Some(OrderEvent::Created(data)) = OrderEvent::from_event(&event).unwrap() else {
        panic!("expected OrderCreated");
    };
    assert_eq!(data.user_id.as_deref(), Some("u1"));
    assert_eq!(data.total_amount, 99.5);
    assert_eq!(data.shipping_address.unwrap().zip_code(), "12345");
    assert!(data.created_at.is_some());
    assert_eq!(data.extra.get("channel"), Some(&json!("web")));
}

#[test]
fn test_events_of_other_aggregates_decode_to_none() {
    let user_event = envelope("UserCreated", json!({"username": "ada", "email": "ada@example.com"}));
    assert!(OrderEvent::from_event(&user_event).unwrap().is_none());

    let order_event = envelope("OrderDeleted", json!({}));
    assert!(UserEvent::from_event(&order_event).unwrap().is_none());
}

#[test]
fn test_event_type_round_trips_through_variant() {
    for event_type in [OrderEvent::CREATED, OrderEvent::UPDATED, OrderEvent::DELETED] {
        let data = if event_type == OrderEvent::CREATED {
            json!({"total_amount": 1, "status": "pending"})
        } else {
            json!({})
        };
        let decoded = OrderEvent::from_event(&envelope(event_type, data))
            .unwrap()
            .unwrap();
        assert_eq!(decoded.event_type(), event_type);
    }
}

#[test]
fn test_user_created_folds_email_fields() {
    let event = envelope(
        "UserCreated",
        json!({
            "username": "ada",
            "email": "ada@example.com",
            "email_verified": true,
            "phone": {"number": "555-0100", "country_code": "+1"}
        }),
    );

    let Some(UserEvent::Created(data)) = UserEvent::from_event(&event).unwrap() else {
        panic!("expected UserCreated");
    };
    assert_eq!(data.email, Email::new("ada@example.com", true).unwrap());
    assert_eq!(data.phone.unwrap().number(), "5550100");
}

#[test]
fn test_invalid_nested_value_is_rejected() {
    let event = envelope(
        "UserUpdated",
        json!({"phone": {"number": "call me", "country_code": "1"}}),
    );
    let err = UserEvent::from_event(&event).unwrap_err();
    assert_eq!(err.event_type(), "UserUpdated");
    assert!(matches!(err, PayloadError::Malformed { .. }));
}

#[test]
fn test_invalid_email_is_rejected_with_event_type() {
    let event = envelope("UserCreated", json!({"username": "ada", "email": "not-an-email"}));
    let err = UserEvent::from_event(&event).unwrap_err();
    assert!(matches!(err, PayloadError::InvalidValue { .. }));
    assert!(err.to_string().contains("UserCreated"));
}
