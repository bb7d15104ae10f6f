//! Concrete read models.

pub mod order;
pub mod user;

pub use order::OrderReadModel;
pub use user::UserReadModel;

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{DateTime, TimeZone, Utc};
    use events::EventEnvelope;

    /// Builds an envelope at a fixed minute offset so timestamps are deterministic.
    pub fn event(
        aggregate_id: &str,
        event_type: &str,
        minute: u32,
        data: serde_json::Value,
    ) -> EventEnvelope {
        let payload = match data {
            serde_json::Value::Object(map) => map,
            _ => panic!("test payload must be an object"),
        };
        EventEnvelope::builder()
            .aggregate_id(aggregate_id)
            .event_type(event_type)
            .timestamp(at(minute))
            .payload_raw(payload)
            .build()
    }

    pub fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, minute, 0).unwrap()
    }
}
