use thiserror::Error;

/// Errors that can occur while building event envelopes.
#[derive(Debug, Error)]
pub enum EventError {
    /// The payload did not serialize to a JSON object.
    #[error("Event payload must be a JSON object, got {0}")]
    PayloadNotObject(&'static str),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for event operations.
pub type Result<T> = std::result::Result<T, EventError>;
