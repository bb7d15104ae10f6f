//! Domain error types.

use thiserror::Error;

/// Errors raised when constructing a value object from invalid input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueObjectError {
    /// A required text field was empty or whitespace.
    #[error("{field} must not be blank")]
    Blank { field: &'static str },

    /// The email address is not of the form `local@domain`.
    #[error("Invalid email address: {0:?}")]
    InvalidEmail(String),

    /// A phone field contained something other than digits.
    #[error("Invalid phone {field}: {value:?}")]
    InvalidPhone { field: &'static str, value: String },

    /// A monetary amount was negative or not finite.
    #[error("Invalid amount: {0} (must be a finite, non-negative number)")]
    InvalidAmount(f64),
}

/// Errors raised when an event payload cannot be mapped onto its schema.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// A field was missing or had the wrong JSON type.
    #[error("Malformed {event_type} payload: {source}")]
    Malformed {
        event_type: String,
        source: serde_json::Error,
    },

    /// A field was present and well-typed but failed validation.
    #[error("Invalid {event_type} payload: {source}")]
    InvalidValue {
        event_type: String,
        source: ValueObjectError,
    },
}

impl PayloadError {
    /// Returns the event type whose payload was rejected.
    pub fn event_type(&self) -> &str {
        match self {
            PayloadError::Malformed { event_type, .. }
            | PayloadError::InvalidValue { event_type, .. } => event_type,
        }
    }
}
