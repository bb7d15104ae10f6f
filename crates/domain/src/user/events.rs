//! User domain events.
//!
//! The write side sends the email as a flat `email` string plus an optional
//! `email_verified` flag; decoding folds the two into an [`Email`].

use ::events::Payload;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::event::{decode_payload, invalid};
use crate::{Address, Email, PayloadError, Phone, TypedEvent, ValueObjectError};

/// Events the user projection understands.
#[derive(Debug, Clone, PartialEq)]
pub enum UserEvent {
    /// User registered.
    Created(UserCreatedData),

    /// Some profile fields changed.
    Updated(UserUpdatedData),

    /// User was deleted on the write side.
    Deleted(UserDeletedData),
}

impl UserEvent {
    pub const CREATED: &'static str = "UserCreated";
    pub const UPDATED: &'static str = "UserUpdated";
    pub const DELETED: &'static str = "UserDeleted";
}

impl TypedEvent for UserEvent {
    const AGGREGATE_TYPE: &'static str = "user";

    fn decode(event_type: &str, data: &Payload) -> Result<Option<Self>, PayloadError> {
        let event = match event_type {
            Self::CREATED => {
                let raw: RawUserCreated = decode_payload(event_type, data)?;
                UserEvent::Created(raw.into_data().map_err(invalid(event_type))?)
            }
            Self::UPDATED => {
                let raw: RawUserUpdated = decode_payload(event_type, data)?;
                UserEvent::Updated(raw.into_data().map_err(invalid(event_type))?)
            }
            Self::DELETED => UserEvent::Deleted(decode_payload(event_type, data)?),
            _ => return Ok(None),
        };
        Ok(Some(event))
    }

    fn event_type(&self) -> &'static str {
        match self {
            UserEvent::Created(_) => Self::CREATED,
            UserEvent::Updated(_) => Self::UPDATED,
            UserEvent::Deleted(_) => Self::DELETED,
        }
    }
}

fn validate_username(username: &str) -> Result<(), ValueObjectError> {
    if username.trim().is_empty() {
        Err(ValueObjectError::Blank { field: "username" })
    } else {
        Ok(())
    }
}

/// Data for UserCreated event.
#[derive(Debug, Clone, PartialEq)]
pub struct UserCreatedData {
    pub username: String,
    pub email: Email,
    pub address: Option<Address>,
    pub phone: Option<Phone>,

    /// When the user registered on the write side.
    pub created_at: Option<DateTime<Utc>>,

    /// Fields this schema does not know about.
    pub extra: Payload,
}

#[derive(Deserialize)]
struct RawUserCreated {
    username: String,
    email: String,
    #[serde(default)]
    email_verified: Option<bool>,
    #[serde(default)]
    address: Option<Address>,
    #[serde(default)]
    phone: Option<Phone>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    extra: Payload,
}

impl RawUserCreated {
    fn into_data(self) -> Result<UserCreatedData, ValueObjectError> {
        validate_username(&self.username)?;
        Ok(UserCreatedData {
            username: self.username,
            email: Email::new(self.email, self.email_verified.unwrap_or(false))?,
            address: self.address,
            phone: self.phone,
            created_at: self.created_at,
            extra: self.extra,
        })
    }
}

/// Data for UserUpdated event. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserUpdatedData {
    pub username: Option<String>,

    /// A new address, verified according to `email_verified` (default false).
    pub email: Option<Email>,

    /// Verification flag as sent. Applies to the current address when
    /// `email` is absent.
    pub email_verified: Option<bool>,

    pub address: Option<Address>,
    pub phone: Option<Phone>,
    pub extra: Payload,
}

#[derive(Deserialize)]
struct RawUserUpdated {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_verified: Option<bool>,
    #[serde(default)]
    address: Option<Address>,
    #[serde(default)]
    phone: Option<Phone>,
    #[serde(flatten)]
    extra: Payload,
}

impl RawUserUpdated {
    fn into_data(self) -> Result<UserUpdatedData, ValueObjectError> {
        if let Some(username) = &self.username {
            validate_username(username)?;
        }
        let verified = self.email_verified.unwrap_or(false);
        Ok(UserUpdatedData {
            username: self.username,
            email: self
                .email
                .map(|address| Email::new(address, verified))
                .transpose()?,
            email_verified: self.email_verified,
            address: self.address,
            phone: self.phone,
            extra: self.extra,
        })
    }
}

/// Data for UserDeleted event.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UserDeletedData {
    #[serde(default)]
    pub reason: Option<String>,

    #[serde(flatten)]
    pub extra: Payload,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> Payload {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("test payload must be an object"),
        }
    }

    #[test]
    fn test_decode_created() {
        let data = payload(json!({
            "username": "ada",
            "email": "ada@example.com",
            "email_verified": true,
            "phone": {"number": "5551234", "country_code": "+44"},
            "address": {"street": "12 St James's Sq", "city": "London", "zip_code": "SW1Y"}
        }));

        let Some(UserEvent::Created(created)) = UserEvent::decode("UserCreated", &data).unwrap()
        else {
            panic!("Expected UserCreated event");
        };
        assert_eq!(created.username, "ada");
        assert_eq!(created.email, Email::new("ada@example.com", true).unwrap());
        assert_eq!(created.phone.unwrap().country_code(), "44");
        assert_eq!(created.address.unwrap().city(), "London");
        assert!(created.extra.is_empty());
    }

    #[test]
    fn test_created_defaults_email_to_unverified() {
        let data = payload(json!({"username": "ada", "email": "ada@example.com"}));
        let Some(UserEvent::Created(created)) = UserEvent::decode("UserCreated", &data).unwrap()
        else {
            panic!("Expected UserCreated event");
        };
        assert!(!created.email.is_verified());
    }

    #[test]
    fn test_created_rejects_invalid_email() {
        let data = payload(json!({"username": "ada", "email": "not-an-email"}));
        let err = UserEvent::decode("UserCreated", &data).unwrap_err();
        assert!(matches!(
            err,
            PayloadError::InvalidValue {
                source: ValueObjectError::InvalidEmail(_),
                ..
            }
        ));
    }

    #[test]
    fn test_created_requires_username() {
        let data = payload(json!({"email": "ada@example.com"}));
        let err = UserEvent::decode("UserCreated", &data).unwrap_err();
        assert!(matches!(err, PayloadError::Malformed { .. }));
        assert!(err.to_string().contains("username"));
    }

    #[test]
    fn test_created_rejects_malformed_nested_phone() {
        let data = payload(json!({
            "username": "ada",
            "email": "ada@example.com",
            "phone": {"number": "call me", "country_code": "44"}
        }));
        let err = UserEvent::decode("UserCreated", &data).unwrap_err();
        assert!(matches!(err, PayloadError::Malformed { .. }));
    }

    #[test]
    fn test_update_email_verification_only() {
        let data = payload(json!({"email_verified": true}));
        let Some(UserEvent::Updated(updated)) = UserEvent::decode("UserUpdated", &data).unwrap()
        else {
            panic!("Expected UserUpdated event");
        };
        assert_eq!(updated.email, None);
        assert_eq!(updated.email_verified, Some(true));
    }

    #[test]
    fn test_update_new_email() {
        let data = payload(json!({"email": "lovelace@example.com"}));
        let Some(UserEvent::Updated(updated)) = UserEvent::decode("UserUpdated", &data).unwrap()
        else {
            panic!("Expected UserUpdated event");
        };
        assert_eq!(
            updated.email,
            Some(Email::new("lovelace@example.com", false).unwrap())
        );
    }

    #[test]
    fn test_unknown_event_type_decodes_to_none() {
        let data = payload(json!({"username": "ada"}));
        assert!(UserEvent::decode("UserRenamed", &data).unwrap().is_none());
        assert!(UserEvent::decode("OrderCreated", &data).unwrap().is_none());
    }

    #[test]
    fn test_event_type_names() {
        let deleted = UserEvent::decode("UserDeleted", &Payload::new())
            .unwrap()
            .unwrap();
        assert_eq!(deleted.event_type(), "UserDeleted");
    }
}
