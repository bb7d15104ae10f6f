//! Order domain events.

use chrono::{DateTime, Utc};
use ::events::Payload;
use serde::Deserialize;

use crate::event::{decode_payload, invalid};
use crate::{Address, PayloadError, TypedEvent, ValueObjectError};

/// Events the order projection understands.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderEvent {
    /// Order was placed.
    Created(OrderCreatedData),

    /// Some order fields changed.
    Updated(OrderUpdatedData),

    /// Order was deleted on the write side.
    Deleted(OrderDeletedData),
}

impl OrderEvent {
    pub const CREATED: &'static str = "OrderCreated";
    pub const UPDATED: &'static str = "OrderUpdated";
    pub const DELETED: &'static str = "OrderDeleted";
}

impl TypedEvent for OrderEvent {
    const AGGREGATE_TYPE: &'static str = "order";

    fn decode(event_type: &str, data: &Payload) -> Result<Option<Self>, PayloadError> {
        let event = match event_type {
            Self::CREATED => {
                let created: OrderCreatedData = decode_payload(event_type, data)?;
                created.validate().map_err(invalid(event_type))?;
                OrderEvent::Created(created)
            }
            Self::UPDATED => {
                let updated: OrderUpdatedData = decode_payload(event_type, data)?;
                updated.validate().map_err(invalid(event_type))?;
                OrderEvent::Updated(updated)
            }
            Self::DELETED => OrderEvent::Deleted(decode_payload(event_type, data)?),
            _ => return Ok(None),
        };
        Ok(Some(event))
    }

    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::Created(_) => Self::CREATED,
            OrderEvent::Updated(_) => Self::UPDATED,
            OrderEvent::Deleted(_) => Self::DELETED,
        }
    }
}

fn validate_amount(amount: f64) -> Result<(), ValueObjectError> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(())
    } else {
        Err(ValueObjectError::InvalidAmount(amount))
    }
}

fn validate_status(status: &str) -> Result<(), ValueObjectError> {
    if status.trim().is_empty() {
        Err(ValueObjectError::Blank { field: "status" })
    } else {
        Ok(())
    }
}

/// Data for OrderCreated event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderCreatedData {
    /// The user who placed the order.
    #[serde(default)]
    pub user_id: Option<String>,

    /// Order total.
    pub total_amount: f64,

    /// Initial status (e.g., "pending").
    pub status: String,

    /// Where the order ships to.
    #[serde(default)]
    pub shipping_address: Option<Address>,

    /// When the order was placed on the write side.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    /// Fields this schema does not know about.
    #[serde(flatten)]
    pub extra: Payload,
}

impl OrderCreatedData {
    fn validate(&self) -> Result<(), ValueObjectError> {
        validate_amount(self.total_amount)?;
        validate_status(&self.status)
    }
}

/// Data for OrderUpdated event. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OrderUpdatedData {
    #[serde(default)]
    pub user_id: Option<String>,

    #[serde(default)]
    pub total_amount: Option<f64>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub shipping_address: Option<Address>,

    #[serde(flatten)]
    pub extra: Payload,
}

impl OrderUpdatedData {
    fn validate(&self) -> Result<(), ValueObjectError> {
        if let Some(amount) = self.total_amount {
            validate_amount(amount)?;
        }
        if let Some(status) = &self.status {
            validate_status(status)?;
        }
        Ok(())
    }
}

/// Data for OrderDeleted event.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OrderDeletedData {
    /// Why the order was deleted, if the write side said.
    #[serde(default)]
    pub reason: Option<String>,

    #[serde(flatten)]
    pub extra: Payload,
}
