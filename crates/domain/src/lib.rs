//! Domain layer for the projection engine.
//!
//! This crate provides:
//! - Value objects used as read model fields ([`Address`], [`Email`], [`Phone`])
//! - The [`TypedEvent`] trait turning untyped event payloads into tagged unions
//! - Event schemas for the order and user aggregates

pub mod error;
pub mod event;
pub mod order;
pub mod user;
pub mod value_objects;

pub use error::{PayloadError, ValueObjectError};
pub use event::TypedEvent;
pub use order::{OrderCreatedData, OrderDeletedData, OrderEvent, OrderUpdatedData};
pub use user::{UserCreatedData, UserDeletedData, UserEvent, UserUpdatedData};
pub use value_objects::{Address, Email, Phone};
