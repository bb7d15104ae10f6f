//! Inbound domain event contract.
//!
//! The event store and bus that produce events live outside this workspace.
//! This crate pins down what the projection engine needs from them: the
//! [`DomainEvent`] accessors and a concrete [`EventEnvelope`] carrying an
//! untyped [`Payload`].

pub mod error;
pub mod event;

pub use common::AggregateId;
pub use error::{EventError, Result};
pub use event::{DomainEvent, EventEnvelope, EventEnvelopeBuilder, EventId, Payload};
