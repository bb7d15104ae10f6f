//! Read models and projections for the CQRS query side.
//!
//! This crate folds delivered domain events into denormalized read models:
//! - [`ReadModel`] trait and the shared [`ReadModelHeader`]
//! - [`OrderReadModel`] and [`UserReadModel`]
//! - [`ReadModelRepository`] with in-memory and PostgreSQL implementations
//! - [`ProjectionService`] serializing event handling per aggregate id
//! - [`ProjectionProcessor`] for dispatching events to projections

pub mod config;
pub mod error;
pub mod locks;
pub mod models;
pub mod processor;
pub mod projection;
pub mod read_model;
pub mod repository;
pub mod service;

pub use config::ProjectionConfig;
pub use error::{ProjectionError, Result, StorageError};
pub use locks::{KeyGuard, KeyedLocks};
pub use models::{OrderReadModel, UserReadModel};
pub use processor::ProjectionProcessor;
pub use projection::Projection;
pub use read_model::{ApplyOutcome, ReadModel, ReadModelHeader};
pub use repository::{InMemoryReadModelRepository, PostgresReadModelRepository, ReadModelRepository};
pub use service::ProjectionService;

/// Projection service for orders over repository `R`.
pub type OrderProjectionService<R> = ProjectionService<OrderReadModel, R>;

/// Projection service for users over repository `R`.
pub type UserProjectionService<R> = ProjectionService<UserReadModel, R>;
