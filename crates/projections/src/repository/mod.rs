//! Storage boundary for read models.

mod memory;
mod postgres;

pub use memory::InMemoryReadModelRepository;
pub use postgres::PostgresReadModelRepository;

use async_trait::async_trait;
use common::AggregateId;

use crate::Result;
use crate::read_model::ReadModel;

/// Keyed store of one read model type.
///
/// Every backing store must honour the same contract:
/// - `save` upserts by id and replaces the whole stored value
/// - `find_by_id` fails with [`crate::ProjectionError::NotFound`] for ids
///   never saved (or purged)
/// - readers observe a complete saved model or none, never a partial one
/// - `delete` physically removes the entry; deleting a missing id succeeds
///
/// Any call may block on I/O. Dropping the returned future cancels it.
#[async_trait]
pub trait ReadModelRepository<M: ReadModel>: Send + Sync {
    /// Inserts or replaces the model stored under its id.
    async fn save(&self, model: M) -> Result<()>;

    /// Loads the model stored under `id`.
    async fn find_by_id(&self, id: &AggregateId) -> Result<M>;

    /// Loads every stored model, ordered by the bytes of their ids.
    async fn find_all(&self) -> Result<Vec<M>>;

    /// Removes the model stored under `id`.
    async fn delete(&self, id: &AggregateId) -> Result<()>;
}
