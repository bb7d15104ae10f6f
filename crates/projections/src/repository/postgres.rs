use std::marker::PhantomData;

use async_trait::async_trait;
use common::AggregateId;
use sqlx::PgPool;

use crate::read_model::ReadModel;
use crate::repository::ReadModelRepository;
use crate::{ProjectionError, Result, StorageError};

/// PostgreSQL-backed read model repository.
///
/// All model types share the `read_models` table, keyed by
/// `(model_type, id)`. The model itself is stored as JSONB; version,
/// deleted flag and update time are copied into columns for querying.
pub struct PostgresReadModelRepository<M> {
    pool: PgPool,
    _model: PhantomData<fn() -> M>,
}

impl<M> Clone for PostgresReadModelRepository<M> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _model: PhantomData,
        }
    }
}

impl<M: ReadModel> PostgresReadModelRepository<M> {
    /// Creates a new PostgreSQL read model repository.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _model: PhantomData,
        }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }

    fn decode(data: serde_json::Value) -> Result<M> {
        Ok(serde_json::from_value(data).map_err(StorageError::from)?)
    }
}

#[async_trait]
impl<M: ReadModel> ReadModelRepository<M> for PostgresReadModelRepository<M> {
    async fn save(&self, model: M) -> Result<()> {
        let header = model.header();
        let data = serde_json::to_value(&model).map_err(StorageError::from)?;

        sqlx::query(
            r#"
            INSERT INTO read_models (model_type, id, version, deleted, data, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (model_type, id) DO UPDATE
            SET version = EXCLUDED.version,
                deleted = EXCLUDED.deleted,
                data = EXCLUDED.data,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(M::MODEL_TYPE)
        .bind(header.id().as_str())
        .bind(header.version().as_i64())
        .bind(header.is_deleted())
        .bind(data)
        .bind(header.updated_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: &AggregateId) -> Result<M> {
        let data: Option<serde_json::Value> =
            sqlx::query_scalar("SELECT data FROM read_models WHERE model_type = $1 AND id = $2")
                .bind(M::MODEL_TYPE)
                .bind(id.as_str())
                .fetch_optional(&self.pool)
                .await?;

        match data {
            Some(data) => Self::decode(data),
            None => Err(ProjectionError::NotFound {
                model_type: M::MODEL_TYPE,
                id: id.clone(),
            }),
        }
    }

    async fn find_all(&self) -> Result<Vec<M>> {
        // Byte order, matching the in-memory repository whatever the
        // database collation.
        let rows: Vec<serde_json::Value> = sqlx::query_scalar(
            r#"SELECT data FROM read_models WHERE model_type = $1 ORDER BY id COLLATE "C""#,
        )
        .bind(M::MODEL_TYPE)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::decode).collect()
    }

    async fn delete(&self, id: &AggregateId) -> Result<()> {
        sqlx::query("DELETE FROM read_models WHERE model_type = $1 AND id = $2")
            .bind(M::MODEL_TYPE)
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
