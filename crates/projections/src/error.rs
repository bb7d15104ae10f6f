//! Projection error types.

use std::time::Duration;

use common::AggregateId;
use domain::PayloadError;
use thiserror::Error;

/// Errors that can occur during projection processing.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// The repository holds no model for this id.
    ///
    /// Expected on the first event of a new aggregate; the projection
    /// service turns it into a fresh model.
    #[error("Read model not found: {model_type} with id {id}")]
    NotFound {
        model_type: &'static str,
        id: AggregateId,
    },

    /// A known event's payload could not be mapped onto the read model.
    #[error(transparent)]
    MalformedPayload(#[from] PayloadError),

    /// The backing store could not complete an operation.
    #[error("Storage failure: {0}")]
    Storage(#[from] StorageError),
}

impl ProjectionError {
    /// Returns true for the not-found signal.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProjectionError::NotFound { .. })
    }
}

impl From<sqlx::Error> for ProjectionError {
    fn from(err: sqlx::Error) -> Self {
        ProjectionError::Storage(StorageError::Database(err))
    }
}

/// Failures of the backing store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored model could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A repository call exceeded the configured deadline.
    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    /// The store refused the operation.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Result type for projection operations.
pub type Result<T> = std::result::Result<T, ProjectionError>;
