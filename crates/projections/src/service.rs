//! Projection service: the event-handling entry point and query facade of
//! one read model type.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::AggregateId;
use domain::TypedEvent;
use events::{DomainEvent, EventEnvelope};

use crate::locks::KeyedLocks;
use crate::projection::Projection;
use crate::read_model::{ApplyOutcome, ReadModel};
use crate::repository::ReadModelRepository;
use crate::{ProjectionConfig, Result, StorageError};

/// Folds delivered events into read models of type `M` stored in `R`.
///
/// `handle_event` runs load, apply and save while holding a lock on the
/// event's aggregate id, so concurrent deliveries for one aggregate are
/// applied one after another and none is lost. Deliveries for different
/// aggregates proceed in parallel.
///
/// `R` may be unsized, so a `dyn ReadModelRepository<M>` chosen at runtime
/// works as well as a concrete repository.
pub struct ProjectionService<M, R: ?Sized> {
    repository: Arc<R>,
    locks: KeyedLocks,
    storage_timeout: Option<Duration>,
    _model: PhantomData<fn() -> M>,
}

impl<M, R> ProjectionService<M, R>
where
    M: ReadModel,
    R: ReadModelRepository<M> + ?Sized,
{
    /// Creates a service over `repository` with no storage deadline.
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            locks: KeyedLocks::new(),
            storage_timeout: None,
            _model: PhantomData,
        }
    }

    /// Creates a service using the storage deadline from configuration.
    pub fn from_config(repository: Arc<R>, config: &ProjectionConfig) -> Self {
        Self {
            storage_timeout: config.storage_timeout,
            ..Self::new(repository)
        }
    }

    /// Bounds every repository call by `timeout`.
    pub fn with_storage_timeout(mut self, timeout: Duration) -> Self {
        self.storage_timeout = Some(timeout);
        self
    }

    /// Applies one delivered event to its read model.
    ///
    /// The model is loaded, or created fresh if the repository has never
    /// seen the aggregate. Ignored events are not saved, so an event no
    /// projection understands never creates a model. Errors are returned
    /// unchanged and nothing is saved; retrying is up to the dispatcher.
    #[tracing::instrument(
        skip_all,
        fields(
            model = M::MODEL_TYPE,
            aggregate_id = %event.aggregate_id(),
            event_type = %event.event_type(),
        )
    )]
    pub async fn handle_event(&self, event: &dyn DomainEvent) -> Result<ApplyOutcome> {
        let result = self.apply_locked(event).await;
        match &result {
            Ok(ApplyOutcome::Applied) => {
                metrics::counter!("projections_events_applied", "model" => M::MODEL_TYPE)
                    .increment(1);
            }
            Ok(ApplyOutcome::Ignored) => {
                tracing::debug!("event ignored");
                metrics::counter!("projections_events_ignored", "model" => M::MODEL_TYPE)
                    .increment(1);
            }
            Err(err) => {
                tracing::warn!(error = %err, "event handling failed");
                metrics::counter!("projections_events_failed", "model" => M::MODEL_TYPE)
                    .increment(1);
            }
        }
        result
    }

    async fn apply_locked(&self, event: &dyn DomainEvent) -> Result<ApplyOutcome> {
        // Events for other models and malformed payloads never touch storage.
        let Some(typed) = M::Event::from_event(event)? else {
            return Ok(ApplyOutcome::Ignored);
        };

        let aggregate_id = event.aggregate_id();
        let _guard = self.locks.lock(aggregate_id).await;

        let mut model = match self
            .storage("find_by_id", self.repository.find_by_id(aggregate_id))
            .await
        {
            Ok(model) => model,
            Err(err) if err.is_not_found() => M::new(aggregate_id.clone()),
            Err(err) => return Err(err),
        };

        let outcome = model.apply(typed, event.occurred_at());
        if outcome.is_applied() {
            let version = model.version();
            self.storage("save", self.repository.save(model)).await?;
            tracing::debug!(%version, "read model saved");
        }
        Ok(outcome)
    }

    /// Returns the read model of `id`, or `NotFound`.
    pub async fn get_by_id(&self, id: &AggregateId) -> Result<M> {
        self.storage("find_by_id", self.repository.find_by_id(id))
            .await
    }

    /// Returns every read model of this type.
    pub async fn get_all(&self) -> Result<Vec<M>> {
        self.storage("find_all", self.repository.find_all()).await
    }

    /// Physically removes the read model of `id`.
    ///
    /// Unlike a Deleted event, which only sets the soft-delete flag, the
    /// model is gone afterwards and a later event starts from scratch.
    #[tracing::instrument(skip(self), fields(model = M::MODEL_TYPE))]
    pub async fn purge(&self, id: &AggregateId) -> Result<()> {
        let _guard = self.locks.lock(id).await;
        self.storage("delete", self.repository.delete(id)).await?;
        metrics::counter!("projections_models_purged", "model" => M::MODEL_TYPE).increment(1);
        tracing::info!("read model purged");
        Ok(())
    }

    async fn storage<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        match self.storage_timeout {
            Some(timeout) => tokio::time::timeout(timeout, call)
                .await
                .map_err(|_| StorageError::Timeout { operation, timeout })?,
            None => call.await,
        }
    }
}

#[async_trait]
impl<M, R> Projection for ProjectionService<M, R>
where
    M: ReadModel,
    R: ReadModelRepository<M> + ?Sized + 'static,
{
    fn name(&self) -> &'static str {
        M::MODEL_TYPE
    }

    async fn handle(&self, event: &EventEnvelope) -> Result<ApplyOutcome> {
        self.handle_event(event).await
    }
}
