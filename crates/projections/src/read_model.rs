//! Read model base: the header every projection embeds and the trait
//! projections implement.

use chrono::{DateTime, Utc};
use common::{AggregateId, Version};
use domain::TypedEvent;
use events::DomainEvent;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Result of applying one event to a read model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyOutcome {
    /// The model changed; its version was bumped and it must be saved.
    Applied,
    /// The event was unknown to this model or a duplicate. Nothing changed.
    Ignored,
}

impl ApplyOutcome {
    pub fn is_applied(self) -> bool {
        self == ApplyOutcome::Applied
    }
}

/// Identity and lifecycle metadata shared by all read models.
///
/// `id` and `model_type` are fixed at construction. The lifecycle fields
/// only move forward: `version` increments, `deleted` and `initialized`
/// are set and never cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadModelHeader {
    id: AggregateId,
    #[serde(rename = "type")]
    model_type: String,
    version: Version,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted: bool,
    /// Set once a Created event has been applied.
    initialized: bool,
}

impl ReadModelHeader {
    /// Creates the header of a model nothing has been applied to yet.
    pub fn new(id: AggregateId, model_type: &str) -> Self {
        let now = Utc::now();
        Self {
            id,
            model_type: model_type.to_string(),
            version: Version::initial(),
            created_at: now,
            updated_at: now,
            deleted: false,
            initialized: false,
        }
    }

    pub fn id(&self) -> &AggregateId {
        &self.id
    }

    pub fn model_type(&self) -> &str {
        &self.model_type
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Whether a Created event has been applied to this model.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Bumps the version and stamps the event time.
    ///
    /// The first applied event also fixes `created_at`, so replaying a
    /// stream reproduces the same timestamps.
    pub fn record_apply(&mut self, at: DateTime<Utc>) {
        if self.version == Version::initial() {
            self.created_at = at;
        }
        self.updated_at = at;
        self.version = self.version.next();
    }

    pub fn mark_initialized(&mut self) {
        self.initialized = true;
    }

    /// Soft-deletes the model. Deleting twice is ignored.
    pub fn mark_deleted(&mut self) -> ApplyOutcome {
        if self.deleted {
            return ApplyOutcome::Ignored;
        }
        self.deleted = true;
        ApplyOutcome::Applied
    }
}

/// A denormalized, query-side view of one aggregate.
///
/// Events are decoded into [`ReadModel::Event`] before they reach the
/// model, so [`ReadModel::apply`] only sees event kinds it understands.
/// `apply` must bump the header through `record_apply` exactly once per
/// applied event and leave the model untouched when it returns
/// [`ApplyOutcome::Ignored`].
pub trait ReadModel: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Type tag stored in the header (e.g., "order").
    const MODEL_TYPE: &'static str;

    /// The event kinds this model folds.
    type Event: TypedEvent + Send + 'static;

    /// Creates an empty model for an aggregate seen for the first time.
    fn new(id: AggregateId) -> Self;

    /// Returns the shared header.
    fn header(&self) -> &ReadModelHeader;

    /// Applies one decoded event that happened at `occurred_at`.
    fn apply(&mut self, event: Self::Event, occurred_at: DateTime<Utc>) -> ApplyOutcome;

    /// Decodes and applies one delivered event.
    ///
    /// Unknown event types are ignored. A known event whose payload cannot
    /// be mapped fails with [`crate::ProjectionError::MalformedPayload`]
    /// and mutates nothing.
    fn apply_event(&mut self, event: &dyn DomainEvent) -> Result<ApplyOutcome> {
        Ok(match Self::Event::from_event(event)? {
            Some(typed) => self.apply(typed, event.occurred_at()),
            None => ApplyOutcome::Ignored,
        })
    }

    fn id(&self) -> &AggregateId {
        self.header().id()
    }

    fn version(&self) -> Version {
        self.header().version()
    }

    fn is_deleted(&self) -> bool {
        self.header().is_deleted()
    }
}
