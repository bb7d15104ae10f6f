//! Core projection trait.

use async_trait::async_trait;
use events::EventEnvelope;

use crate::Result;
use crate::read_model::ApplyOutcome;

/// A projection that processes events and updates a read model.
///
/// Projections are the mechanism by which events are transformed into
/// denormalized read models optimized for queries. A projection reports
/// whether an event changed its model; events it does not care about are
/// [`ApplyOutcome::Ignored`], not errors.
#[async_trait]
pub trait Projection: Send + Sync {
    /// Returns the name of this projection.
    fn name(&self) -> &'static str;

    /// Handles a single event, updating the projection's read model.
    async fn handle(&self, event: &EventEnvelope) -> Result<ApplyOutcome>;
}
