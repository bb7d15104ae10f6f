//! Projection processor for feeding delivered events to projections.

use std::collections::HashMap;
use std::sync::Arc;

use common::AggregateId;
use events::EventEnvelope;
use futures_util::future::try_join_all;

use crate::Result;
use crate::projection::Projection;

/// Delivers events to every registered projection.
///
/// The processor supports:
/// - Single event delivery: one event to all projections, in registration order
/// - Batch delivery: events grouped per aggregate, groups processed concurrently
///
/// Counts returned by both methods are the number of deliveries that
/// changed a read model.
#[derive(Clone, Default)]
pub struct ProjectionProcessor {
    projections: Vec<Arc<dyn Projection>>,
}

impl ProjectionProcessor {
    /// Creates a processor with no projections.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a projection with this processor.
    pub fn register(&mut self, projection: Arc<dyn Projection>) {
        self.projections.push(projection);
    }

    /// Registers a projection, builder style.
    pub fn with_projection(mut self, projection: Arc<dyn Projection>) -> Self {
        self.register(projection);
        self
    }

    /// Returns the number of registered projections.
    pub fn projection_count(&self) -> usize {
        self.projections.len()
    }

    /// Returns the names of the registered projections.
    pub fn projection_names(&self) -> Vec<&'static str> {
        self.projections.iter().map(|p| p.name()).collect()
    }

    /// Delivers a single event to all registered projections.
    ///
    /// Stops at the first projection error; projections registered after it
    /// do not see the event.
    #[tracing::instrument(
        skip(self, event),
        fields(event_type = %event.event_type, aggregate_id = %event.aggregate_id)
    )]
    pub async fn process_event(&self, event: &EventEnvelope) -> Result<usize> {
        let mut applied = 0;
        for projection in &self.projections {
            if projection.handle(event).await?.is_applied() {
                applied += 1;
            }
        }
        Ok(applied)
    }

    /// Delivers a batch of events.
    ///
    /// Events are partitioned by aggregate id. Each partition is delivered in
    /// its original order by a single writer while partitions run
    /// concurrently. The first error aborts the batch; partitions that have
    /// not finished are dropped mid-way.
    #[tracing::instrument(skip_all, fields(events = events.len()))]
    pub async fn process_batch(&self, events: Vec<EventEnvelope>) -> Result<usize> {
        let partitions = partition_by_aggregate(events);
        tracing::debug!(partitions = partitions.len(), "processing batch");

        let counts = try_join_all(partitions.into_iter().map(|partition| async move {
            let mut applied = 0;
            for event in &partition {
                applied += self.process_event(event).await?;
            }
            Ok::<_, crate::ProjectionError>(applied)
        }))
        .await?;

        Ok(counts.into_iter().sum())
    }
}

/// Groups events by aggregate id, keeping each group in delivery order and
/// the groups in order of first appearance.
fn partition_by_aggregate(events: Vec<EventEnvelope>) -> Vec<Vec<EventEnvelope>> {
    let mut index: HashMap<AggregateId, usize> = HashMap::new();
    let mut partitions: Vec<Vec<EventEnvelope>> = Vec::new();

    for event in events {
        match index.get(&event.aggregate_id) {
            Some(&slot) => partitions[slot].push(event),
            None => {
                index.insert(event.aggregate_id.clone(), partitions.len());
                partitions.push(vec![event]);
            }
        }
    }
    partitions
}
