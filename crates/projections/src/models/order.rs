//! Order read model.

use chrono::{DateTime, Utc};
use common::AggregateId;
use domain::{Address, OrderCreatedData, OrderEvent, OrderUpdatedData, TypedEvent};
use serde::{Deserialize, Serialize};

use crate::read_model::{ApplyOutcome, ReadModel, ReadModelHeader};

/// Query-side view of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderReadModel {
    #[serde(flatten)]
    header: ReadModelHeader,

    pub user_id: Option<String>,
    pub total_amount: f64,
    pub status: String,
    pub shipping_address: Option<Address>,

    /// When the order was placed on the write side, if the event said.
    pub placed_at: Option<DateTime<Utc>>,
}

impl OrderReadModel {
    fn apply_created(&mut self, data: OrderCreatedData) -> ApplyOutcome {
        if self.header.is_initialized() {
            return ApplyOutcome::Ignored;
        }
        self.user_id = data.user_id;
        self.total_amount = data.total_amount;
        self.status = data.status;
        self.shipping_address = data.shipping_address;
        self.placed_at = data.created_at;
        self.header.mark_initialized();
        ApplyOutcome::Applied
    }

    fn apply_updated(&mut self, data: OrderUpdatedData) -> ApplyOutcome {
        if let Some(user_id) = data.user_id {
            self.user_id = Some(user_id);
        }
        if let Some(total_amount) = data.total_amount {
            self.total_amount = total_amount;
        }
        if let Some(status) = data.status {
            self.status = status;
        }
        if let Some(address) = data.shipping_address {
            self.shipping_address = Some(address);
        }
        ApplyOutcome::Applied
    }
}

impl ReadModel for OrderReadModel {
    const MODEL_TYPE: &'static str = OrderEvent::AGGREGATE_TYPE;

    type Event = OrderEvent;

    fn new(id: AggregateId) -> Self {
        Self {
            header: ReadModelHeader::new(id, Self::MODEL_TYPE),
            user_id: None,
            total_amount: 0.0,
            status: String::new(),
            shipping_address: None,
            placed_at: None,
        }
    }

    fn header(&self) -> &ReadModelHeader {
        &self.header
    }

    fn apply(&mut self, event: OrderEvent, occurred_at: DateTime<Utc>) -> ApplyOutcome {
        let outcome = match event {
            OrderEvent::Created(data) => self.apply_created(data),
            OrderEvent::Updated(data) => self.apply_updated(data),
            OrderEvent::Deleted(_) => self.header.mark_deleted(),
        };
        if outcome.is_applied() {
            self.header.record_apply(occurred_at);
        }
        outcome
    }
}
