//! Order aggregate event schema.

mod events;

pub use self::events::{OrderCreatedData, OrderDeletedData, OrderEvent, OrderUpdatedData};
