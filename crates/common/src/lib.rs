//! Shared identity types for the projection workspace.

pub mod types;

pub use types::{AggregateId, Version};
