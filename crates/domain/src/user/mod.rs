//! User aggregate event schema.

mod events;

pub use self::events::{UserCreatedData, UserDeletedData, UserEvent, UserUpdatedData};
