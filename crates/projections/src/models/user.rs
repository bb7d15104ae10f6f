//! User read model.

use chrono::{DateTime, Utc};
use common::AggregateId;
use domain::{Address, Email, Phone, TypedEvent, UserCreatedData, UserEvent, UserUpdatedData};
use serde::{Deserialize, Serialize};

use crate::read_model::{ApplyOutcome, ReadModel, ReadModelHeader};

/// Query-side view of a user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserReadModel {
    #[serde(flatten)]
    header: ReadModelHeader,

    pub username: String,
    pub email: Option<Email>,
    pub address: Option<Address>,
    pub phone: Option<Phone>,
    pub registered_at: Option<DateTime<Utc>>,
}

impl UserReadModel {
    fn apply_created(&mut self, data: UserCreatedData) -> ApplyOutcome {
        if self.header.is_initialized() {
            return ApplyOutcome::Ignored;
        }
        self.username = data.username;
        self.email = Some(data.email);
        self.address = data.address;
        self.phone = data.phone;
        self.registered_at = data.created_at;
        self.header.mark_initialized();
        ApplyOutcome::Applied
    }

    fn apply_updated(&mut self, data: UserUpdatedData) -> ApplyOutcome {
        if let Some(username) = data.username {
            self.username = username;
        }
        match (data.email, data.email_verified) {
            (Some(email), _) => self.email = Some(email),
            (None, Some(verified)) => {
                self.email = self.email.as_ref().map(|email| email.with_verified(verified));
            }
            (None, None) => {}
        }
        if let Some(address) = data.address {
            self.address = Some(address);
        }
        if let Some(phone) = data.phone {
            self.phone = Some(phone);
        }
        ApplyOutcome::Applied
    }
}

impl ReadModel for UserReadModel {
    const MODEL_TYPE: &'static str = UserEvent::AGGREGATE_TYPE;

    type Event = UserEvent;

    fn new(id: AggregateId) -> Self {
        Self {
            header: ReadModelHeader::new(id, Self::MODEL_TYPE),
            username: String::new(),
            email: None,
            address: None,
            phone: None,
            registered_at: None,
        }
    }

    fn header(&self) -> &ReadModelHeader {
        &self.header
    }

    fn apply(&mut self, event: UserEvent, occurred_at: DateTime<Utc>) -> ApplyOutcome {
        let outcome = match event {
            UserEvent::Created(data) => self.apply_created(data),
            UserEvent::Updated(data) => self.apply_updated(data),
            UserEvent::Deleted(_) => self.header.mark_deleted(),
        };
        if outcome.is_applied() {
            self.header.record_apply(occurred_at);
        }
        outcome
    }
}
