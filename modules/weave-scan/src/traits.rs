//! Seams to the external collaborators.
//!
//! The engine owns no storage and no device APIs; everything it reads or
//! writes goes through these traits. Production wires them to the on-device
//! calendar, the contact directory, and the persistence stores; tests wire
//! in-memory fakes.
//!
//! Permission loss surfaces as `WeaveError::PermissionDenied` and fails the
//! whole scan atomically — never a partial list indistinguishable from "no
//! events".

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use weave_common::{
    FeedbackRecord, Friend, InteractionRecord, NewInteraction, RawEvent, WeaveError,
};

/// The on-device calendar.
#[async_trait]
pub trait CalendarSource: Send + Sync {
    async fn list_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<RawEvent>, WeaveError>;
}

/// The known-contact directory.
#[async_trait]
pub trait ContactDirectory: Send + Sync {
    async fn list_contacts(&self) -> Result<Vec<Friend>, WeaveError>;
}

/// Recorded interactions. Reads are batch-ranged (the dedup engine prefetches
/// once per scan); the write is used only when the user accepts candidates.
#[async_trait]
pub trait InteractionStore: Send + Sync {
    async fn list_completed(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<InteractionRecord>, WeaveError>;

    async fn create(&self, record: &NewInteraction) -> Result<Uuid, WeaveError>;
}

/// The append-only feedback log.
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    async fn append(&self, record: &FeedbackRecord) -> Result<(), WeaveError>;

    async fn list_since(&self, since: DateTime<Utc>) -> Result<Vec<FeedbackRecord>, WeaveError>;
}
