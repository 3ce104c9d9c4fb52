//! Record store abstraction
//!
//! The durable store for guest and message records is an external
//! collaborator; the core depends only on this trait. The operations are
//! domain-typed projections of four storage primitives: get-by-key,
//! unconditional put, conditional update (compare-and-set), and
//! query-by-secondary-index.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::guest::{Guest, Role};
use crate::message::{Message, MessageId};

/// Store errors
///
/// A failed conditional update is NOT an error; it is reported through
/// [`CasOutcome::ConditionFailed`]. Variants here represent genuine backend
/// failures that callers surface or log.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Outcome of a compare-and-set update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasOutcome {
    /// The condition held and the update was applied
    Applied,
    /// The record was absent or the condition did not hold; nothing changed
    ConditionFailed,
}

/// Trait for guest/message storage backends
///
/// Implementations must make [`RecordStore::acknowledge_open`] a true atomic
/// conditional update: under concurrent duplicate acknowledgments exactly one
/// caller observes [`CasOutcome::Applied`].
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Look up a guest by phone number
    async fn get_guest(&self, sms_number: &str) -> Result<Option<Guest>>;

    /// Upsert a guest record
    async fn put_guest(&self, guest: &Guest) -> Result<()>;

    /// Store a new message
    async fn put_message(&self, message: &Message) -> Result<()>;

    /// Look up a message by its code
    async fn get_message(&self, id: &MessageId) -> Result<Option<Message>>;

    /// Transition a message from Open to Acknowledged, guarded on its
    /// current status being Open. Absent ids and already-acknowledged
    /// messages both yield `ConditionFailed`.
    async fn acknowledge_open(&self, id: &MessageId) -> Result<CasOutcome>;

    /// All guests holding the given role
    async fn guests_with_role(&self, role: Role) -> Result<Vec<Guest>>;

    /// All messages still Open that were created strictly before `cutoff`
    async fn open_messages_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Message>>;
}
