//! Storage interfaces
//!
//! The chat core only talks to persistence through these two traits.
//! Backends:
//! - `memory`: process-local maps, used for tests and when no database is configured
//! - `sqlite`: durable SQLite database via sqlx
//!
//! Both backends enforce name uniqueness at the store boundary, so concurrent
//! registrations of the same name cannot both succeed.

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

use crate::core::models::{Message, MessageType, Participant, BROADCAST};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Unexpected(anyhow::Error::new(err))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait ParticipantStore: Send + Sync {
    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Participant>>;

    /// Fails with `StoreError::Conflict` if the name is taken
    async fn insert(&self, participant: Participant) -> StoreResult<()>;

    /// Fails with `StoreError::NotFound` if no participant has this name.
    /// The stored timestamp never moves backwards.
    async fn update_heartbeat(&self, name: &str, timestamp: i64) -> StoreResult<()>;

    /// Participants whose last heartbeat is strictly older than `timestamp`
    async fn find_stale_before(&self, timestamp: i64) -> StoreResult<Vec<Participant>>;

    async fn delete_by_name(&self, name: &str) -> StoreResult<()>;

    async fn list(&self) -> StoreResult<Vec<Participant>>;

    /// Release held resources on shutdown. Nothing to do by default.
    async fn close(&self) {}
}

#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn insert(&self, message: Message) -> StoreResult<()>;

    /// Matching messages in insertion order, at most `limit` of them
    async fn query(&self, filter: &MessageFilter, limit: Option<usize>)
        -> StoreResult<Vec<Message>>;
}

/// Which messages a query should return.
///
/// Kept as data rather than a closure so SQL backends can translate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageFilter {
    All,
    /// Messages sent by or to this participant, broadcast messages, and
    /// every public `message`
    VisibleTo(String),
}

impl MessageFilter {
    pub fn matches(&self, message: &Message) -> bool {
        match self {
            MessageFilter::All => true,
            MessageFilter::VisibleTo(requester) => {
                message.from == *requester
                    || message.to == *requester
                    || message.to == BROADCAST
                    || message.message_type == MessageType::Message
            }
        }
    }
}
