//! In-memory store
//!
//! Not durable: everything is lost on restart. Participants live in a
//! `HashMap` keyed by name and messages in an append-only `Vec`, each behind a
//! `parking_lot::RwLock`. No lock is held across an `.await`.

use super::{MessageFilter, MessageStore, ParticipantStore, StoreError, StoreResult};
use crate::core::models::{Message, Participant};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct InMemoryStore {
    participants: RwLock<HashMap<String, Participant>>,
    messages: RwLock<Vec<Message>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message_count(&self) -> usize {
        self.messages.read().len()
    }
}

#[async_trait]
impl ParticipantStore for InMemoryStore {
    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Participant>> {
        Ok(self.participants.read().get(name).cloned())
    }

    async fn insert(&self, participant: Participant) -> StoreResult<()> {
        // check-and-insert under a single write lock
        let mut participants = self.participants.write();
        if participants.contains_key(&participant.name) {
            return Err(StoreError::Conflict(participant.name));
        }
        participants.insert(participant.name.clone(), participant);
        Ok(())
    }

    async fn update_heartbeat(&self, name: &str, timestamp: i64) -> StoreResult<()> {
        let mut participants = self.participants.write();
        let participant = participants
            .get_mut(name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        participant.last_heartbeat = participant.last_heartbeat.max(timestamp);
        Ok(())
    }

    async fn find_stale_before(&self, timestamp: i64) -> StoreResult<Vec<Participant>> {
        Ok(self
            .participants
            .read()
            .values()
            .filter(|p| p.last_heartbeat < timestamp)
            .cloned()
            .collect())
    }

    async fn delete_by_name(&self, name: &str) -> StoreResult<()> {
        self.participants
            .write()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    async fn list(&self) -> StoreResult<Vec<Participant>> {
        Ok(self.participants.read().values().cloned().collect())
    }
}

#[async_trait]
impl MessageStore for InMemoryStore {
    async fn insert(&self, message: Message) -> StoreResult<()> {
        self.messages.write().push(message);
        Ok(())
    }

    async fn query(
        &self,
        filter: &MessageFilter,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Message>> {
        let messages = self.messages.read();
        Ok(messages
            .iter()
            .filter(|m| filter.matches(m))
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }
}
