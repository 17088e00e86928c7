//! Presence Registry
//!
//! Join, heartbeat and listing of live participants. All state lives in the
//! participant store; the registry only sequences the transitions.

use crate::core::clock::{wall_clock_time, Clock};
use crate::core::error::{Error, Result};
use crate::core::models::{Message, Participant, JOIN_TEXT};
use crate::core::store::{MessageStore, ParticipantStore};
use crate::core::validation::{ensure, validate_name};
use std::sync::Arc;
use tracing::{error, info};

pub struct PresenceRegistry {
    participants: Arc<dyn ParticipantStore>,
    messages: Arc<dyn MessageStore>,
    clock: Arc<dyn Clock>,
}

impl PresenceRegistry {
    pub fn new(
        participants: Arc<dyn ParticipantStore>,
        messages: Arc<dyn MessageStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            participants,
            messages,
            clock,
        }
    }

    /// Register `name` and announce the join to everyone
    pub async fn register(&self, name: &str) -> Result<Participant> {
        ensure(validate_name(name))?;

        // Fast path only; the store's insert is the authoritative uniqueness check.
        if self.participants.find_by_name(name).await?.is_some() {
            return Err(Error::Conflict(name.to_string()));
        }

        let now = self.clock.now();
        let participant = Participant::new(name, now.timestamp_millis());
        self.participants.insert(participant.clone()).await?;

        let join = Message::status(name, JOIN_TEXT, wall_clock_time(now));
        if let Err(e) = self.messages.insert(join).await {
            // a participant without a join notice must not stay registered
            if let Err(rollback) = self.participants.delete_by_name(name).await {
                error!("[Presence] Failed to roll back {}: {}", name, rollback);
            }
            return Err(e.into());
        }

        info!("[Presence] {} joined", name);
        Ok(participant)
    }

    /// Refresh the staleness clock of `name`
    pub async fn heartbeat(&self, name: &str) -> Result<()> {
        self.participants
            .update_heartbeat(name, self.clock.now_millis())
            .await?;
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<Participant>> {
        Ok(self.participants.list().await?)
    }

    pub async fn lookup(&self, name: &str) -> Result<Option<Participant>> {
        Ok(self.participants.find_by_name(name).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use crate::core::models::{MessageType, BROADCAST};
    use crate::core::store::{InMemoryStore, MessageFilter, StoreError, StoreResult};
    use async_trait::async_trait;
    use chrono::Duration;

    /// Message store that rejects every write
    struct BrokenMessages;

    #[async_trait]
    impl MessageStore for BrokenMessages {
        async fn insert(&self, _message: Message) -> StoreResult<()> {
            Err(StoreError::Unexpected(anyhow::anyhow!("down")))
        }
        async fn query(&self, _: &MessageFilter, _: Option<usize>) -> StoreResult<Vec<Message>> {
            Ok(Vec::new())
        }
    }

    /// Participant store whose lookups always miss, as when another
    /// registration of the same name lands between lookup and insert
    struct RacingLookups {
        inner: InMemoryStore,
    }

    #[async_trait]
    impl ParticipantStore for RacingLookups {
        async fn find_by_name(&self, _name: &str) -> StoreResult<Option<Participant>> {
            Ok(None)
        }
        async fn insert(&self, participant: Participant) -> StoreResult<()> {
            ParticipantStore::insert(&self.inner, participant).await
        }
        async fn update_heartbeat(&self, name: &str, timestamp: i64) -> StoreResult<()> {
            self.inner.update_heartbeat(name, timestamp).await
        }
        async fn find_stale_before(&self, timestamp: i64) -> StoreResult<Vec<Participant>> {
            self.inner.find_stale_before(timestamp).await
        }
        async fn delete_by_name(&self, name: &str) -> StoreResult<()> {
            self.inner.delete_by_name(name).await
        }
        async fn list(&self) -> StoreResult<Vec<Participant>> {
            self.inner.list().await
        }
    }

    fn setup() -> (Arc<InMemoryStore>, Arc<ManualClock>, PresenceRegistry) {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(ManualClock::default());
        let registry = PresenceRegistry::new(store.clone(), store.clone(), clock.clone());
        (store, clock, registry)
    }

    #[tokio::test]
    async fn test_register_emits_join_status() {
        let (store, clock, registry) = setup();

        let alice = registry.register("Alice").await.unwrap();
        assert_eq!(alice.name, "Alice");
        assert_eq!(alice.last_heartbeat, clock.now_millis());

        let messages = store.query(&MessageFilter::All, None).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].from, "Alice");
        assert_eq!(messages[0].to, BROADCAST);
        assert_eq!(messages[0].text, JOIN_TEXT);
        assert_eq!(messages[0].message_type, MessageType::Status);
    }

    #[tokio::test]
    async fn test_register_twice_conflicts() {
        let (store, _clock, registry) = setup();

        registry.register("Alice").await.unwrap();
        let err = registry.register("Alice").await.unwrap_err();
        assert!(matches!(err, Error::Conflict(name) if name == "Alice"));
        // no second join message
        assert_eq!(store.message_count(), 1);
    }

    #[tokio::test]
    async fn test_blank_name_never_reaches_store() {
        let (store, _clock, registry) = setup();

        for name in ["", "   ", "\n\t"] {
            let err = registry.register(name).await.unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)));
        }
        assert!(store.list().await.unwrap().is_empty());
        assert_eq!(store.message_count(), 0);
    }

    #[tokio::test]
    async fn test_heartbeat_refreshes_timestamp() {
        let (_store, clock, registry) = setup();

        let before = registry.register("Alice").await.unwrap().last_heartbeat;
        clock.advance(Duration::seconds(3));
        registry.heartbeat("Alice").await.unwrap();
        registry.heartbeat("Alice").await.unwrap();

        let after = registry.lookup("Alice").await.unwrap().unwrap().last_heartbeat;
        assert!(after >= before);
        assert_eq!(after - before, 3_000);
    }

    #[tokio::test]
    async fn test_heartbeat_unknown_is_not_found() {
        let (_store, _clock, registry) = setup();
        assert!(matches!(
            registry.heartbeat("Ghost").await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_join_notice_rolls_back_registration() {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(ManualClock::default());
        let registry = PresenceRegistry::new(store.clone(), Arc::new(BrokenMessages), clock);

        let err = registry.register("Alice").await.unwrap_err();
        assert!(matches!(err, Error::Store(_)));
        assert!(store.find_by_name("Alice").await.unwrap().is_none());

        // a retry fails the same way instead of reporting the name as taken
        let err = registry.register("Alice").await.unwrap_err();
        assert!(matches!(err, Error::Store(_)));
    }

    #[tokio::test]
    async fn test_insert_conflict_wins_over_missed_lookup() {
        let participants = Arc::new(RacingLookups {
            inner: InMemoryStore::new(),
        });
        let messages = Arc::new(InMemoryStore::new());
        let clock = Arc::new(ManualClock::default());
        ParticipantStore::insert(&participants.inner, Participant::new("Alice", 0))
            .await
            .unwrap();

        let registry = PresenceRegistry::new(participants.clone(), messages.clone(), clock);
        let err = registry.register("Alice").await.unwrap_err();
        assert!(matches!(err, Error::Conflict(name) if name == "Alice"));
        assert_eq!(messages.message_count(), 0);
        // the original registration is untouched
        assert_eq!(participants.list().await.unwrap().len(), 1);
    }
}
