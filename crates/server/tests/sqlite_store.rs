use server::core::models::{Message, MessageType, Participant, BROADCAST};
use server::core::store::{MessageFilter, MessageStore, ParticipantStore, SqliteStore, StoreError};
use server::core::ChatServerConfig;
use server::open_stores;
use tempfile::tempdir;

fn message(from: &str, to: &str, text: &str, message_type: MessageType) -> Message {
    Message {
        from: from.into(),
        to: to.into(),
        text: text.into(),
        message_type,
        time: "12:34:56".into(),
    }
}

#[tokio::test]
async fn test_participants_roundtrip_and_unique_names() {
    let dir = tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("chat.sqlite").display());
    let store = SqliteStore::connect(&url).await.unwrap();

    ParticipantStore::insert(&store, Participant::new("Alice", 1_000))
        .await
        .unwrap();
    let err = ParticipantStore::insert(&store, Participant::new("Alice", 2_000))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict(name) if name == "Alice"));

    store.update_heartbeat("Alice", 500).await.unwrap();
    assert_eq!(
        store.find_by_name("Alice").await.unwrap(),
        Some(Participant::new("Alice", 1_000))
    );
    store.update_heartbeat("Alice", 5_000).await.unwrap();
    assert_eq!(
        store.find_by_name("Alice").await.unwrap().map(|p| p.last_heartbeat),
        Some(5_000)
    );
    assert!(matches!(
        store.update_heartbeat("Bob", 1).await,
        Err(StoreError::NotFound(_))
    ));

    ParticipantStore::insert(&store, Participant::new("Bob", 100))
        .await
        .unwrap();
    let stale = store.find_stale_before(1_000).await.unwrap();
    assert_eq!(stale, vec![Participant::new("Bob", 100)]);

    store.delete_by_name("Bob").await.unwrap();
    assert!(matches!(
        store.delete_by_name("Bob").await,
        Err(StoreError::NotFound(_))
    ));
    assert_eq!(store.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_message_visibility_in_sql() {
    let store = SqliteStore::connect("sqlite::memory:").await.unwrap();

    let log = [
        message("Alice", BROADCAST, "joined", MessageType::Status),
        message("Alice", "Bob", "secret", MessageType::PrivateMessage),
        message("Bob", "Alice", "public reply", MessageType::Message),
        message("Carol", BROADCAST, "to all", MessageType::PrivateMessage),
        message("Bob", "Dave", "for dave", MessageType::PrivateMessage),
    ];
    for m in log.iter().cloned() {
        MessageStore::insert(&store, m).await.unwrap();
    }

    let all = store.query(&MessageFilter::All, None).await.unwrap();
    assert_eq!(all, log.to_vec());

    let carol = store
        .query(&MessageFilter::VisibleTo("Carol".into()), None)
        .await
        .unwrap();
    let texts: Vec<_> = carol.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["joined", "public reply", "to all"]);

    let bob = store
        .query(&MessageFilter::VisibleTo("Bob".into()), Some(2))
        .await
        .unwrap();
    let texts: Vec<_> = bob.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["joined", "secret"]);
}

#[tokio::test]
async fn test_data_survives_reopen() {
    let dir = tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("chat.sqlite").display());

    {
        let store = SqliteStore::connect(&url).await.unwrap();
        ParticipantStore::insert(&store, Participant::new("Alice", 42))
            .await
            .unwrap();
        MessageStore::insert(&store, message("Alice", BROADCAST, "oi", MessageType::Message))
            .await
            .unwrap();
        store.close().await;
    }

    let store = SqliteStore::connect(&url).await.unwrap();
    assert!(store.find_by_name("Alice").await.unwrap().is_some());
    let messages = store.query(&MessageFilter::All, None).await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].text, "oi");
}

#[tokio::test]
async fn test_close_through_store_interface_releases_pool() {
    let dir = tempdir().unwrap();
    let config = ChatServerConfig {
        database_url: Some(format!(
            "sqlite://{}",
            dir.path().join("chat.sqlite").display()
        )),
        ..ChatServerConfig::default()
    };

    let (participants, messages) = open_stores(&config).await.unwrap();
    participants.insert(Participant::new("Alice", 1)).await.unwrap();
    participants.close().await;

    assert!(matches!(
        participants.list().await,
        Err(StoreError::Unexpected(_))
    ));
    assert!(messages.query(&MessageFilter::All, None).await.is_err());
}

#[tokio::test]
async fn test_in_memory_close_is_a_no_op() {
    let (participants, _messages) = open_stores(&ChatServerConfig::default()).await.unwrap();
    participants.insert(Participant::new("Alice", 1)).await.unwrap();
    participants.close().await;
    assert_eq!(participants.list().await.unwrap().len(), 1);
}
