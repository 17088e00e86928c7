//! Bate-Papo Chat Server Library
//!
//! Participants register a name, post and poll messages, and send
//! heartbeats. Silent participants are evicted by a background sweep.

pub mod chat;
pub mod core;

use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::core::clock::SystemClock;
use crate::core::store::{InMemoryStore, MessageStore, ParticipantStore, SqliteStore};
use crate::core::{AppState, ChatServerConfig, Lifecycle};

/// Open the configured backend, returning it under both store interfaces
pub async fn open_stores(
    config: &ChatServerConfig,
) -> anyhow::Result<(Arc<dyn ParticipantStore>, Arc<dyn MessageStore>)> {
    match &config.database_url {
        Some(url) => {
            let store = Arc::new(SqliteStore::connect(url).await?);
            let participants: Arc<dyn ParticipantStore> = store.clone();
            let messages: Arc<dyn MessageStore> = store;
            Ok((participants, messages))
        }
        None => {
            info!("No CHAT_DATABASE_URL set, using in-memory store");
            let store = Arc::new(InMemoryStore::new());
            let participants: Arc<dyn ParticipantStore> = store.clone();
            let messages: Arc<dyn MessageStore> = store;
            Ok((participants, messages))
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        // Already set, ignore
    }
}

pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    info!("=== Bate-Papo Chat Server ===");

    let config = ChatServerConfig::from_env()?;
    let (participants, messages) = open_stores(&config).await?;
    let state = AppState::new(
        config.clone(),
        participants.clone(),
        messages,
        Arc::new(SystemClock),
    );

    let mut lifecycle = Lifecycle::new();
    lifecycle.start_monitor(state.monitor.clone());
    lifecycle.listen_for_ctrl_c();

    let app = crate::core::router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Listening on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(lifecycle.shutdown_signal())
        .await?;

    lifecycle.shutdown().await;
    participants.close().await;
    info!("Server stopped");

    Ok(())
}
