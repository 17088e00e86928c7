//! Chat server configuration

use anyhow::Context;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::chat::{LivenessMonitor, MessageRouter, MonitorConfig, PresenceRegistry};
use crate::core::clock::Clock;
use crate::core::store::{MessageStore, ParticipantStore};

/// Configuration for the chat server
#[derive(Clone, Debug)]
pub struct ChatServerConfig {
    /// Address the HTTP server binds to
    pub bind_addr: SocketAddr,
    /// SQLite URL; the in-memory store is used when unset
    pub database_url: Option<String>,
    /// How often the liveness monitor sweeps
    pub sweep_interval: Duration,
    /// Participants silent for longer than this are evicted
    pub stale_threshold: Duration,
    /// Upper bound for evicting a single participant
    pub eviction_timeout: Duration,
    /// Upper bound for handling one HTTP request
    pub request_timeout: Duration,
}

impl Default for ChatServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            database_url: None,
            sweep_interval: Duration::from_secs(15),
            stale_threshold: Duration::from_secs(10),
            eviction_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(10),
        }
    }
}

fn env_parse<T>(key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("Invalid value for {}: {:?}", key, raw)),
        _ => Ok(None),
    }
}

fn env_secs(key: &str) -> anyhow::Result<Option<Duration>> {
    Ok(env_parse::<u64>(key)?.map(Duration::from_secs))
}

impl ChatServerConfig {
    /// Defaults overridden by `CHAT_*` environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(addr) = env_parse::<SocketAddr>("CHAT_BIND_ADDR")? {
            config.bind_addr = addr;
        }
        config.database_url = std::env::var("CHAT_DATABASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());
        if let Some(d) = env_secs("CHAT_SWEEP_INTERVAL_SECS")? {
            config.sweep_interval = d;
        }
        if let Some(d) = env_secs("CHAT_STALE_THRESHOLD_SECS")? {
            config.stale_threshold = d;
        }
        if let Some(d) = env_secs("CHAT_EVICTION_TIMEOUT_SECS")? {
            config.eviction_timeout = d;
        }
        if let Some(d) = env_secs("CHAT_REQUEST_TIMEOUT_SECS")? {
            config.request_timeout = d;
        }

        if config.sweep_interval.is_zero() {
            anyhow::bail!("CHAT_SWEEP_INTERVAL_SECS must be greater than zero");
        }

        Ok(config)
    }

    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            sweep_interval: self.sweep_interval,
            stale_threshold: self.stale_threshold,
            eviction_timeout: self.eviction_timeout,
        }
    }
}

/// App state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: ChatServerConfig,
    pub presence: Arc<PresenceRegistry>,
    pub messages: Arc<MessageRouter>,
    pub monitor: Arc<LivenessMonitor>,
}

impl AppState {
    /// Wire the chat services over the given stores
    pub fn new(
        config: ChatServerConfig,
        participants: Arc<dyn ParticipantStore>,
        messages: Arc<dyn MessageStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let presence = Arc::new(PresenceRegistry::new(
            participants.clone(),
            messages.clone(),
            clock.clone(),
        ));
        let router = Arc::new(MessageRouter::new(
            presence.clone(),
            messages.clone(),
            clock.clone(),
        ));
        let monitor = Arc::new(LivenessMonitor::new(
            participants,
            messages,
            clock,
            config.monitor_config(),
        ));

        Self {
            config,
            presence,
            messages: router,
            monitor,
        }
    }
}
