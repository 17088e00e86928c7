//! Liveness Monitor
//!
//! Recurring sweep that evicts participants whose heartbeat is older than
//! the stale threshold and announces their departure.
//!
//! The sweep interval is longer than the threshold, so a participant can
//! stay listed for up to `stale_threshold + sweep_interval` after its last
//! heartbeat. Only eventual eviction is promised.

use crate::core::clock::{wall_clock_time, Clock};
use crate::core::models::{Message, Participant, LEAVE_TEXT};
use crate::core::store::{MessageStore, ParticipantStore, StoreError, StoreResult};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{debug, error, info, warn};

#[derive(Clone, Debug)]
pub struct MonitorConfig {
    pub sweep_interval: Duration,
    pub stale_threshold: Duration,
    pub eviction_timeout: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(15),
            stale_threshold: Duration::from_secs(10),
            eviction_timeout: Duration::from_secs(5),
        }
    }
}

/// Outcome of one sweep
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    pub evicted: Vec<String>,
    pub failed: Vec<String>,
}

pub struct LivenessMonitor {
    participants: Arc<dyn ParticipantStore>,
    messages: Arc<dyn MessageStore>,
    clock: Arc<dyn Clock>,
    config: MonitorConfig,
}

impl LivenessMonitor {
    pub fn new(
        participants: Arc<dyn ParticipantStore>,
        messages: Arc<dyn MessageStore>,
        clock: Arc<dyn Clock>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            participants,
            messages,
            clock,
            config,
        }
    }

    /// Run one pass. Never fails: per-participant errors are logged and
    /// reported without stopping the others.
    pub async fn sweep(&self) -> SweepReport {
        let threshold = i64::try_from(self.config.stale_threshold.as_millis()).unwrap_or(i64::MAX);
        let cutoff = self.clock.now_millis().saturating_sub(threshold);

        let stale = match self.participants.find_stale_before(cutoff).await {
            Ok(stale) => stale,
            Err(e) => {
                error!("[Monitor] Failed to list stale participants: {}", e);
                return SweepReport::default();
            }
        };

        if stale.is_empty() {
            debug!("[Monitor] Sweep found no stale participants");
            return SweepReport::default();
        }

        let outcomes = join_all(stale.into_iter().map(|participant| async move {
            let result = timeout(self.config.eviction_timeout, self.evict(&participant)).await;
            match result {
                Ok(Ok(())) => {
                    info!("[Monitor] {} left (stale)", participant.name);
                    Ok(participant.name)
                }
                Ok(Err(e)) => {
                    warn!("[Monitor] Failed to evict {}: {}", participant.name, e);
                    Err(participant.name)
                }
                Err(_) => {
                    warn!(
                        "[Monitor] Evicting {} timed out after {:?}",
                        participant.name, self.config.eviction_timeout
                    );
                    Err(participant.name)
                }
            }
        }))
        .await;

        let mut report = SweepReport::default();
        for outcome in outcomes {
            match outcome {
                Ok(name) => report.evicted.push(name),
                Err(name) => report.failed.push(name),
            }
        }
        report
    }

    async fn evict(&self, participant: &Participant) -> StoreResult<()> {
        let departure = Message::status(
            participant.name.as_str(),
            LEAVE_TEXT,
            wall_clock_time(self.clock.now()),
        );
        self.messages.insert(departure).await?;

        match self.participants.delete_by_name(&participant.name).await {
            // removed concurrently; the departure is still recorded once by us
            Err(StoreError::NotFound(_)) => Ok(()),
            other => other,
        }
    }

    /// Sweep every `sweep_interval` until `shutdown` fires
    pub fn spawn(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(self.config.sweep_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // first tick completes immediately; the first sweep runs one interval after start
            ticker.tick().await;

            info!(
                "[Monitor] Started (interval {:?}, stale after {:?})",
                self.config.sweep_interval, self.config.stale_threshold
            );

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let report = self.sweep().await;
                        if !report.failed.is_empty() {
                            warn!("[Monitor] {} eviction(s) failed this sweep", report.failed.len());
                        }
                    }
                    _ = shutdown.recv() => {
                        info!("[Monitor] Stopping");
                        break;
                    }
                }
            }
        })
    }
}
