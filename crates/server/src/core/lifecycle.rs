//! Process lifecycle: owns background tasks and fans out the shutdown signal.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::chat::LivenessMonitor;

pub struct Lifecycle {
    shutdown_tx: broadcast::Sender<()>,
    tasks: Vec<JoinHandle<()>>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            shutdown_tx,
            tasks: Vec::new(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Start the periodic liveness sweep; it stops on shutdown
    pub fn start_monitor(&mut self, monitor: Arc<LivenessMonitor>) {
        let handle = monitor.spawn(self.subscribe());
        self.tasks.push(handle);
    }

    /// Trigger shutdown on Ctrl-C
    pub fn listen_for_ctrl_c(&self) {
        let shutdown_tx = self.shutdown_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl-C: {}", e);
                return;
            }
            info!("Received Ctrl-C - initiating graceful shutdown");
            let _ = shutdown_tx.send(());
        });
    }

    /// Resolves once shutdown has been requested. Suitable for `with_graceful_shutdown`.
    pub fn shutdown_signal(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.subscribe();
        async move {
            let _ = rx.recv().await;
        }
    }

    /// Signal every task to stop and wait for them
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        for task in self.tasks {
            if let Err(e) = task.await {
                warn!("Background task ended abnormally: {}", e);
            }
        }
        info!("All background tasks stopped");
    }
}
