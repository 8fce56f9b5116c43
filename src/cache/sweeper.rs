//! Background cache sweeper
//!
//! Expired search results are already ignored on read, but keys that are
//! never queried again would otherwise stay in memory. The sweeper purges them
//! on a fixed interval until it is shut down.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use super::SearchCache;

/// Configuration for the sweep interval
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    /// Time between purges
    pub interval: Duration,
    /// Whether the sweeper runs at all
    pub enabled: bool,
}

impl SweeperConfig {
    /// Whether [`spawn_sweeper`] will start a task for this config
    pub fn is_active(&self) -> bool {
        self.enabled && !self.interval.is_zero()
    }
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            enabled: true,
        }
    }
}

/// Handle for stopping the background sweeper
pub struct SweeperHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: Option<JoinHandle<()>>,
}

impl SweeperHandle {
    /// Whether a sweep task was started
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stops the sweeper and waits for the task to exit
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        if let Some(task) = self.task {
            let _ = task.await;
        }
    }
}

/// Spawns the sweeper on the current tokio runtime
///
/// With `enabled = false` (or a zero interval) no task is spawned and the
/// returned handle is inert.
pub fn spawn_sweeper(cache: Arc<dyn SearchCache>, config: SweeperConfig) -> SweeperHandle {
    let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

    if !config.is_active() {
        return SweeperHandle {
            shutdown_tx,
            task: None,
        };
    }

    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(config.interval);
        // Skip the first tick (immediate)
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let removed = cache.purge_expired();
                    if removed > 0 {
                        debug!(removed, remaining = cache.len(), "Purged expired search results");
                    }
                }
                _ = shutdown_rx.recv() => {
                    break;
                }
            }
        }
    });

    SweeperHandle {
        shutdown_tx,
        task: Some(task),
    }
}
