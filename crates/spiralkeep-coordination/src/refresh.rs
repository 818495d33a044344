//! Periodic status refresh
//!
//! Recomputes `community_status()` on a fixed interval and publishes it on a
//! watch channel. The consumer owns the handle and must stop it; dropping the
//! handle cancels the task as well.

use crate::status::CommunityStatus;
use crate::system::CoordinationSystem;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub struct StatusRefresher;

impl StatusRefresher {
    /// Start refreshing every `interval`. The first snapshot is taken immediately.
    pub fn spawn(system: Arc<Mutex<CoordinationSystem>>, interval: Duration) -> RefreshHandle {
        let cancel = CancellationToken::new();
        let (tx, rx) = watch::channel(None);
        let task = tokio::spawn(run(system, interval, tx, cancel.clone()));
        RefreshHandle {
            cancel,
            task: Some(task),
            status: rx,
        }
    }

    /// Start refreshing at the session's configured interval.
    pub async fn spawn_configured(system: Arc<Mutex<CoordinationSystem>>) -> RefreshHandle {
        let interval = system.lock().await.config().refresh_interval();
        Self::spawn(system, interval)
    }
}

async fn run(
    system: Arc<Mutex<CoordinationSystem>>,
    interval: Duration,
    tx: watch::Sender<Option<CommunityStatus>>,
    cancel: CancellationToken,
) {
    info!("Status refresher started ({:?} interval)", interval);
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let status = {
                    let mut system = system.lock().await;
                    if system.config().refresh.sweep_expired {
                        system.sweep_expired();
                    }
                    system.community_status()
                };
                if tx.send(Some(status)).is_err() {
                    debug!("Status receiver gone");
                    break;
                }
            }
        }
    }
    info!("Status refresher stopped");
}

pub struct RefreshHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
    status: watch::Receiver<Option<CommunityStatus>>,
}

impl RefreshHandle {
    /// Most recent snapshot, if one has been taken yet.
    pub fn latest(&self) -> Option<CommunityStatus> {
        self.status.borrow().clone()
    }

    /// Wait for the next snapshot. False once the refresher has stopped.
    pub async fn changed(&mut self) -> bool {
        self.status.changed().await.is_ok()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Cancel the timer and wait for the task to exit.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
