//! Applying engine events to queue state, notifications and the local directory.
//!
//! Events are applied one at a time, in the order the engine emitted them.
//! `change` snapshots are the only thing that alters queue membership.

use crate::local_dir::LocalDirectory;
use crate::notify::Notifier;
use crate::types::{DownloadItem, EngineEvent};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, broadcast};
use tokio_util::sync::CancellationToken;

use super::DownloadOrchestrator;

/// Applies engine events; owns write access to the queue
pub(crate) struct Reconciler {
    queue: Arc<RwLock<Vec<DownloadItem>>>,
    notifier: Arc<dyn Notifier>,
    local_dir: Arc<dyn LocalDirectory>,
    completion_timeout: Duration,
}

impl Reconciler {
    pub(crate) fn for_orchestrator(orchestrator: &DownloadOrchestrator) -> Self {
        Self {
            queue: orchestrator.queue.clone(),
            notifier: orchestrator.deps.notifier.clone(),
            local_dir: orchestrator.deps.local_dir.clone(),
            completion_timeout: orchestrator.config.notifications.completion_timeout,
        }
    }

    pub(crate) async fn apply(&self, event: EngineEvent) {
        tracing::debug!(event = event.name(), "Reconciling engine event");

        match event {
            EngineEvent::Change(items) => {
                *self.queue.write().await = items;
            }
            EngineEvent::ItemAddFailed(failure) => {
                self.notifier.error(
                    &format!("Failed to start downloading {}.", failure.item.name),
                    Some(&format!("URL: {}", failure.item.url)),
                );
            }
            EngineEvent::ItemCompleted(item) => {
                self.notifier.info(
                    &format!("{} has been downloaded successfully.", item.name),
                    Some(&format!("Full Path: {}", item.local_path().display())),
                    false,
                    Some(self.completion_timeout),
                );
                self.refresh_dir(&item.local_dir).await;
            }
            EngineEvent::ItemCancelled(item) => {
                self.refresh_dir(&item.local_dir).await;
            }
            EngineEvent::ItemPauseFailed(failure) => {
                self.notifier.warn(
                    &format!("Unable to pause download for {}.", failure.item.name),
                    None,
                );
            }
            EngineEvent::ItemResumeFailed(failure) => {
                self.notifier.warn(
                    &format!("Unable to resume download for {}.", failure.item.name),
                    None,
                );
            }
            EngineEvent::ItemCancelFailed(failure) => {
                self.notifier.warn(
                    &format!("Unable to cancel download for {}.", failure.item.name),
                    None,
                );
            }
        }
    }

    /// Reload `dir` only if it is the directory currently being viewed
    async fn refresh_dir(&self, dir: &Path) {
        let current = self.local_dir.current_dir().await;
        if current != dir {
            tracing::debug!(
                dir = %dir.display(),
                current = %current.display(),
                "Skipping reload of directory not being viewed"
            );
            return;
        }

        if let Err(e) = self.local_dir.reload(dir).await {
            tracing::warn!(dir = %dir.display(), error = %e, "Failed to reload local directory");
        }
    }

    /// Drain `events` until the channel closes or `cancel` fires
    pub(crate) fn spawn(
        self,
        mut events: broadcast::Receiver<EngineEvent>,
        cancel: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    received = events.recv() => match received {
                        Ok(event) => self.apply(event).await,
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            // The next change snapshot restores the queue
                            tracing::warn!(skipped, "Reconciler lagged behind engine events");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
            tracing::debug!("Reconciler stopped");
        })
    }
}

impl DownloadOrchestrator {
    /// Apply a single engine event immediately
    ///
    /// Same logic the background reconciler runs for every engine event.
    pub(crate) async fn reconcile(&self, event: EngineEvent) {
        Reconciler::for_orchestrator(self).apply(event).await;
    }
}
