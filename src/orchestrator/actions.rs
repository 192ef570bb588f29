//! User-initiated actions: suggestions, submission, per-item control and settings.

use crate::error::{Error, Result};
use crate::request::{RequestPlan, build_requests};
use crate::suggestion::{Suggestions, compute_suggestions};
use crate::types::{DownloadItem, EngineConfig};
use std::sync::atomic::Ordering;

use super::DownloadOrchestrator;

impl DownloadOrchestrator {
    /// Compute download suggestions for the current remote directory
    ///
    /// Always derived from the latest queue snapshot and both listings.
    pub async fn suggestions(&self) -> Suggestions {
        let queue = self.queue.read().await.clone();
        let local = self.deps.local_dir.listing().await;
        let remote = self.deps.remote.entries();
        compute_suggestions(&remote, &queue, &local)
    }

    /// Queue the selected remote entries for download
    ///
    /// Entries already downloading are skipped with one warning notification
    /// each. The rest are joined onto the remote base URL and handed to the
    /// engine, after replacing its options with the current split count and
    /// the remote login (anonymous when none was given).
    ///
    /// Submission is fire-and-forget: the returned plan says what was sent,
    /// not whether the engine accepted it. Rejections arrive as
    /// `item-add-failed` events.
    ///
    /// # Errors
    ///
    /// - [`Error::EngineNotReady`] if the engine has not finished starting
    /// - [`Error::Config`] if the remote address is not a valid URL
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use ftpsync_dl::DownloadOrchestrator;
    /// # async fn example(orchestrator: DownloadOrchestrator) -> ftpsync_dl::Result<()> {
    /// let plan = orchestrator.add_downloads(&["a.zip", "b.zip"]).await?;
    /// println!("submitted {}, skipped {}", plan.uris.len(), plan.skipped.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn add_downloads<S: AsRef<str>>(&self, names: &[S]) -> Result<RequestPlan> {
        let engine = self.lifecycle.handle()?;
        let remote_base = self.deps.remote.base_url()?;
        let local_dir = self.deps.local_dir.current_dir().await;

        let suggestions = self.suggestions().await;
        let plan = build_requests(names, &remote_base, &suggestions);

        for name in &plan.skipped {
            self.deps
                .notifier
                .warn(&format!("{} is in download queue already.", name), None);
        }

        if plan.is_empty() {
            tracing::debug!(skipped = plan.skipped.len(), "Nothing to submit");
            return Ok(plan);
        }

        engine.configure(EngineConfig {
            split: self.download_split(),
            credentials: self.deps.remote.credentials(),
        });
        engine.submit(plan.uris.clone(), &local_dir);

        tracing::info!(
            submitted = plan.uris.len(),
            skipped = plan.skipped.len(),
            local_dir = %local_dir.display(),
            "Submitted downloads"
        );

        Ok(plan)
    }

    /// Remote entries that are neither queued nor present locally
    pub async fn auto_selection(&self) -> Vec<String> {
        self.suggestions().await.should_download()
    }

    /// Submit every entry [`auto_selection`](Self::auto_selection) picks
    pub async fn auto_download(&self) -> Result<RequestPlan> {
        let selection = self.auto_selection().await;
        tracing::info!(count = selection.len(), "Auto-download selection");
        if selection.is_empty() {
            return Ok(RequestPlan::default());
        }
        self.add_downloads(&selection).await
    }

    /// Latest queue snapshot
    pub async fn queue(&self) -> Vec<DownloadItem> {
        self.queue.read().await.clone()
    }

    /// Whether no transfer is waiting, running or paused
    pub async fn is_queue_empty(&self) -> bool {
        !self.queue.read().await.iter().any(DownloadItem::is_in_flight)
    }

    /// Pause the in-flight transfer of `name`
    pub async fn pause(&self, name: &str) -> Result<()> {
        let engine = self.lifecycle.handle()?;
        let item = self.find_in_flight(name).await?;
        tracing::debug!(name, gid = %item.gid, "Pausing download");
        engine.pause(&item);
        Ok(())
    }

    /// Resume the paused transfer of `name`
    pub async fn resume(&self, name: &str) -> Result<()> {
        let engine = self.lifecycle.handle()?;
        let item = self.find_in_flight(name).await?;
        tracing::debug!(name, gid = %item.gid, "Resuming download");
        engine.resume(&item);
        Ok(())
    }

    /// Cancel the in-flight transfer of `name`
    pub async fn cancel(&self, name: &str) -> Result<()> {
        let engine = self.lifecycle.handle()?;
        let item = self.find_in_flight(name).await?;
        tracing::debug!(name, gid = %item.gid, "Cancelling download");
        engine.cancel(&item);
        Ok(())
    }

    /// Connections per file used for the next submission
    pub fn download_split(&self) -> u32 {
        self.split.load(Ordering::Relaxed)
    }

    /// Change the connections per file for later submissions
    pub fn set_download_split(&self, split: u32) -> Result<()> {
        if split == 0 {
            return Err(Error::Config {
                message: "split must be at least 1".to_string(),
                key: Some("download.split".to_string()),
            });
        }
        self.split.store(split, Ordering::Relaxed);
        tracing::info!(split, "Download split changed");
        Ok(())
    }

    async fn find_in_flight(&self, name: &str) -> Result<DownloadItem> {
        self.queue
            .read()
            .await
            .iter()
            .find(|item| item.name == name && item.is_in_flight())
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("no active download named {}", name)))
    }
}
