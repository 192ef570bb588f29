//! Download orchestration split into focused submodules.
//!
//! The `DownloadOrchestrator` struct and its methods are organized by domain:
//! - [`actions`] - Suggestions, submission and per-item control
//! - [`reconcile`] - Applying engine events to queue, notifications and directory
//! - [`startup`] - Engine start, initial directory load, auto-download and shutdown

mod actions;
mod reconcile;
mod startup;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use startup::StartupOptions;

use crate::config::Config;
use crate::engine::EngineLifecycle;
use crate::error::Result;
use crate::local_dir::LocalDirectory;
use crate::notify::Notifier;
use crate::remote::RemoteListing;
use crate::types::DownloadItem;
use std::sync::Arc;
use std::sync::atomic::AtomicU32;

/// External collaborators the orchestrator talks to
#[derive(Clone)]
pub struct OrchestratorDeps {
    /// Where user-facing messages go
    pub notifier: Arc<dyn Notifier>,
    /// The local directory being mirrored into
    pub local_dir: Arc<dyn LocalDirectory>,
    /// The remote directory being browsed
    pub remote: Arc<dyn RemoteListing>,
}

/// Coordinates user selections, the download engine and local state
///
/// Cloneable; all fields are shared. The queue is written only by the
/// reconciler in response to engine events.
#[derive(Clone)]
pub struct DownloadOrchestrator {
    /// Engine handle and its startup state
    pub(crate) lifecycle: Arc<EngineLifecycle>,
    /// Last queue snapshot reported by the engine
    pub(crate) queue: Arc<tokio::sync::RwLock<Vec<DownloadItem>>>,
    /// External collaborators
    pub(crate) deps: OrchestratorDeps,
    /// Static configuration
    pub(crate) config: Arc<Config>,
    /// Connections per file for the next submission (runtime-mutable)
    pub(crate) split: Arc<AtomicU32>,
    /// Running reconciler task, set once the engine is ready
    pub(crate) reconciler: Arc<tokio::sync::Mutex<Option<tokio::task::JoinHandle<()>>>>,
    /// Stops the reconciler on shutdown
    pub(crate) cancel: tokio_util::sync::CancellationToken,
}

impl DownloadOrchestrator {
    /// Create an orchestrator whose engine has not been started yet
    ///
    /// Submissions fail with [`Error::EngineNotReady`](crate::Error::EngineNotReady)
    /// until [`start_engine`](Self::start_engine) succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) when `config` fails
    /// [`Config::validate`].
    pub fn new(config: Config, deps: OrchestratorDeps) -> Result<Self> {
        config.validate()?;
        let split = Arc::new(AtomicU32::new(config.download.split));
        Ok(Self {
            lifecycle: Arc::new(EngineLifecycle::new()),
            queue: Arc::new(tokio::sync::RwLock::new(Vec::new())),
            deps,
            config: Arc::new(config),
            split,
            reconciler: Arc::new(tokio::sync::Mutex::new(None)),
            cancel: tokio_util::sync::CancellationToken::new(),
        })
    }

    /// Engine startup state
    pub fn engine_state(&self) -> crate::types::EngineState {
        self.lifecycle.state()
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }
}
