//! Startup and shutdown coordination.

use crate::config::Config;
use crate::engine::{EngineHandle, EngineLauncher};
use crate::error::{Error, Result, StartupError};
use std::path::PathBuf;

use super::reconcile::Reconciler;
use super::{DownloadOrchestrator, OrchestratorDeps};

/// Options for [`DownloadOrchestrator::startup`]
#[derive(Debug, Clone, Default)]
pub struct StartupOptions {
    /// Local directory to open instead of `download.local_dir` from the config
    pub local_dir: Option<PathBuf>,
    /// Submit every not-yet-downloaded remote entry once startup succeeds
    pub auto_download: bool,
}

impl DownloadOrchestrator {
    /// Start the engine and begin reconciling its events
    ///
    /// # Errors
    ///
    /// Startup failure is fatal. It is reported through the notifier at error
    /// level and returned; the host is expected to exit.
    pub async fn start_engine(&self, launcher: &dyn EngineLauncher) -> Result<EngineHandle> {
        match self.lifecycle.start(launcher).await {
            Ok(handle) => {
                let events = handle.subscribe();
                let task = Reconciler::for_orchestrator(self).spawn(events, self.cancel.child_token());
                *self.reconciler.lock().await = Some(task);
                Ok(handle)
            }
            Err(StartupError::AlreadyStarted) => Err(StartupError::AlreadyStarted.into()),
            Err(e) => {
                self.deps
                    .notifier
                    .error("Can not start Aria2 daemon.", Some(&e.to_string()));
                Err(e.into())
            }
        }
    }

    /// Bring the orchestrator up
    ///
    /// Starts the engine and loads the initial local directory concurrently.
    /// An invalid `config` is rejected before anything is launched. An engine
    /// failure aborts startup. A directory failure is reported as a
    /// warning and only disables auto-download.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use ftpsync_dl::{Config, DownloadOrchestrator, OrchestratorDeps, StartupOptions};
    /// use ftpsync_dl::engine::Aria2Launcher;
    /// use ftpsync_dl::local_dir::FsDirectoryStore;
    /// use ftpsync_dl::notify::TracingNotifier;
    /// use ftpsync_dl::remote::StaticRemoteListing;
    /// use std::sync::Arc;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let config = Config::default();
    ///     let deps = OrchestratorDeps {
    ///         notifier: Arc::new(TracingNotifier),
    ///         local_dir: Arc::new(FsDirectoryStore::new()),
    ///         remote: Arc::new(StaticRemoteListing::new("ftp://ftp.example.com", None, None)),
    ///     };
    ///     let launcher = Aria2Launcher::new(config.engine.clone());
    ///
    ///     let orchestrator =
    ///         match DownloadOrchestrator::startup(config, deps, &launcher, StartupOptions::default()).await {
    ///             Ok(o) => o,
    ///             Err(_) => std::process::exit(1),
    ///         };
    ///     ftpsync_dl::run_until_shutdown(orchestrator).await.ok();
    /// }
    /// ```
    pub async fn startup(
        config: Config,
        deps: OrchestratorDeps,
        launcher: &dyn EngineLauncher,
        options: StartupOptions,
    ) -> Result<Self> {
        let local_dir = options
            .local_dir
            .clone()
            .unwrap_or_else(|| config.download.local_dir.clone());
        let orchestrator = Self::new(config, deps)?;

        tracing::info!(local_dir = %local_dir.display(), "Starting up");

        let (engine, local) = tokio::join!(
            orchestrator.start_engine(launcher),
            orchestrator.deps.local_dir.reload(&local_dir),
        );
        engine?;

        match local {
            Ok(()) => {
                if options.auto_download {
                    orchestrator.auto_download().await?;
                }
            }
            Err(e) => {
                tracing::warn!(
                    local_dir = %local_dir.display(),
                    error = %e,
                    "Initial local directory load failed, skipping auto-download"
                );
                orchestrator.deps.notifier.warn(
                    &format!("Unable to open {}.", local_dir.display()),
                    Some(&e.to_string()),
                );
            }
        }

        Ok(orchestrator)
    }

    /// Stop reconciling and shut the engine down
    ///
    /// Transfers still in the queue are abandoned; hosts should ask the user
    /// first when [`is_queue_empty`](Self::is_queue_empty) is false.
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("Initiating shutdown");

        if !self.is_queue_empty().await {
            tracing::warn!("Shutting down with downloads still in the queue");
        }

        self.cancel.cancel();
        if let Some(task) = self.reconciler.lock().await.take()
            && let Err(e) = task.await
        {
            tracing::warn!(error = %e, "Reconciler task ended abnormally");
        }

        match self.lifecycle.handle() {
            Ok(engine) => engine.shutdown().await?,
            Err(Error::EngineNotReady) => {
                tracing::debug!("Engine was never ready, nothing to shut down");
            }
            Err(e) => return Err(e),
        }

        tracing::info!("Shutdown complete");
        Ok(())
    }
}
