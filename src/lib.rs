//! # ftpsync-dl
//!
//! Download orchestration between a remote FTP listing, an aria2 download
//! engine and a local directory.
//!
//! The crate decides *what* to download and keeps its view of the queue in
//! sync with the engine. The transfers themselves are done by aria2c, which
//! is driven over JSON-RPC.
//!
//! - Remote entries are tagged as not queued, downloading or downloaded, so
//!   the same file is never submitted twice
//! - Submissions are fire-and-forget; the engine reports back through events
//! - Engine events update the queue, raise notifications and refresh the
//!   local directory view
//!
//! ## Quick Start
//!
//! ```no_run
//! use ftpsync_dl::engine::Aria2Launcher;
//! use ftpsync_dl::local_dir::FsDirectoryStore;
//! use ftpsync_dl::notify::TracingNotifier;
//! use ftpsync_dl::remote::StaticRemoteListing;
//! use ftpsync_dl::{Config, DownloadOrchestrator, OrchestratorDeps, StartupOptions};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!
//!     let remote = Arc::new(StaticRemoteListing::new("ftp://ftp.example.com", None, None));
//!     remote.set_listing("/pub", vec!["a.zip".to_string(), "b.zip".to_string()]);
//!
//!     let deps = OrchestratorDeps {
//!         notifier: Arc::new(TracingNotifier),
//!         local_dir: Arc::new(FsDirectoryStore::new()),
//!         remote,
//!     };
//!     let launcher = Aria2Launcher::new(config.engine.clone());
//!
//!     let orchestrator =
//!         DownloadOrchestrator::startup(config, deps, &launcher, StartupOptions::default()).await?;
//!
//!     for entry in orchestrator.suggestions().await.entries() {
//!         println!("{}: {:?}", entry.name, entry.suggestion);
//!     }
//!     orchestrator.add_downloads(&["a.zip"]).await?;
//!
//!     ftpsync_dl::run_until_shutdown(orchestrator).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Download engine boundary and the aria2 adapter
pub mod engine;
/// Error types
pub mod error;
/// Local directory boundary
pub mod local_dir;
/// User-facing notifications
pub mod notify;
/// Download orchestration
pub mod orchestrator;
/// Remote listing boundary
pub mod remote;
/// Request building
pub mod request;
/// Download suggestions
pub mod suggestion;
/// Core types
pub mod types;
/// URL helpers
pub mod utils;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

pub use config::Config;
pub use error::{Error, Result, StartupError};
pub use orchestrator::{DownloadOrchestrator, OrchestratorDeps, StartupOptions};
pub use types::{
    Credentials, DownloadItem, EngineConfig, EngineEvent, EngineState, ItemFailure, ItemStatus,
    Notification, NotificationLevel, RemoteEntry, Suggestion,
};

/// Run until SIGTERM or SIGINT (Ctrl+C), then shut the orchestrator down
///
/// Transfers still in flight are abandoned with a warning in the log.
///
/// # Example
///
/// ```no_run
/// # async fn example(orchestrator: ftpsync_dl::DownloadOrchestrator) -> ftpsync_dl::Result<()> {
/// ftpsync_dl::run_until_shutdown(orchestrator).await?;
/// # Ok(())
/// # }
/// ```
pub async fn run_until_shutdown(orchestrator: DownloadOrchestrator) -> Result<()> {
    wait_for_signal().await;
    orchestrator.shutdown().await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration can fail in restricted environments
    match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => tracing::info!("Received SIGTERM"),
                _ = sigint.recv() => tracing::info!("Received SIGINT"),
            }
        }
        (term, int) => {
            if let Err(e) = term.as_ref().and(int.as_ref()) {
                tracing::warn!(error = %e, "Signal handler registration failed, falling back to Ctrl+C");
            }
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C"),
        Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl+C"),
    }
}
