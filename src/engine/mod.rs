//! Download engine boundary.
//!
//! The engine is an external long-running process that performs the actual
//! transfers. This crate only sees it through [`DownloadEngine`]: it accepts
//! URIs, accepts per-batch options and emits [`EngineEvent`]s.
//!
//! - [`lifecycle`] - `Uninitialized → Starting → Ready | Failed` state tracking
//! - [`aria2`] - aria2c adapter speaking JSON-RPC

pub mod aria2;
pub mod lifecycle;

pub use aria2::{Aria2Client, Aria2Engine, Aria2Launcher};
pub use lifecycle::EngineLifecycle;

use crate::error::{Result, StartupError};
use crate::types::{DownloadItem, EngineConfig, EngineEvent};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// Live connection to a download engine
///
/// Every command is fire-and-forget: the call returns immediately and the
/// outcome is observed only through the event stream. A failed pause, for
/// example, shows up as [`EngineEvent::ItemPauseFailed`].
#[async_trait]
pub trait DownloadEngine: Send + Sync {
    /// Replace the options used for the next submissions. Last call wins.
    fn configure(&self, config: EngineConfig);

    /// Hand `uris` to the engine, saving into `destination_dir`
    fn submit(&self, uris: Vec<String>, destination_dir: &Path);

    /// Receive lifecycle events in emission order
    fn subscribe(&self) -> tokio::sync::broadcast::Receiver<EngineEvent>;

    /// Pause a transfer
    fn pause(&self, item: &DownloadItem);

    /// Resume a paused transfer
    fn resume(&self, item: &DownloadItem);

    /// Cancel a transfer
    fn cancel(&self, item: &DownloadItem);

    /// Stop the engine and release its resources
    async fn shutdown(&self) -> Result<()>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// Cloneable handle to the single live engine
#[derive(Clone)]
pub struct EngineHandle(Arc<dyn DownloadEngine>);

impl EngineHandle {
    /// Wrap an engine implementation
    pub fn new<E: DownloadEngine + 'static>(engine: E) -> Self {
        Self(Arc::new(engine))
    }

    /// Wrap an already shared engine
    pub fn from_arc(engine: Arc<dyn DownloadEngine>) -> Self {
        Self(engine)
    }
}

impl std::ops::Deref for EngineHandle {
    type Target = dyn DownloadEngine;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl std::fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("EngineHandle").field(&self.0.name()).finish()
    }
}

/// Brings an engine up
#[async_trait]
pub trait EngineLauncher: Send + Sync {
    /// Start the engine and return a handle once it accepts commands
    async fn launch(&self) -> std::result::Result<EngineHandle, StartupError>;
}
