//! Engine lifecycle: a single start attempt, observable state, fail-fast access.

use super::{EngineHandle, EngineLauncher};
use crate::error::{Error, Result, StartupError};
use crate::types::EngineState;
use tokio::sync::{OnceCell, watch};

/// Owns the engine handle and its startup state
///
/// State moves `Uninitialized → Starting → Ready | Failed` exactly once.
/// There is no retry: a failed start is terminal for the process.
#[derive(Debug)]
pub struct EngineLifecycle {
    state_tx: watch::Sender<EngineState>,
    handle: OnceCell<EngineHandle>,
}

impl Default for EngineLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineLifecycle {
    /// Create a lifecycle in the `Uninitialized` state
    pub fn new() -> Self {
        let (state_tx, _rx) = watch::channel(EngineState::Uninitialized);
        Self {
            state_tx,
            handle: OnceCell::new(),
        }
    }

    /// Start the engine through `launcher`
    ///
    /// # Errors
    ///
    /// Returns [`StartupError::AlreadyStarted`] if a start was already
    /// attempted, or the launcher's error after moving to `Failed`.
    pub async fn start(
        &self,
        launcher: &dyn EngineLauncher,
    ) -> std::result::Result<EngineHandle, StartupError> {
        let mut claimed = false;
        self.state_tx.send_if_modified(|state| {
            if *state == EngineState::Uninitialized {
                *state = EngineState::Starting;
                claimed = true;
                true
            } else {
                false
            }
        });
        if !claimed {
            return Err(StartupError::AlreadyStarted);
        }

        tracing::info!("Starting download engine");

        match launcher.launch().await {
            Ok(handle) => {
                // Only the caller that claimed Starting reaches this point
                let _ = self.handle.set(handle.clone());
                self.state_tx.send_replace(EngineState::Ready);
                tracing::info!(engine = handle.name(), "Download engine ready");
                Ok(handle)
            }
            Err(e) => {
                tracing::error!(error = %e, "Download engine failed to start");
                self.state_tx
                    .send_replace(EngineState::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    /// Current state
    pub fn state(&self) -> EngineState {
        self.state_tx.borrow().clone()
    }

    /// Watch state transitions
    pub fn watch(&self) -> watch::Receiver<EngineState> {
        self.state_tx.subscribe()
    }

    /// The live handle, or [`Error::EngineNotReady`] unless the state is `Ready`
    pub fn handle(&self) -> Result<EngineHandle> {
        match (&*self.state_tx.borrow(), self.handle.get()) {
            (EngineState::Ready, Some(handle)) => Ok(handle.clone()),
            _ => Err(Error::EngineNotReady),
        }
    }
}
