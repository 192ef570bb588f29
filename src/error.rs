//! Error types for ftpsync-dl
//!
//! Two layers of failure exist in this crate:
//! - [`StartupError`] - the download engine could not be brought up. This is the
//!   only fatal condition; hosts are expected to terminate after reporting it.
//! - [`Error`] - everything else. Per-item engine failures never surface here,
//!   they arrive as [`EngineEvent`](crate::types::EngineEvent)s instead.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for ftpsync-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for ftpsync-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "engine.rpc_port")
        key: Option<String>,
    },

    /// The engine is not in the `Ready` state, submissions are rejected
    #[error("download engine is not ready")]
    EngineNotReady,

    /// Engine startup failed
    #[error("engine startup failed: {0}")]
    Startup(#[from] StartupError),

    /// The engine answered a JSON-RPC call with an error object
    #[error("engine RPC error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code
        code: i64,
        /// Error message reported by the engine
        message: String,
    },

    /// Network error while talking to the engine
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Queue item not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Reasons the download engine failed to start
#[derive(Debug, Error)]
pub enum StartupError {
    /// `start` was called on a lifecycle that already left `Uninitialized`
    #[error("engine start was already attempted")]
    AlreadyStarted,

    /// The engine settings cannot work (zero event buffer or poll interval)
    #[error("invalid engine settings: {0}")]
    InvalidSettings(String),

    /// The engine binary could not be located
    #[error("engine binary not found: {0}")]
    BinaryNotFound(String),

    /// The engine process could not be spawned
    #[error("failed to spawn engine process: {0}")]
    Spawn(#[source] std::io::Error),

    /// The engine did not answer within the startup timeout
    #[error("engine did not become ready within {0:?}")]
    Timeout(Duration),

    /// The engine answered, but not the way a ready engine should
    #[error("engine handshake failed: {0}")]
    Rpc(String),
}
