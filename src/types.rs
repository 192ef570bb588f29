//! Core types for ftpsync-dl

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// State of a transfer as reported by the engine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    /// Accepted by the engine, waiting for a slot
    Waiting,
    /// Currently transferring
    Active,
    /// Paused by the user
    Paused,
    /// Stopped because of an error
    Error,
    /// Transfer finished
    Complete,
    /// Removed (cancelled) by the user
    Removed,
}

impl ItemStatus {
    /// Whether the engine will not do any more work for an item in this state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ItemStatus::Error | ItemStatus::Complete | ItemStatus::Removed
        )
    }

    /// Parse the status string aria2 reports in `tellStatus` responses.
    ///
    /// Unknown strings map to `Error` so they never count as in-flight.
    pub fn from_aria2(status: &str) -> Self {
        match status {
            "active" => ItemStatus::Active,
            "waiting" => ItemStatus::Waiting,
            "paused" => ItemStatus::Paused,
            "complete" => ItemStatus::Complete,
            "removed" => ItemStatus::Removed,
            _ => ItemStatus::Error,
        }
    }
}

/// One in-flight or finished transfer, keyed by remote file name
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadItem {
    /// Engine-assigned identifier
    pub gid: String,
    /// Remote file name
    pub name: String,
    /// Fully-qualified source URL
    pub url: String,
    /// Destination directory at submission time
    pub local_dir: PathBuf,
    /// Engine-reported state
    pub status: ItemStatus,
    /// Total size in bytes (0 while unknown)
    #[serde(default)]
    pub total_length: u64,
    /// Bytes transferred so far
    #[serde(default)]
    pub completed_length: u64,
    /// Engine error message for items in the `Error` state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl DownloadItem {
    /// Where the finished file lands on disk
    pub fn local_path(&self) -> PathBuf {
        self.local_dir.join(&self.name)
    }

    /// Whether this item still occupies its name in the queue
    pub fn is_in_flight(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Whether the item was submitted into `dir`
    pub fn targets(&self, dir: &Path) -> bool {
        self.local_dir == dir
    }
}

/// Status of a remote entry relative to the queue and the local directory
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Suggestion {
    /// Neither queued nor present locally
    #[default]
    NotQueued,
    /// Present in the queue with a non-terminal status
    Downloading,
    /// Present in the local directory
    Downloaded,
}

/// A remote entry paired with its computed suggestion
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntry {
    /// Remote file name
    pub name: String,
    /// Computed status
    pub suggestion: Suggestion,
}

impl RemoteEntry {
    /// Entries nobody has fetched yet are picked by auto-selection
    pub fn should_download(&self) -> bool {
        self.suggestion == Suggestion::NotQueued
    }
}

/// Login used for the remote server
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// User name
    pub username: String,
    /// Password
    pub password: String,
}

impl Credentials {
    /// Create credentials from a user name and password
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Conventional anonymous FTP login
    pub fn anonymous() -> Self {
        Self::new("anonymous", "@anonymous")
    }

    /// Use the supplied login if there is one, anonymous otherwise
    pub fn or_anonymous(username: Option<&str>, password: Option<&str>) -> Self {
        let anonymous = Self::anonymous();
        Self {
            username: username
                .filter(|u| !u.is_empty())
                .map(str::to_string)
                .unwrap_or(anonymous.username),
            password: password
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .unwrap_or(anonymous.password),
        }
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::anonymous()
    }
}

// Keeps passwords out of logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Options applied to a submission batch. Last write wins.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Number of connections a single file is split across
    pub split: u32,
    /// Remote login
    #[serde(default)]
    pub credentials: Credentials,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            split: 5,
            credentials: Credentials::anonymous(),
        }
    }
}

/// A per-item engine failure
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFailure {
    /// The item the operation was attempted on
    pub item: DownloadItem,
    /// Error detail reported by the engine
    pub error: String,
}

/// Lifecycle event emitted by the download engine
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum EngineEvent {
    /// Full snapshot of the engine queue
    #[serde(rename = "change")]
    Change(Vec<DownloadItem>),

    /// The engine rejected a submitted URI
    #[serde(rename = "item-add-failed")]
    ItemAddFailed(ItemFailure),

    /// A transfer finished
    #[serde(rename = "item-completed")]
    ItemCompleted(DownloadItem),

    /// A transfer was cancelled
    #[serde(rename = "item-cancelled")]
    ItemCancelled(DownloadItem),

    /// Pausing a transfer failed
    #[serde(rename = "item-pause-failed")]
    ItemPauseFailed(ItemFailure),

    /// Resuming a transfer failed
    #[serde(rename = "item-resume-failed")]
    ItemResumeFailed(ItemFailure),

    /// Cancelling a transfer failed
    #[serde(rename = "item-cancel-failed")]
    ItemCancelFailed(ItemFailure),
}

impl EngineEvent {
    /// Event name as it appears on the wire
    pub fn name(&self) -> &'static str {
        match self {
            EngineEvent::Change(_) => "change",
            EngineEvent::ItemAddFailed(_) => "item-add-failed",
            EngineEvent::ItemCompleted(_) => "item-completed",
            EngineEvent::ItemCancelled(_) => "item-cancelled",
            EngineEvent::ItemPauseFailed(_) => "item-pause-failed",
            EngineEvent::ItemResumeFailed(_) => "item-resume-failed",
            EngineEvent::ItemCancelFailed(_) => "item-cancel-failed",
        }
    }
}

/// Lifecycle state of the engine handle
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum EngineState {
    /// `start` has not been called
    #[default]
    Uninitialized,
    /// Startup is in progress
    Starting,
    /// The engine accepts submissions
    Ready,
    /// Startup failed; terminal
    Failed(String),
}

/// Severity of a user-facing notification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    /// Success / informational
    Info,
    /// Recoverable problem
    Warn,
    /// Failure
    Error,
}

/// A user-facing message delivered to a [`Notifier`](crate::notify::Notifier)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Severity
    pub level: NotificationLevel,
    /// Headline
    pub title: String,
    /// Optional second line
    pub detail: Option<String>,
    /// Whether the message stays until dismissed
    pub persistent: bool,
    /// Auto-dismiss delay for non-persistent messages
    pub timeout: Option<Duration>,
}
