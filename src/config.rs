//! Configuration types for ftpsync-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{path::Path, path::PathBuf, time::Duration};

/// Settings for the aria2 engine process and its RPC endpoint
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Path to the aria2c executable (auto-detected if None)
    #[serde(default)]
    pub aria2_path: Option<PathBuf>,

    /// Whether to search PATH for aria2c if `aria2_path` is not set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,

    /// Port the RPC interface listens on (default: 6800)
    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,

    /// RPC secret token passed as `--rpc-secret` (None = no token)
    #[serde(default)]
    pub rpc_secret: Option<String>,

    /// How long to wait for the RPC interface to answer after spawning (default: 10s)
    #[serde(default = "default_startup_timeout", with = "millis_serde")]
    pub startup_timeout: Duration,

    /// Interval between queue snapshots (default: 500ms)
    #[serde(default = "default_poll_interval", with = "millis_serde")]
    pub poll_interval: Duration,

    /// Capacity of the engine event channel (default: 1000)
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            aria2_path: None,
            search_path: true,
            rpc_port: default_rpc_port(),
            rpc_secret: None,
            startup_timeout: default_startup_timeout(),
            poll_interval: default_poll_interval(),
            event_buffer: default_event_buffer(),
        }
    }
}

impl EngineSettings {
    /// URL of the JSON-RPC endpoint on the local machine
    pub fn rpc_url(&self) -> String {
        format!("http://127.0.0.1:{}/jsonrpc", self.rpc_port)
    }

    /// Reject values the engine adapter cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.event_buffer == 0 {
            return Err(Error::Config {
                message: "event buffer must be at least 1".to_string(),
                key: Some("engine.event_buffer".to_string()),
            });
        }
        if self.poll_interval.is_zero() {
            return Err(Error::Config {
                message: "poll interval must be non-zero".to_string(),
                key: Some("engine.poll_interval".to_string()),
            });
        }
        Ok(())
    }
}

/// Download behavior
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadSettings {
    /// Connections per file (default: 5)
    #[serde(default = "default_split")]
    pub split: u32,

    /// Local directory loaded at startup (default: ".")
    #[serde(default = "default_local_dir")]
    pub local_dir: PathBuf,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            split: default_split(),
            local_dir: default_local_dir(),
        }
    }
}

/// Notification behavior
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NotificationSettings {
    /// Auto-dismiss delay for "download finished" messages (default: 5000ms)
    #[serde(default = "default_completion_timeout", with = "millis_serde")]
    pub completion_timeout: Duration,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            completion_timeout: default_completion_timeout(),
        }
    }
}

/// Top-level configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Engine process and RPC settings
    #[serde(default)]
    pub engine: EngineSettings,

    /// Download behavior
    #[serde(default)]
    pub download: DownloadSettings,

    /// Notification behavior
    #[serde(default)]
    pub notifications: NotificationSettings,
}

impl Config {
    /// Load configuration from a JSON file. Missing fields use their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.download.split == 0 {
            return Err(Error::Config {
                message: "split must be at least 1".to_string(),
                key: Some("download.split".to_string()),
            });
        }
        self.engine.validate()
    }
}

fn default_true() -> bool {
    true
}

fn default_rpc_port() -> u16 {
    6800
}

fn default_startup_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_poll_interval() -> Duration {
    Duration::from_millis(500)
}

fn default_event_buffer() -> usize {
    1000
}

fn default_split() -> u32 {
    5
}

fn default_local_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_completion_timeout() -> Duration {
    Duration::from_millis(5000)
}

// Durations are stored as whole milliseconds
mod millis_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
