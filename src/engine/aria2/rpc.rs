//! Minimal aria2 JSON-RPC client over HTTP

use crate::error::{Error, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicU64, Ordering};

/// Fields requested from `tellActive` / `tellWaiting` / `tellStopped`
const STATUS_KEYS: &[&str] = &[
    "gid",
    "status",
    "totalLength",
    "completedLength",
    "dir",
    "files",
    "errorMessage",
];

/// Reply of `aria2.getVersion`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    /// aria2 version string
    pub version: String,
    /// Compiled-in features
    #[serde(default)]
    pub enabled_features: Vec<String>,
}

/// One URI of a file in a transfer
#[derive(Debug, Clone, Deserialize)]
pub struct Aria2Uri {
    /// The URI
    pub uri: String,
}

/// One file of a transfer
#[derive(Debug, Clone, Deserialize)]
pub struct Aria2File {
    /// Local path (empty until the name is known)
    #[serde(default)]
    pub path: String,
    /// Source URIs
    #[serde(default)]
    pub uris: Vec<Aria2Uri>,
}

/// Transfer status as reported by `tellStatus` and friends
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aria2Status {
    /// Transfer identifier
    pub gid: String,
    /// `active`, `waiting`, `paused`, `error`, `complete` or `removed`
    pub status: String,
    /// Total size in bytes, as a decimal string
    #[serde(default)]
    pub total_length: String,
    /// Downloaded bytes, as a decimal string
    #[serde(default)]
    pub completed_length: String,
    /// Destination directory
    #[serde(default)]
    pub dir: String,
    /// Files of the transfer
    #[serde(default)]
    pub files: Vec<Aria2File>,
    /// Error message for failed transfers
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

/// JSON-RPC client for a running aria2c
#[derive(Debug)]
pub struct Aria2Client {
    http: reqwest::Client,
    endpoint: String,
    secret: Option<String>,
    next_id: AtomicU64,
}

impl Aria2Client {
    /// Client for the RPC endpoint at `endpoint` (e.g. `http://127.0.0.1:6800/jsonrpc`)
    pub fn new(endpoint: impl Into<String>, secret: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            secret,
            next_id: AtomicU64::new(1),
        }
    }

    /// The endpoint this client talks to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Vec<Value>) -> Result<T> {
        let mut all_params = Vec::with_capacity(params.len() + 1);
        if let Some(secret) = &self.secret {
            all_params.push(json!(format!("token:{}", secret)));
        }
        all_params.extend(params);

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id.to_string(),
            "method": format!("aria2.{}", method),
            "params": all_params,
        });

        tracing::trace!(method, id, "aria2 RPC call");

        // aria2 answers errors with a non-2xx status and a JSON error body
        let response: RpcResponse<T> = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        if let Some(err) = response.error {
            return Err(Error::Rpc {
                code: err.code,
                message: err.message,
            });
        }

        response
            .result
            .ok_or_else(|| Error::Other(format!("aria2.{} returned no result", method)))
    }

    /// `aria2.getVersion`
    pub async fn get_version(&self) -> Result<VersionInfo> {
        self.call("getVersion", vec![]).await
    }

    /// `aria2.addUri`, returns the new gid
    pub async fn add_uri(&self, uris: &[String], options: Value) -> Result<String> {
        self.call("addUri", vec![json!(uris), options]).await
    }

    /// `aria2.pause`
    pub async fn pause(&self, gid: &str) -> Result<String> {
        self.call("pause", vec![json!(gid)]).await
    }

    /// `aria2.unpause`
    pub async fn unpause(&self, gid: &str) -> Result<String> {
        self.call("unpause", vec![json!(gid)]).await
    }

    /// `aria2.remove`
    pub async fn remove(&self, gid: &str) -> Result<String> {
        self.call("remove", vec![json!(gid)]).await
    }

    /// `aria2.removeDownloadResult`
    pub async fn remove_download_result(&self, gid: &str) -> Result<String> {
        self.call("removeDownloadResult", vec![json!(gid)]).await
    }

    /// `aria2.tellActive`
    pub async fn tell_active(&self) -> Result<Vec<Aria2Status>> {
        self.call("tellActive", vec![json!(STATUS_KEYS)]).await
    }

    /// `aria2.tellWaiting`
    pub async fn tell_waiting(&self, offset: i64, num: u32) -> Result<Vec<Aria2Status>> {
        self.call("tellWaiting", vec![json!(offset), json!(num), json!(STATUS_KEYS)])
            .await
    }

    /// `aria2.tellStopped`
    pub async fn tell_stopped(&self, offset: i64, num: u32) -> Result<Vec<Aria2Status>> {
        self.call("tellStopped", vec![json!(offset), json!(num), json!(STATUS_KEYS)])
            .await
    }

    /// `aria2.shutdown`
    pub async fn shutdown(&self) -> Result<String> {
        self.call("shutdown", vec![]).await
    }
}
