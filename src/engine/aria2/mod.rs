//! aria2c adapter.
//!
//! [`Aria2Launcher`] spawns (or attaches to) an aria2c daemon with RPC
//! enabled and waits until it answers. [`Aria2Engine`] implements
//! [`DownloadEngine`] on top of the JSON-RPC interface: commands are sent
//! from spawned tasks, and a poll loop turns periodic status lists into
//! `change`, `item-completed` and `item-cancelled` events.

mod rpc;
mod snapshot;

pub use rpc::{Aria2Client, Aria2File, Aria2Status, Aria2Uri, VersionInfo};

use super::{DownloadEngine, EngineHandle, EngineLauncher};
use crate::config::EngineSettings;
use crate::error::{Result, StartupError};
use crate::types::{DownloadItem, EngineConfig, EngineEvent, ItemFailure};
use async_trait::async_trait;
use serde_json::json;
use snapshot::{Submitted, status_index, to_item, transitions};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::sync::{Notify, broadcast};
use tokio_util::sync::CancellationToken;

/// Upper bound of waiting/stopped entries fetched per snapshot
const MAX_LISTED: u32 = 1000;

/// Delay between readiness probes during startup
const READY_PROBE_INTERVAL: Duration = Duration::from_millis(100);

/// How long `shutdown` waits for the daemon to exit before killing it
const EXIT_GRACE: Duration = Duration::from_secs(3);

/// Floor for the poll interval; `interval` panics on zero
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

type SubmittedMap = Arc<Mutex<HashMap<String, Submitted>>>;

/// Which per-item command failed
#[derive(Debug, Clone, Copy)]
enum ItemCommand {
    Pause,
    Resume,
    Cancel,
}

/// [`DownloadEngine`] backed by an aria2c daemon
pub struct Aria2Engine {
    client: Arc<Aria2Client>,
    event_tx: broadcast::Sender<EngineEvent>,
    /// Receiver created with the channel, handed to the first subscriber
    first_rx: Mutex<Option<broadcast::Receiver<EngineEvent>>>,
    options: RwLock<EngineConfig>,
    submitted: SubmittedMap,
    refresh: Arc<Notify>,
    cancel: CancellationToken,
    process: tokio::sync::Mutex<Option<Child>>,
}

impl Aria2Engine {
    /// Attach to a ready aria2c and start the snapshot poll loop
    ///
    /// `process` is the daemon this engine owns, if it spawned one. The first
    /// call to `subscribe` receives every event since this call, including
    /// those of the first poll. A zero buffer or poll interval is raised to
    /// the minimum; [`Aria2Launcher`] rejects both before getting here.
    pub fn start(client: Aria2Client, settings: &EngineSettings, process: Option<Child>) -> Self {
        let (event_tx, first_rx) = broadcast::channel(settings.event_buffer.max(1));
        let engine = Self {
            client: Arc::new(client),
            event_tx,
            first_rx: Mutex::new(Some(first_rx)),
            options: RwLock::new(EngineConfig::default()),
            submitted: Arc::new(Mutex::new(HashMap::new())),
            refresh: Arc::new(Notify::new()),
            cancel: CancellationToken::new(),
            process: tokio::sync::Mutex::new(process),
        };
        engine.spawn_poll_loop(settings.poll_interval.max(MIN_POLL_INTERVAL));
        engine
    }

    fn spawn_poll_loop(&self, interval: Duration) {
        let client = self.client.clone();
        let event_tx = self.event_tx.clone();
        let submitted = self.submitted.clone();
        let refresh = self.refresh.clone();
        let cancel = self.cancel.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            let mut previous = HashMap::new();

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                    _ = refresh.notified() => {}
                }

                match fetch_snapshot(&client, &submitted).await {
                    Ok(items) => {
                        let mut finished = Vec::new();
                        for event in transitions(&previous, &items) {
                            tracing::debug!(event = event.name(), "aria2 item transition");
                            if let EngineEvent::ItemCompleted(item) | EngineEvent::ItemCancelled(item) = &event {
                                finished.push(item.gid.clone());
                            }
                            event_tx.send(event).ok();
                        }
                        previous = status_index(&items);
                        event_tx.send(EngineEvent::Change(items)).ok();

                        acknowledge(&client, &submitted, &finished).await;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to poll aria2 queue");
                    }
                }
            }

            tracing::debug!("aria2 poll loop stopped");
        });
    }

    fn spawn_command(&self, command: ItemCommand, item: &DownloadItem) {
        let client = self.client.clone();
        let event_tx = self.event_tx.clone();
        let refresh = self.refresh.clone();
        let item = item.clone();

        tokio::spawn(async move {
            let result = match command {
                ItemCommand::Pause => client.pause(&item.gid).await,
                ItemCommand::Resume => client.unpause(&item.gid).await,
                ItemCommand::Cancel => client.remove(&item.gid).await,
            };

            match result {
                Ok(_) => refresh.notify_one(),
                Err(e) => {
                    tracing::warn!(gid = %item.gid, name = %item.name, ?command, error = %e, "aria2 command failed");
                    let failure = ItemFailure {
                        item,
                        error: e.to_string(),
                    };
                    let event = match command {
                        ItemCommand::Pause => EngineEvent::ItemPauseFailed(failure),
                        ItemCommand::Resume => EngineEvent::ItemResumeFailed(failure),
                        ItemCommand::Cancel => EngineEvent::ItemCancelFailed(failure),
                    };
                    event_tx.send(event).ok();
                }
            }
        });
    }

    fn current_options(&self) -> EngineConfig {
        self.options
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

async fn fetch_snapshot(client: &Aria2Client, submitted: &SubmittedMap) -> Result<Vec<DownloadItem>> {
    let active = client.tell_active().await?;
    let waiting = client.tell_waiting(0, MAX_LISTED).await?;
    let stopped = client.tell_stopped(0, MAX_LISTED).await?;

    let submitted = submitted.lock().unwrap_or_else(|e| e.into_inner());
    Ok(active
        .iter()
        .chain(waiting.iter())
        .chain(stopped.iter())
        .map(|status| to_item(status, submitted.get(&status.gid)))
        .collect())
}

/// Drop reported results from aria2 and from the submission records
async fn acknowledge(client: &Aria2Client, submitted: &SubmittedMap, gids: &[String]) {
    for gid in gids {
        if let Err(e) = client.remove_download_result(gid).await {
            tracing::warn!(gid = %gid, error = %e, "Failed to remove aria2 download result");
        }
        submitted
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(gid);
    }
}

#[async_trait]
impl DownloadEngine for Aria2Engine {
    fn configure(&self, config: EngineConfig) {
        tracing::debug!(split = config.split, user = %config.credentials.username, "aria2 options replaced");
        *self.options.write().unwrap_or_else(|e| e.into_inner()) = config;
    }

    fn submit(&self, uris: Vec<String>, destination_dir: &Path) {
        let options = self.current_options();
        let dir = destination_dir.to_path_buf();
        let client = self.client.clone();
        let event_tx = self.event_tx.clone();
        let submitted = self.submitted.clone();
        let refresh = self.refresh.clone();

        tokio::spawn(async move {
            let rpc_options = json!({
                "dir": dir.to_string_lossy(),
                "split": options.split.to_string(),
                "ftp-user": options.credentials.username,
                "ftp-passwd": options.credentials.password,
            });

            for uri in uris {
                let record = Submitted::new(&uri, &dir);
                match client.add_uri(std::slice::from_ref(&uri), rpc_options.clone()).await {
                    Ok(gid) => {
                        tracing::info!(gid = %gid, uri = %uri, "Download added");
                        submitted
                            .lock()
                            .unwrap_or_else(|e| e.into_inner())
                            .insert(gid, record);
                    }
                    Err(e) => {
                        tracing::warn!(uri = %uri, error = %e, "aria2 rejected download");
                        let error = e.to_string();
                        event_tx
                            .send(EngineEvent::ItemAddFailed(ItemFailure {
                                item: record.rejected(&error),
                                error,
                            }))
                            .ok();
                    }
                }
            }

            refresh.notify_one();
        });
    }

    fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.first_rx
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .unwrap_or_else(|| self.event_tx.subscribe())
    }

    fn pause(&self, item: &DownloadItem) {
        self.spawn_command(ItemCommand::Pause, item);
    }

    fn resume(&self, item: &DownloadItem) {
        self.spawn_command(ItemCommand::Resume, item);
    }

    fn cancel(&self, item: &DownloadItem) {
        self.spawn_command(ItemCommand::Cancel, item);
    }

    async fn shutdown(&self) -> Result<()> {
        self.cancel.cancel();

        if let Err(e) = self.client.shutdown().await {
            tracing::warn!(error = %e, "aria2 did not accept shutdown request");
        }

        let mut process = self.process.lock().await;
        if let Some(child) = process.as_mut() {
            match tokio::time::timeout(EXIT_GRACE, child.wait()).await {
                Ok(Ok(status)) => tracing::info!(%status, "aria2c exited"),
                Ok(Err(e)) => tracing::warn!(error = %e, "Failed to wait for aria2c"),
                Err(_) => {
                    tracing::warn!("aria2c did not exit in time, killing it");
                    child.kill().await?;
                }
            }
        }
        *process = None;

        Ok(())
    }

    fn name(&self) -> &'static str {
        "aria2"
    }
}

impl Drop for Aria2Engine {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Starts aria2c with RPC enabled, or attaches to one already running
///
/// # Examples
///
/// ```no_run
/// use ftpsync_dl::config::EngineSettings;
/// use ftpsync_dl::engine::{Aria2Launcher, EngineLifecycle};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let lifecycle = EngineLifecycle::new();
/// let launcher = Aria2Launcher::new(EngineSettings::default());
/// let engine = lifecycle.start(&launcher).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Aria2Launcher {
    settings: EngineSettings,
    spawn: bool,
}

impl Aria2Launcher {
    /// Launcher that spawns its own aria2c
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            spawn: true,
        }
    }

    /// Launcher that attaches to an aria2c already listening on the configured port
    pub fn attach(settings: EngineSettings) -> Self {
        Self {
            settings,
            spawn: false,
        }
    }

    /// Resolve the aria2c binary from settings or PATH
    pub fn locate_binary(&self) -> std::result::Result<PathBuf, StartupError> {
        if let Some(path) = &self.settings.aria2_path {
            return Ok(path.clone());
        }
        if self.settings.search_path {
            return which::which("aria2c")
                .map_err(|e| StartupError::BinaryNotFound(format!("aria2c: {}", e)));
        }
        Err(StartupError::BinaryNotFound(
            "aria2c: no aria2_path configured and PATH search disabled".to_string(),
        ))
    }

    fn spawn_daemon(&self, binary: &Path) -> std::result::Result<Child, StartupError> {
        let mut command = Command::new(binary);
        command
            .arg("--enable-rpc=true")
            .arg("--rpc-listen-all=false")
            .arg(format!("--rpc-listen-port={}", self.settings.rpc_port))
            .arg("--daemon=false")
            .arg("--quiet=true");
        if let Some(secret) = &self.settings.rpc_secret {
            command.arg(format!("--rpc-secret={}", secret));
        }

        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(StartupError::Spawn)
    }

    fn client(&self) -> Aria2Client {
        Aria2Client::new(self.settings.rpc_url(), self.settings.rpc_secret.clone())
    }
}

/// Probe `getVersion` until it answers or `timeout` elapses
///
/// Returns early if the spawned process exits.
pub(crate) async fn wait_until_ready(
    client: &Aria2Client,
    mut process: Option<&mut Child>,
    timeout: Duration,
) -> std::result::Result<VersionInfo, StartupError> {
    let probe = async {
        loop {
            match client.get_version().await {
                Ok(version) => return Ok(version),
                // A wrong secret will not fix itself
                Err(crate::error::Error::Rpc { message, .. }) => return Err(StartupError::Rpc(message)),
                Err(e) => tracing::trace!(error = %e, "aria2 not answering yet"),
            }

            if let Some(child) = process.as_deref_mut()
                && let Ok(Some(status)) = child.try_wait()
            {
                return Err(StartupError::Rpc(format!(
                    "aria2c exited during startup with {}",
                    status
                )));
            }

            tokio::time::sleep(READY_PROBE_INTERVAL).await;
        }
    };

    tokio::time::timeout(timeout, probe)
        .await
        .map_err(|_| StartupError::Timeout(timeout))?
}

#[async_trait]
impl EngineLauncher for Aria2Launcher {
    async fn launch(&self) -> std::result::Result<EngineHandle, StartupError> {
        self.settings
            .validate()
            .map_err(|e| StartupError::InvalidSettings(e.to_string()))?;

        let mut process = if self.spawn {
            let binary = self.locate_binary()?;
            tracing::info!(binary = %binary.display(), port = self.settings.rpc_port, "Spawning aria2c");
            Some(self.spawn_daemon(&binary)?)
        } else {
            None
        };

        let client = self.client();
        let version = wait_until_ready(&client, process.as_mut(), self.settings.startup_timeout).await?;
        tracing::info!(version = %version.version, endpoint = client.endpoint(), "aria2 RPC ready");

        Ok(EngineHandle::new(Aria2Engine::start(
            client,
            &self.settings,
            process,
        )))
    }
}
