//! Shared test doubles for the engine, notifier and local directory.

use crate::config::Config;
use crate::engine::{DownloadEngine, EngineHandle, EngineLauncher};
use crate::error::{Error, Result, StartupError};
use crate::local_dir::LocalDirectory;
use crate::notify::Notifier;
use crate::orchestrator::{DownloadOrchestrator, OrchestratorDeps};
use crate::remote::StaticRemoteListing;
use crate::types::{
    DownloadItem, EngineConfig, EngineEvent, ItemStatus, Notification, NotificationLevel,
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;

/// A call made on [`RecordingEngine`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum EngineCall {
    Configure(EngineConfig),
    Submit { uris: Vec<String>, dir: PathBuf },
    Pause(String),
    Resume(String),
    Cancel(String),
    Shutdown,
}

/// Engine double that records every call and emits events on demand
pub(crate) struct RecordingEngine {
    calls: Arc<Mutex<Vec<EngineCall>>>,
    event_tx: broadcast::Sender<EngineEvent>,
}

/// Test-side view of a [`RecordingEngine`] after it was handed off
#[derive(Clone)]
pub(crate) struct EngineRecorder {
    calls: Arc<Mutex<Vec<EngineCall>>>,
    event_tx: broadcast::Sender<EngineEvent>,
}

impl RecordingEngine {
    pub(crate) fn new() -> (Self, EngineRecorder) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let (event_tx, _rx) = broadcast::channel(100);
        let recorder = EngineRecorder {
            calls: calls.clone(),
            event_tx: event_tx.clone(),
        };
        (Self { calls, event_tx }, recorder)
    }

    fn record(&self, call: EngineCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl EngineRecorder {
    pub(crate) fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn submissions(&self) -> Vec<(Vec<String>, PathBuf)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                EngineCall::Submit { uris, dir } => Some((uris, dir)),
                _ => None,
            })
            .collect()
    }

    /// Emit an event as if the engine produced it
    pub(crate) fn emit(&self, event: EngineEvent) {
        let _ = self.event_tx.send(event);
    }
}

#[async_trait]
impl DownloadEngine for RecordingEngine {
    fn configure(&self, config: EngineConfig) {
        self.record(EngineCall::Configure(config));
    }

    fn submit(&self, uris: Vec<String>, destination_dir: &Path) {
        self.record(EngineCall::Submit {
            uris,
            dir: destination_dir.to_path_buf(),
        });
    }

    fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.event_tx.subscribe()
    }

    fn pause(&self, item: &DownloadItem) {
        self.record(EngineCall::Pause(item.gid.clone()));
    }

    fn resume(&self, item: &DownloadItem) {
        self.record(EngineCall::Resume(item.gid.clone()));
    }

    fn cancel(&self, item: &DownloadItem) {
        self.record(EngineCall::Cancel(item.gid.clone()));
    }

    async fn shutdown(&self) -> Result<()> {
        self.record(EngineCall::Shutdown);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Launcher that hands out a prepared engine, optionally after a delay
pub(crate) struct StaticLauncher {
    handle: EngineHandle,
    delay: Duration,
}

impl StaticLauncher {
    pub(crate) fn new<E: DownloadEngine + 'static>(engine: E) -> Self {
        Self {
            handle: EngineHandle::new(engine),
            delay: Duration::ZERO,
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl EngineLauncher for StaticLauncher {
    async fn launch(&self) -> std::result::Result<EngineHandle, StartupError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.handle.clone())
    }
}

/// Launcher that always fails and counts attempts
pub(crate) struct FailingLauncher {
    make_error: Box<dyn Fn() -> StartupError + Send + Sync>,
    attempts: AtomicUsize,
}

impl FailingLauncher {
    pub(crate) fn new(make_error: impl Fn() -> StartupError + Send + Sync + 'static) -> Self {
        Self {
            make_error: Box::new(make_error),
            attempts: AtomicUsize::new(0),
        }
    }

    pub(crate) fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EngineLauncher for FailingLauncher {
    async fn launch(&self) -> std::result::Result<EngineHandle, StartupError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err((self.make_error)())
    }
}

/// Notifier that keeps every message
#[derive(Default)]
pub(crate) struct RecordingNotifier {
    messages: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub(crate) fn messages(&self) -> Vec<Notification> {
        self.messages.lock().unwrap().clone()
    }

    pub(crate) fn at_level(&self, level: NotificationLevel) -> Vec<Notification> {
        self.messages()
            .into_iter()
            .filter(|n| n.level == level)
            .collect()
    }

    fn push(
        &self,
        level: NotificationLevel,
        title: &str,
        detail: Option<&str>,
        persistent: bool,
        timeout: Option<Duration>,
    ) {
        self.messages.lock().unwrap().push(Notification {
            level,
            title: title.to_string(),
            detail: detail.map(str::to_string),
            persistent,
            timeout,
        });
    }
}

impl Notifier for RecordingNotifier {
    fn info(&self, title: &str, detail: Option<&str>, persistent: bool, timeout: Option<Duration>) {
        self.push(NotificationLevel::Info, title, detail, persistent, timeout);
    }

    fn warn(&self, title: &str, detail: Option<&str>) {
        self.push(NotificationLevel::Warn, title, detail, true, None);
    }

    fn error(&self, title: &str, detail: Option<&str>) {
        self.push(NotificationLevel::Error, title, detail, true, None);
    }
}

/// In-memory local directory that counts reloads
pub(crate) struct RecordingDirectory {
    current: Mutex<PathBuf>,
    entries: Mutex<Vec<String>>,
    reloads: Mutex<Vec<PathBuf>>,
    fail_reload: bool,
}

impl RecordingDirectory {
    pub(crate) fn new(current: impl Into<PathBuf>, entries: &[&str]) -> Self {
        Self {
            current: Mutex::new(current.into()),
            entries: Mutex::new(entries.iter().map(|s| s.to_string()).collect()),
            reloads: Mutex::new(Vec::new()),
            fail_reload: false,
        }
    }

    /// Every reload fails with an I/O error
    pub(crate) fn failing(current: impl Into<PathBuf>) -> Self {
        Self {
            fail_reload: true,
            ..Self::new(current, &[])
        }
    }

    pub(crate) fn reloads(&self) -> Vec<PathBuf> {
        self.reloads.lock().unwrap().clone()
    }

    pub(crate) fn set_entries(&self, entries: &[&str]) {
        *self.entries.lock().unwrap() = entries.iter().map(|s| s.to_string()).collect();
    }
}

#[async_trait]
impl LocalDirectory for RecordingDirectory {
    async fn current_dir(&self) -> PathBuf {
        self.current.lock().unwrap().clone()
    }

    async fn listing(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    async fn reload(&self, dir: &Path) -> Result<()> {
        self.reloads.lock().unwrap().push(dir.to_path_buf());
        if self.fail_reload {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "directory does not exist",
            )));
        }
        *self.current.lock().unwrap() = dir.to_path_buf();
        Ok(())
    }
}

/// A queue item in `dir` with the given status
pub(crate) fn item(gid: &str, name: &str, dir: &str, status: ItemStatus) -> DownloadItem {
    DownloadItem {
        gid: gid.to_string(),
        name: name.to_string(),
        url: format!("ftp://h/d/{}", name),
        local_dir: PathBuf::from(dir),
        status,
        total_length: 0,
        completed_length: 0,
        error_message: None,
    }
}

/// Everything a test needs to drive and inspect an orchestrator
pub(crate) struct TestOrchestrator {
    pub orchestrator: DownloadOrchestrator,
    pub notifier: Arc<RecordingNotifier>,
    pub local_dir: Arc<RecordingDirectory>,
    pub remote: Arc<StaticRemoteListing>,
}

/// Orchestrator over remote `ftp://h/d` and local directory `/L`, engine not started
pub(crate) fn create_test_orchestrator(remote_entries: &[&str], local_entries: &[&str]) -> TestOrchestrator {
    create_test_orchestrator_with_dir(
        remote_entries,
        Arc::new(RecordingDirectory::new("/L", local_entries)),
    )
}

pub(crate) fn create_test_orchestrator_with_dir(
    remote_entries: &[&str],
    local_dir: Arc<RecordingDirectory>,
) -> TestOrchestrator {
    let notifier = Arc::new(RecordingNotifier::default());
    let remote = Arc::new(StaticRemoteListing::new("ftp://h", None, None));
    remote.set_listing("/d", remote_entries.iter().map(|s| s.to_string()).collect());

    let deps = OrchestratorDeps {
        notifier: notifier.clone(),
        local_dir: local_dir.clone(),
        remote: remote.clone(),
    };

    TestOrchestrator {
        orchestrator: DownloadOrchestrator::new(Config::default(), deps).unwrap(),
        notifier,
        local_dir,
        remote,
    }
}

/// Poll `condition` until it holds or two seconds pass
pub(crate) async fn wait_until<F, Fut>(mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while tokio::time::Instant::now() < deadline {
        if condition().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
