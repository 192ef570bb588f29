use super::*;
use std::sync::Arc;

fn deps_of(t: &TestOrchestrator) -> OrchestratorDeps {
    OrchestratorDeps {
        notifier: t.notifier.clone(),
        local_dir: t.local_dir.clone(),
        remote: t.remote.clone(),
    }
}

#[tokio::test]
async fn start_engine_failure_notifies_and_is_terminal() {
    let t = create_test_orchestrator(&[], &[]);
    let launcher = FailingLauncher::new(|| StartupError::BinaryNotFound("aria2c".to_string()));

    let err = t.orchestrator.start_engine(&launcher).await.unwrap_err();

    assert!(matches!(err, Error::Startup(StartupError::BinaryNotFound(_))));
    assert!(matches!(t.orchestrator.engine_state(), EngineState::Failed(_)));
    let errors = t.notifier.at_level(NotificationLevel::Error);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].title, "Can not start Aria2 daemon.");

    // No retry, and no second notification
    let again = t.orchestrator.start_engine(&launcher).await.unwrap_err();
    assert!(matches!(again, Error::Startup(StartupError::AlreadyStarted)));
    assert_eq!(launcher.attempts(), 1);
    assert_eq!(t.notifier.at_level(NotificationLevel::Error).len(), 1);

    assert!(matches!(
        t.orchestrator.add_downloads(&["a.zip"]).await,
        Err(Error::EngineNotReady)
    ));
}

#[tokio::test]
async fn startup_loads_dir_and_auto_downloads() {
    let t = create_test_orchestrator(&["a.zip", "b.zip"], &["b.zip"]);
    let (engine, recorder) = RecordingEngine::new();
    let launcher = StaticLauncher::new(engine).with_delay(Duration::from_millis(20));

    let orchestrator = DownloadOrchestrator::startup(
        crate::config::Config::default(),
        deps_of(&t),
        &launcher,
        StartupOptions {
            local_dir: Some(PathBuf::from("/L")),
            auto_download: true,
        },
    )
    .await
    .unwrap();

    assert_eq!(orchestrator.engine_state(), EngineState::Ready);
    assert_eq!(t.local_dir.reloads(), vec![PathBuf::from("/L")]);
    assert_eq!(
        recorder.submissions(),
        vec![(vec!["ftp://h/d/a.zip".to_string()], PathBuf::from("/L"))]
    );
}

#[tokio::test]
async fn startup_without_auto_download_submits_nothing() {
    let t = create_test_orchestrator(&["a.zip"], &[]);
    let (engine, recorder) = RecordingEngine::new();

    DownloadOrchestrator::startup(
        crate::config::Config::default(),
        deps_of(&t),
        &StaticLauncher::new(engine),
        StartupOptions::default(),
    )
    .await
    .unwrap();

    assert!(recorder.calls().is_empty());
    // Falls back to download.local_dir from the config
    assert_eq!(t.local_dir.reloads(), vec![PathBuf::from(".")]);
}

#[tokio::test]
async fn startup_engine_failure_is_returned() {
    let t = create_test_orchestrator(&["a.zip"], &[]);
    let launcher = FailingLauncher::new(|| StartupError::Timeout(Duration::from_secs(10)));

    let result = DownloadOrchestrator::startup(
        crate::config::Config::default(),
        deps_of(&t),
        &launcher,
        StartupOptions {
            local_dir: None,
            auto_download: true,
        },
    )
    .await;

    assert!(matches!(result, Err(Error::Startup(StartupError::Timeout(_)))));
    assert_eq!(t.notifier.at_level(NotificationLevel::Error).len(), 1);
}

#[tokio::test]
async fn startup_dir_failure_skips_auto_download() {
    let dir = Arc::new(RecordingDirectory::failing("/missing"));
    let t = create_test_orchestrator_with_dir(&["a.zip"], dir);
    let (engine, recorder) = RecordingEngine::new();

    let orchestrator = DownloadOrchestrator::startup(
        crate::config::Config::default(),
        deps_of(&t),
        &StaticLauncher::new(engine),
        StartupOptions {
            local_dir: Some(PathBuf::from("/missing")),
            auto_download: true,
        },
    )
    .await
    .unwrap();

    assert_eq!(orchestrator.engine_state(), EngineState::Ready);
    assert!(recorder.calls().is_empty());
    assert_eq!(t.notifier.at_level(NotificationLevel::Warn).len(), 1);
}

#[tokio::test]
async fn shutdown_stops_reconciler_and_engine() {
    let t = create_test_orchestrator(&[], &[]);
    let recorder = start_recording(&t).await;

    t.orchestrator.shutdown().await.unwrap();

    assert_eq!(recorder.calls(), vec![EngineCall::Shutdown]);
    assert!(t.orchestrator.reconciler.lock().await.is_none());

    // Events after shutdown are no longer applied
    recorder.emit(EngineEvent::Change(vec![item("1", "a.zip", "/L", ItemStatus::Active)]));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(t.orchestrator.queue().await.is_empty());
}

#[tokio::test]
async fn shutdown_before_start_is_a_no_op() {
    let t = create_test_orchestrator(&[], &[]);

    t.orchestrator.shutdown().await.unwrap();

    assert_eq!(t.orchestrator.engine_state(), EngineState::Uninitialized);
}

#[tokio::test]
async fn startup_rejects_invalid_config_before_launching() {
    let t = create_test_orchestrator(&["a.zip"], &[]);
    let launcher = FailingLauncher::new(|| StartupError::Timeout(Duration::from_secs(10)));

    let mut zero_split = crate::config::Config::default();
    zero_split.download.split = 0;
    let mut zero_buffer = crate::config::Config::default();
    zero_buffer.engine.event_buffer = 0;

    for config in [zero_split, zero_buffer] {
        let result = DownloadOrchestrator::startup(
            config,
            deps_of(&t),
            &launcher,
            StartupOptions {
                local_dir: Some(PathBuf::from("/L")),
                auto_download: true,
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    assert_eq!(launcher.attempts(), 0);
    assert!(t.local_dir.reloads().is_empty());
    assert!(t.notifier.messages().is_empty());
}

#[tokio::test]
async fn new_rejects_zero_poll_interval() {
    let t = create_test_orchestrator(&[], &[]);
    let mut config = crate::config::Config::default();
    config.engine.poll_interval = Duration::ZERO;

    let result = DownloadOrchestrator::new(config, deps_of(&t));

    match result {
        Err(Error::Config { key, .. }) => {
            assert_eq!(key.as_deref(), Some("engine.poll_interval"))
        }
        _ => panic!("expected a config error"),
    }
}
