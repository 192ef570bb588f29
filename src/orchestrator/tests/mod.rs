use super::*;
use crate::error::{Error, StartupError};
use crate::request::RequestPlan;
use crate::test_helpers::{
    EngineCall, EngineRecorder, FailingLauncher, RecordingDirectory, RecordingEngine,
    StaticLauncher, TestOrchestrator, create_test_orchestrator, create_test_orchestrator_with_dir,
    item, wait_until,
};
use crate::types::{
    Credentials, EngineConfig, EngineEvent, EngineState, ItemFailure, ItemStatus,
    NotificationLevel, Suggestion,
};
use std::path::PathBuf;
use std::time::Duration;

mod startup;

/// Start the orchestrator's engine with a recording double
async fn start_recording(t: &TestOrchestrator) -> EngineRecorder {
    let (engine, recorder) = RecordingEngine::new();
    t.orchestrator
        .start_engine(&StaticLauncher::new(engine))
        .await
        .unwrap();
    recorder
}
