//! A wiremock stand-in for the aria2 JSON-RPC endpoint

use ftpsync_dl::config::EngineSettings;
use serde_json::{Value, json};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Successful JSON-RPC response carrying `result`
pub fn rpc_result(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "1",
        "jsonrpc": "2.0",
        "result": result,
    }))
}

/// Answer every call of `aria2.<name>` with `result`
pub async fn mount_method(server: &MockServer, name: &str, result: Value) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": format!("aria2.{}", name) })))
        .respond_with(rpc_result(result))
        .mount(server)
        .await;
}

/// Same as [`mount_method`], but takes precedence over mocks mounted earlier
pub async fn mount_method_override(server: &MockServer, name: &str, result: Value) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": format!("aria2.{}", name) })))
        .respond_with(rpc_result(result))
        .with_priority(1)
        .mount(server)
        .await;
}

/// A daemon that is up and has nothing queued
pub async fn start_idle_aria2() -> MockServer {
    let server = MockServer::start().await;
    mount_method(&server, "getVersion", json!({"version": "1.37.0", "enabledFeatures": ["FTP"]})).await;
    mount_method(&server, "tellActive", json!([])).await;
    mount_method(&server, "tellWaiting", json!([])).await;
    mount_method(&server, "tellStopped", json!([])).await;
    mount_method(&server, "removeDownloadResult", json!("OK")).await;
    mount_method(&server, "shutdown", json!("OK")).await;
    server
}

/// Engine settings pointing at `server`, with fast polling
pub fn engine_settings(server: &MockServer) -> EngineSettings {
    EngineSettings {
        rpc_port: server.address().port(),
        poll_interval: Duration::from_millis(20),
        startup_timeout: Duration::from_secs(2),
        ..Default::default()
    }
}

/// JSON-RPC method names received so far, in order
pub async fn received_methods(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|request| request.body_json::<Value>().ok())
        .filter_map(|body| body["method"].as_str().map(str::to_string))
        .collect()
}

/// Bodies of every `aria2.addUri` call received so far
pub async fn add_uri_calls(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|request| request.body_json::<Value>().ok())
        .filter(|body| body["method"] == "aria2.addUri")
        .collect()
}
