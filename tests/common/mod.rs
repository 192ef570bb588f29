//! Common test utilities for ftpsync-dl integration tests

#[allow(dead_code)]
pub mod aria2_mock;
#[allow(dead_code)]
pub mod notifier;

#[allow(unused_imports)]
pub use aria2_mock::*;
#[allow(unused_imports)]
pub use notifier::*;

use std::time::Duration;

/// Poll `condition` until it holds or `timeout` elapses
pub async fn wait_for<F, Fut>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}
