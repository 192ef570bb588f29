//! User-facing notification sink
//!
//! Notifications are fire-and-forget. Hosts with a UI implement [`Notifier`]
//! to show toasts or dialogs; [`TracingNotifier`] is the default sink and
//! turns every message into a `tracing` event.

use std::time::Duration;

/// Receiver of human-readable success, warning and error messages
pub trait Notifier: Send + Sync {
    /// Success or informational message
    ///
    /// Non-persistent messages are dismissed after `timeout` (host default if None).
    fn info(&self, title: &str, detail: Option<&str>, persistent: bool, timeout: Option<Duration>);

    /// Recoverable problem
    fn warn(&self, title: &str, detail: Option<&str>);

    /// Failure
    fn error(&self, title: &str, detail: Option<&str>);
}

/// Notifier that writes every message to the `tracing` subscriber
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn info(&self, title: &str, detail: Option<&str>, persistent: bool, timeout: Option<Duration>) {
        tracing::info!(
            target: "ftpsync_dl::notify",
            detail = detail.unwrap_or_default(),
            persistent,
            timeout_ms = timeout.map(|t| t.as_millis() as u64),
            "{}",
            title
        );
    }

    fn warn(&self, title: &str, detail: Option<&str>) {
        tracing::warn!(
            target: "ftpsync_dl::notify",
            detail = detail.unwrap_or_default(),
            "{}",
            title
        );
    }

    fn error(&self, title: &str, detail: Option<&str>) {
        tracing::error!(
            target: "ftpsync_dl::notify",
            detail = detail.unwrap_or_default(),
            "{}",
            title
        );
    }
}
