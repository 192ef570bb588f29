//! Notifier that records messages for assertions

use ftpsync_dl::notify::Notifier;
use ftpsync_dl::{Notification, NotificationLevel};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
pub struct CollectingNotifier {
    messages: Mutex<Vec<Notification>>,
}

impl CollectingNotifier {
    pub fn titles(&self, level: NotificationLevel) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.level == level)
            .map(|n| n.title.clone())
            .collect()
    }

    fn push(&self, notification: Notification) {
        self.messages.lock().unwrap().push(notification);
    }
}

impl Notifier for CollectingNotifier {
    fn info(&self, title: &str, detail: Option<&str>, persistent: bool, timeout: Option<Duration>) {
        self.push(Notification {
            level: NotificationLevel::Info,
            title: title.to_string(),
            detail: detail.map(str::to_string),
            persistent,
            timeout,
        });
    }

    fn warn(&self, title: &str, detail: Option<&str>) {
        self.push(Notification {
            level: NotificationLevel::Warn,
            title: title.to_string(),
            detail: detail.map(str::to_string),
            persistent: true,
            timeout: None,
        });
    }

    fn error(&self, title: &str, detail: Option<&str>) {
        self.push(Notification {
            level: NotificationLevel::Error,
            title: title.to_string(),
            detail: detail.map(str::to_string),
            persistent: true,
            timeout: None,
        });
    }
}
