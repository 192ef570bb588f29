//! Turning aria2 status lists into queue snapshots and lifecycle events

use super::rpc::Aria2Status;
use crate::types::{DownloadItem, EngineEvent, ItemStatus};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// What this crate handed to aria2 for a gid
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Submitted {
    pub(crate) name: String,
    pub(crate) url: String,
    pub(crate) local_dir: PathBuf,
}

impl Submitted {
    pub(crate) fn new(url: &str, local_dir: &Path) -> Self {
        Self {
            name: name_from_url(url),
            url: url.to_string(),
            local_dir: local_dir.to_path_buf(),
        }
    }

    /// Item placeholder for a URI aria2 never accepted
    pub(crate) fn rejected(&self, error: &str) -> DownloadItem {
        DownloadItem {
            gid: String::new(),
            name: self.name.clone(),
            url: self.url.clone(),
            local_dir: self.local_dir.clone(),
            status: ItemStatus::Error,
            total_length: 0,
            completed_length: 0,
            error_message: Some(error.to_string()),
        }
    }
}

/// Decoded last path segment of a URL
///
/// Query and fragment are not part of the name. Percent-escapes are decoded,
/// so `ftp://h/d/a%231.zip` names `a#1.zip`.
pub(crate) fn name_from_url(url: &str) -> String {
    let path = match url::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.to_string(),
    };
    let segment = path.trim_end_matches('/').rsplit('/').next().unwrap_or_default();

    match urlencoding::decode(segment) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => segment.to_string(),
    }
}

/// Convert one aria2 status entry into a queue item
///
/// Name, URL and directory come from our own submission record when there
/// is one, otherwise from what aria2 reports.
pub(crate) fn to_item(status: &Aria2Status, submitted: Option<&Submitted>) -> DownloadItem {
    let first_file = status.files.first();
    let reported_url = first_file
        .and_then(|f| f.uris.first())
        .map(|u| u.uri.clone())
        .unwrap_or_default();

    let (name, url, local_dir) = match submitted {
        Some(s) => (s.name.clone(), s.url.clone(), s.local_dir.clone()),
        None => {
            let name = first_file
                .and_then(|f| Path::new(&f.path).file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| name_from_url(&reported_url));
            (name, reported_url, PathBuf::from(&status.dir))
        }
    };

    DownloadItem {
        gid: status.gid.clone(),
        name,
        url,
        local_dir,
        status: ItemStatus::from_aria2(&status.status),
        total_length: status.total_length.parse().unwrap_or(0),
        completed_length: status.completed_length.parse().unwrap_or(0),
        error_message: status.error_message.clone().filter(|m| !m.is_empty()),
    }
}

/// Completion and cancellation events for items whose status changed since `previous`
///
/// `previous` maps gid to the status seen in the last snapshot. An item is
/// reported once, the first time it is seen `complete` or `removed`.
pub(crate) fn transitions(
    previous: &HashMap<String, ItemStatus>,
    items: &[DownloadItem],
) -> Vec<EngineEvent> {
    items
        .iter()
        .filter(|item| previous.get(&item.gid) != Some(&item.status))
        .filter_map(|item| match item.status {
            ItemStatus::Complete => Some(EngineEvent::ItemCompleted(item.clone())),
            ItemStatus::Removed => Some(EngineEvent::ItemCancelled(item.clone())),
            _ => None,
        })
        .collect()
}

/// gid → status index of a snapshot
pub(crate) fn status_index(items: &[DownloadItem]) -> HashMap<String, ItemStatus> {
    items
        .iter()
        .map(|item| (item.gid.clone(), item.status))
        .collect()
}
