//! Download suggestions: is a remote entry already queued or already local?
//!
//! Suggestions are derived on every call from the current queue snapshot and
//! both listings. Nothing here is cached; a stale answer would let the same
//! file be submitted twice.

use crate::types::{DownloadItem, RemoteEntry, Suggestion};
use std::collections::{HashMap, HashSet};

/// Remote entries with their suggestion, in remote listing order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Suggestions {
    entries: Vec<RemoteEntry>,
    index: HashMap<String, usize>,
}

impl Suggestions {
    /// Suggestion for `name`, if it is part of the remote listing
    pub fn get(&self, name: &str) -> Option<Suggestion> {
        self.index.get(name).map(|&i| self.entries[i].suggestion)
    }

    /// All entries in remote listing order
    pub fn entries(&self) -> &[RemoteEntry] {
        &self.entries
    }

    /// Names auto-selection would pick
    pub fn should_download(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.should_download())
            .map(|e| e.name.clone())
            .collect()
    }

    /// Number of remote entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the remote listing was empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Compute the suggestion for every entry of the remote listing
///
/// Precedence: `Downloading` (queued with a non-terminal status) wins over
/// `Downloaded` (present locally), which wins over `NotQueued`.
pub fn compute_suggestions<S: AsRef<str>>(
    remote_listing: &[S],
    queue: &[DownloadItem],
    local_listing: &[S],
) -> Suggestions {
    let in_flight: HashSet<&str> = queue
        .iter()
        .filter(|item| item.is_in_flight())
        .map(|item| item.name.as_str())
        .collect();
    let local: HashSet<&str> = local_listing.iter().map(AsRef::as_ref).collect();

    let mut suggestions = Suggestions::default();
    for name in remote_listing {
        let name = name.as_ref();
        // Listings from some servers repeat entries; the first one wins
        if suggestions.index.contains_key(name) {
            continue;
        }

        let suggestion = if in_flight.contains(name) {
            Suggestion::Downloading
        } else if local.contains(name) {
            Suggestion::Downloaded
        } else {
            Suggestion::NotQueued
        };

        suggestions
            .index
            .insert(name.to_string(), suggestions.entries.len());
        suggestions.entries.push(RemoteEntry {
            name: name.to_string(),
            suggestion,
        });
    }

    tracing::debug!(
        remote = suggestions.len(),
        in_flight = in_flight.len(),
        local = local.len(),
        "Computed download suggestions"
    );

    suggestions
}
