//! Turning a selection of remote names into engine download requests
//!
//! [`build_requests`] is pure: it decides what to submit and what to skip.
//! Notifying about skipped names and talking to the engine happens in
//! [`DownloadOrchestrator::add_downloads`](crate::orchestrator::DownloadOrchestrator::add_downloads).

use crate::suggestion::Suggestions;
use crate::types::Suggestion;
use crate::utils::entry_url;
use std::collections::HashSet;

/// The outcome of planning a submission batch
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestPlan {
    /// Fully-qualified URIs to submit, in selection order
    pub uris: Vec<String>,
    /// Selected names skipped because they are already downloading
    pub skipped: Vec<String>,
}

impl RequestPlan {
    /// Whether there is anything to hand to the engine
    pub fn is_empty(&self) -> bool {
        self.uris.is_empty()
    }
}

/// Build download requests for `selected` names under `remote_base`
///
/// Names whose suggestion is `Downloading` are skipped. Everything else,
/// including names missing from `suggestions`, is percent-encoded and joined
/// onto `remote_base`.
/// Output order follows the selection; a name selected twice is requested once.
pub fn build_requests<S: AsRef<str>>(
    selected: &[S],
    remote_base: &str,
    suggestions: &Suggestions,
) -> RequestPlan {
    let mut plan = RequestPlan::default();
    let mut seen = HashSet::new();

    for name in selected {
        let name = name.as_ref();
        debug_assert!(!name.is_empty(), "selected remote name must not be empty");
        if !seen.insert(name) {
            continue;
        }

        match suggestions.get(name).unwrap_or_default() {
            Suggestion::Downloading => {
                tracing::debug!(name = %name, "Skipping entry already in download queue");
                plan.skipped.push(name.to_string());
            }
            Suggestion::NotQueued | Suggestion::Downloaded => {
                plan.uris.push(entry_url(remote_base, name));
            }
        }
    }

    plan
}
