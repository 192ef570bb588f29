//! Local directory store: the directory the user is mirroring into

use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// The local directory currently being viewed and its listing
#[async_trait]
pub trait LocalDirectory: Send + Sync {
    /// Directory currently being tracked
    async fn current_dir(&self) -> PathBuf;

    /// Entry names of the current directory as of the last reload
    async fn listing(&self) -> Vec<String>;

    /// Load `dir` and make it the current directory
    ///
    /// Safe to call repeatedly for the same directory.
    async fn reload(&self, dir: &Path) -> Result<()>;
}

#[derive(Debug, Default)]
struct DirState {
    dir: PathBuf,
    entries: Vec<String>,
}

/// [`LocalDirectory`] backed by the filesystem
///
/// # Examples
///
/// ```no_run
/// use ftpsync_dl::local_dir::{FsDirectoryStore, LocalDirectory};
/// use std::path::Path;
///
/// # async fn example() -> ftpsync_dl::Result<()> {
/// let store = FsDirectoryStore::new();
/// store.reload(Path::new("/srv/mirror")).await?;
/// println!("{} entries", store.listing().await.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct FsDirectoryStore {
    state: RwLock<DirState>,
}

impl FsDirectoryStore {
    /// Create a store with no directory loaded
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LocalDirectory for FsDirectoryStore {
    async fn current_dir(&self) -> PathBuf {
        self.state.read().await.dir.clone()
    }

    async fn listing(&self) -> Vec<String> {
        self.state.read().await.entries.clone()
    }

    async fn reload(&self, dir: &Path) -> Result<()> {
        let mut entries = Vec::new();
        let mut read_dir = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = read_dir.next_entry().await? {
            entries.push(entry.file_name().to_string_lossy().into_owned());
        }
        entries.sort();

        tracing::debug!(dir = %dir.display(), entries = entries.len(), "Loaded local directory");

        let mut state = self.state.write().await;
        state.dir = dir.to_path_buf();
        state.entries = entries;
        Ok(())
    }
}
