//! Remote listing boundary
//!
//! The protocol client that browses the remote server lives outside this
//! crate. It publishes what it sees through [`RemoteListing`].

use crate::error::Result;
use crate::types::Credentials;
use crate::utils::remote_base;
use std::sync::RwLock;

/// The remote directory being browsed and how to log into it
pub trait RemoteListing: Send + Sync {
    /// Server address, e.g. `ftp://host:21`
    fn address(&self) -> String;

    /// Remote directory path currently shown
    fn dir(&self) -> String;

    /// Entry names of the current remote directory, in listing order
    fn entries(&self) -> Vec<String>;

    /// Login for the server; anonymous when the user gave none
    fn credentials(&self) -> Credentials;

    /// Base URL that entry names are joined onto
    fn base_url(&self) -> Result<String> {
        remote_base(&self.address(), &self.dir())
    }
}

#[derive(Debug, Clone, Default)]
struct ListingState {
    dir: String,
    entries: Vec<String>,
}

/// In-memory [`RemoteListing`] updated by the host's protocol client
#[derive(Debug)]
pub struct StaticRemoteListing {
    address: String,
    credentials: Credentials,
    state: RwLock<ListingState>,
}

impl StaticRemoteListing {
    /// Listing for `address`, logging in with `username`/`password` or anonymously
    pub fn new(address: impl Into<String>, username: Option<&str>, password: Option<&str>) -> Self {
        Self {
            address: address.into(),
            credentials: Credentials::or_anonymous(username, password),
            state: RwLock::new(ListingState {
                dir: "/".to_string(),
                entries: Vec::new(),
            }),
        }
    }

    /// Replace the current directory and its entries
    pub fn set_listing(&self, dir: impl Into<String>, entries: Vec<String>) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.dir = dir.into();
        state.entries = entries;
    }

    fn snapshot(&self) -> ListingState {
        self.state.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl RemoteListing for StaticRemoteListing {
    fn address(&self) -> String {
        self.address.clone()
    }

    fn dir(&self) -> String {
        self.snapshot().dir
    }

    fn entries(&self) -> Vec<String> {
        self.snapshot().entries
    }

    fn credentials(&self) -> Credentials {
        self.credentials.clone()
    }
}
