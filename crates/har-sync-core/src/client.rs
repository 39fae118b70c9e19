use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::SyncError;

/// Configuration keys recognized by the backend adapters.
///
/// `initialize` receives a plain string map; each adapter consumes the keys
/// it knows and ignores the rest.
pub mod config_keys {
    pub const BASE_URL: &str = "BaseUrl";
    pub const USERNAME: &str = "Username";
    pub const PASSWORD: &str = "Password";
    pub const TOKEN: &str = "Token";
}

/// One entry of a remote listing.
///
/// Produced only by `list_items`; never persisted locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteItemInfo {
    /// Backend-opaque handle (full path for WebDAV, server id for REST).
    pub id: String,
    pub name: String,
    pub is_folder: bool,
    pub last_modified: Option<DateTime<Utc>>,
    pub size: u64,
}

/// Result of adapter initialization.
///
/// `Degraded` means the adapter is configured and usable, but a provisioning
/// step (such as creating the WebDAV root collection) failed and is deferred
/// to first real use. Callers can surface the message as a warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    Ready,
    Degraded(String),
}

impl InitOutcome {
    /// The warning text for a degraded initialization, if any.
    pub fn warning(&self) -> Option<&str> {
        match self {
            InitOutcome::Ready => None,
            InitOutcome::Degraded(msg) => Some(msg),
        }
    }
}

/// Capability set implemented by every remote storage backend.
///
/// `initialize` must be called exactly once before any other operation;
/// calling another operation first fails with `SyncError::NotInitialized`.
/// All operations may suspend on network I/O; transport failures surface as
/// `SyncError::Transport` carrying the backend status and description.
#[async_trait]
pub trait RemoteStorageClient: Send + Sync {
    /// Human-readable backend name.
    fn name(&self) -> &'static str;

    /// Consume recognized configuration keys and set up the wire client.
    async fn initialize(
        &mut self,
        config: &HashMap<String, String>,
    ) -> Result<InitOutcome, SyncError>;

    /// List children of `parent_id`, or of the backend's default root when
    /// omitted. A nonexistent container yields an empty list, not an error.
    async fn list_items(
        &self,
        parent_id: Option<&str>,
    ) -> Result<Vec<RemoteItemInfo>, SyncError>;

    /// Fetch the raw document body, or `None` if the resource does not exist.
    async fn download_item(&self, remote_id: &str) -> Result<Option<String>, SyncError>;

    /// Create or overwrite a document. `parent_id` designates a hierarchical
    /// path whose ancestors must exist or be created before the write.
    /// Returns the backend-opaque id of the written resource.
    async fn upload_item(
        &self,
        name: &str,
        content: &str,
        remote_id: Option<&str>,
        parent_id: Option<&str>,
    ) -> Result<String, SyncError>;

    /// Delete a document. Idempotent: deleting an already-absent resource
    /// succeeds silently.
    async fn delete_item(&self, remote_id: &str) -> Result<(), SyncError>;
}
