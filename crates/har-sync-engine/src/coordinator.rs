use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use har_sync_core::{
    HarEntry, HarFile, Project, RemoteStorageClient, SyncError, UNGROUPED_LABEL,
};
use har_sync_custom::CustomApiAdapter;
use har_sync_webdav::WebDavAdapter;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use crate::cancel::{run_cancellable, CancelSignal};
use crate::sanitize::sanitize_name;

/// The backends the coordinator knows how to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    WebDav,
    CustomServer,
}

impl ProviderKind {
    /// Display name, matching the provider names used in saved settings.
    pub fn label(&self) -> &'static str {
        match self {
            ProviderKind::WebDav => "WebDAV",
            ProviderKind::CustomServer => "Custom Server",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "webdav" => Ok(ProviderKind::WebDav),
            "custom server" | "custom" => Ok(ProviderKind::CustomServer),
            other => Err(SyncError::Configuration(format!(
                "unknown sync provider: {other}"
            ))),
        }
    }
}

/// Result of configuring a backend. `warning` is set when the adapter
/// initialized in a degraded state (connected, but a provisioning step was
/// deferred).
#[derive(Debug, Clone)]
pub struct ConfigureReport {
    pub provider: ProviderKind,
    pub warning: Option<String>,
}

/// Counts for one project sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub groups: usize,
    pub entries: usize,
}

/// Holds the single active backend adapter and drives sync operations.
///
/// The adapter slot is swapped wholesale under a write lock, so a sync
/// always observes either the fully-old or fully-new adapter. Only
/// `configure` (and `install_client`) write the slot; sync operations read.
#[derive(Default)]
pub struct SyncCoordinator {
    client: RwLock<Option<Arc<dyn RemoteStorageClient>>>,
}

impl SyncCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct the adapter for `kind`, initialize it, and make it the
    /// active backend. The previous adapter stays active if initialization
    /// fails hard; a degraded initialization still swaps and reports a
    /// warning.
    #[instrument(skip(self, config), level = "debug")]
    pub async fn configure(
        &self,
        kind: ProviderKind,
        config: &HashMap<String, String>,
    ) -> Result<ConfigureReport, SyncError> {
        let mut adapter: Box<dyn RemoteStorageClient> = match kind {
            ProviderKind::WebDav => Box::new(WebDavAdapter::new()),
            ProviderKind::CustomServer => Box::new(CustomApiAdapter::new()),
        };

        let outcome = adapter.initialize(config).await?;
        *self.client.write().await = Some(Arc::from(adapter));

        info!("configured sync backend {}", kind.label());
        Ok(ConfigureReport {
            provider: kind,
            warning: outcome.warning().map(str::to_string),
        })
    }

    /// Install an already-initialized client as the active backend.
    pub async fn install_client(&self, client: Arc<dyn RemoteStorageClient>) {
        *self.client.write().await = Some(client);
    }

    /// The active backend, if one is configured.
    pub async fn client(&self) -> Option<Arc<dyn RemoteStorageClient>> {
        self.client.read().await.clone()
    }

    async fn active(&self) -> Result<Arc<dyn RemoteStorageClient>, SyncError> {
        self.client().await.ok_or(SyncError::NotConfigured)
    }

    /// Upload one entry as a single-entry exchange document at
    /// `<project>/<group>/<entry>.har` (each segment sanitized).
    #[instrument(skip(self, entry, cancel), level = "debug", fields(entry_id = entry.id))]
    pub async fn sync_entry(
        &self,
        project_name: &str,
        group_name: &str,
        entry: &HarEntry,
        cancel: &CancelSignal,
    ) -> Result<String, SyncError> {
        let client = self.active().await?;

        let safe_project = sanitize_name(project_name);
        let safe_group = sanitize_name(group_name);
        let mut safe_entry = sanitize_name(&entry.name);
        if safe_entry.is_empty() {
            safe_entry = format!("Entry_{}", entry.id);
        }

        let document = HarFile::envelope(vec![entry.clone()]);
        let json = document
            .to_json_pretty()
            .map_err(|e| SyncError::Serialization(e.to_string()))?;

        let file_name = format!("{safe_entry}.har");
        let parent = format!("{safe_project}/{safe_group}");
        debug!("uploading {parent}/{file_name}");

        run_cancellable(
            cancel,
            client.upload_item(&file_name, &json, None, Some(&parent)),
        )
        .await
    }

    /// Sync every grouped entry of a project, one document per entry, in
    /// group order then entry order. Entries under the ungrouped sentinel or
    /// an empty label are skipped. Fail-fast: the first upload failure aborts
    /// the remaining entries.
    #[instrument(skip(self, project, cancel), level = "debug", fields(project = %project.name))]
    pub async fn sync_project_groups(
        &self,
        project: &Project,
        cancel: &CancelSignal,
    ) -> Result<SyncReport, SyncError> {
        self.active().await?;

        // Partition by group label, preserving first-appearance group order
        // and entry order within each group.
        let mut groups: Vec<(&str, Vec<&HarEntry>)> = Vec::new();
        for entry in &project.entries {
            let label = entry.group.as_str();
            if label.is_empty() || label == UNGROUPED_LABEL {
                continue;
            }
            match groups.iter_mut().find(|(l, _)| *l == label) {
                Some((_, bucket)) => bucket.push(entry),
                None => groups.push((label, vec![entry])),
            }
        }

        let mut entries_synced = 0;
        for (label, bucket) in &groups {
            for entry in bucket {
                if cancel.is_cancelled() {
                    return Err(SyncError::Cancelled);
                }
                self.sync_entry(&project.name, label, entry, cancel).await?;
                entries_synced += 1;
            }
        }

        info!(
            "synced {entries_synced} entries across {} groups of {}",
            groups.len(),
            project.name
        );
        Ok(SyncReport {
            groups: groups.len(),
            entries: entries_synced,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_kind_parses_settings_names() {
        assert_eq!("WebDAV".parse::<ProviderKind>().unwrap(), ProviderKind::WebDav);
        assert_eq!(
            "Custom Server".parse::<ProviderKind>().unwrap(),
            ProviderKind::CustomServer
        );
        assert_eq!(
            "custom".parse::<ProviderKind>().unwrap(),
            ProviderKind::CustomServer
        );
        assert!("ftp".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn provider_labels_round_trip() {
        for kind in [ProviderKind::WebDav, ProviderKind::CustomServer] {
            assert_eq!(kind.label().parse::<ProviderKind>().unwrap(), kind);
        }
    }
}
