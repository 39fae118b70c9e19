mod config;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use har_sync_core::{HarFile, Project, RemoteStorageClient};
use har_sync_engine::{cancel_pair, ProviderKind, SyncCoordinator};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let kind: ProviderKind = cli.provider.parse()?;
    let coordinator = SyncCoordinator::new();
    let report = coordinator
        .configure(kind, &cli.connection_config())
        .await
        .with_context(|| format!("configuring {} backend", kind.label()))?;
    if let Some(warning) = &report.warning {
        warn!("connected with warnings: {warning}");
    }

    match &cli.command {
        Command::Push {
            file,
            project,
            group,
        } => push(&coordinator, file, project, group.as_deref()).await,
        Command::List { path } => list(&coordinator, path.as_deref()).await,
        Command::Pull { remote_id, output } => {
            pull(&coordinator, remote_id, output.as_deref()).await
        }
        Command::Delete { remote_id } => delete(&coordinator, remote_id).await,
    }
}

/// Parse a HAR file, label its entries with one group, and sync them.
async fn push(
    coordinator: &SyncCoordinator,
    file: &Path,
    project_name: &str,
    group: Option<&str>,
) -> anyhow::Result<()> {
    let json = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("reading {}", file.display()))?;
    let document = HarFile::from_json(&json)
        .with_context(|| format!("parsing HAR document {}", file.display()))?;

    let group = group
        .map(str::to_string)
        .or_else(|| {
            file.file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        })
        .context("cannot derive a group name from the file name; pass --group")?;

    let mut entries = document.log.entries;
    for (index, entry) in entries.iter_mut().enumerate() {
        entry.id = index as i64 + 1;
        entry.group = group.clone();
    }

    let project = Project {
        id: 0,
        name: project_name.to_string(),
        entries,
    };

    // Ctrl-C aborts the batch between entries and drops the in-flight upload.
    let (handle, signal) = cancel_pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received Ctrl+C, cancelling sync");
            handle.cancel();
        }
    });

    let report = coordinator.sync_project_groups(&project, &signal).await?;
    println!(
        "synced {} entries in {} group(s) of project {project_name}",
        report.entries, report.groups
    );
    Ok(())
}

async fn list(coordinator: &SyncCoordinator, path: Option<&str>) -> anyhow::Result<()> {
    let client = active_client(coordinator).await?;
    let items = client.list_items(path).await?;
    if items.is_empty() {
        println!("(empty)");
        return Ok(());
    }
    for item in items {
        let kind = if item.is_folder { "d" } else { "-" };
        let modified = item
            .last_modified
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{kind} {:>10} {modified:>16}  {}  {}", item.size, item.name, item.id);
    }
    Ok(())
}

async fn pull(
    coordinator: &SyncCoordinator,
    remote_id: &str,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let client = active_client(coordinator).await?;
    let body = client
        .download_item(remote_id)
        .await?
        .with_context(|| format!("remote item not found: {remote_id}"))?;
    match output {
        Some(path) => {
            tokio::fs::write(path, &body)
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            println!("wrote {} bytes to {}", body.len(), path.display());
        }
        None => print!("{body}"),
    }
    Ok(())
}

async fn delete(coordinator: &SyncCoordinator, remote_id: &str) -> anyhow::Result<()> {
    let client = active_client(coordinator).await?;
    client.delete_item(remote_id).await?;
    println!("deleted {remote_id}");
    Ok(())
}

async fn active_client(
    coordinator: &SyncCoordinator,
) -> anyhow::Result<Arc<dyn RemoteStorageClient>> {
    coordinator
        .client()
        .await
        .context("no sync backend configured")
}
