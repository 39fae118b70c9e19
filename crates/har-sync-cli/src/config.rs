use std::collections::HashMap;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use har_sync_core::config_keys;

/// Mirror captured HTTP traffic (HAR) to a remote store.
#[derive(Parser, Debug)]
#[command(name = "har-sync")]
#[command(about = "Push, list, and curate HAR documents on a WebDAV or custom REST backend")]
pub struct Cli {
    /// Sync backend: "webdav" or "custom"
    #[arg(long, default_value = "webdav", env = "HAR_SYNC_PROVIDER")]
    pub provider: String,

    /// Base URL of the remote endpoint
    #[arg(long, env = "HAR_SYNC_BASE_URL")]
    pub base_url: String,

    /// WebDAV username
    #[arg(long, default_value = "", env = "HAR_SYNC_USERNAME")]
    pub username: String,

    /// WebDAV password
    #[arg(long, default_value = "", env = "HAR_SYNC_PASSWORD")]
    pub password: String,

    /// Bearer token for the custom server backend
    #[arg(long, default_value = "", env = "HAR_SYNC_TOKEN")]
    pub token: String,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse a HAR file and upload its entries, one document per entry
    Push {
        /// HAR file to read
        file: PathBuf,
        /// Project the entries belong to
        #[arg(long)]
        project: String,
        /// Group label for the entries (default: the file stem)
        #[arg(long)]
        group: Option<String>,
    },
    /// List remote items under a container
    List {
        /// Remote container path or id (default: the backend root)
        path: Option<String>,
    },
    /// Download a remote document
    Pull {
        remote_id: String,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Delete a remote document
    Delete { remote_id: String },
}

impl Cli {
    /// Connection parameters for the configured backend; empty credentials
    /// are omitted so each adapter only sees the keys it recognizes.
    pub fn connection_config(&self) -> HashMap<String, String> {
        let mut config = HashMap::from([(
            config_keys::BASE_URL.to_string(),
            self.base_url.clone(),
        )]);
        if !self.username.is_empty() {
            config.insert(config_keys::USERNAME.to_string(), self.username.clone());
        }
        if !self.password.is_empty() {
            config.insert(config_keys::PASSWORD.to_string(), self.password.clone());
        }
        if !self.token.is_empty() {
            config.insert(config_keys::TOKEN.to_string(), self.token.clone());
        }
        config
    }
}
