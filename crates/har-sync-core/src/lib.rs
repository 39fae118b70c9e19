//! Core traits and types shared by the har-sync remote storage backends.
//!
//! This crate defines the abstractions the sync engine and the backend
//! adapters agree on:
//! - `RemoteStorageClient`: the capability set every backend implements
//! - `RemoteItemInfo`: the shape of a remote listing entry
//! - `SyncError`: the normalized error taxonomy
//! - The HAR 1.2 document model exchanged with remote storage

mod client;
mod error;
mod har;
mod project;

pub use client::{config_keys, InitOutcome, RemoteItemInfo, RemoteStorageClient};
pub use error::SyncError;
pub use har::{
    HarContent, HarCookie, HarCreator, HarEntry, HarFile, HarHeader, HarLog, HarPage,
    HarPostData, HarPostParam, HarQueryString, HarRequest, HarResponse, HAR_VERSION,
};
pub use project::{Project, UNGROUPED_LABEL};
