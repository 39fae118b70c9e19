//! WebDAV backend for har-sync.
//!
//! Implements the `RemoteStorageClient` contract against any WebDAV server
//! (Nextcloud, Nutstore, plain Apache mod_dav). Documents live under a fixed
//! root collection; hierarchical parents are created with sequential `MKCOL`
//! calls because a WebDAV server rejects creating a child collection inside a
//! nonexistent parent.

mod adapter;
mod multistatus;

pub use adapter::{WebDavAdapter, ROOT_COLLECTION};
