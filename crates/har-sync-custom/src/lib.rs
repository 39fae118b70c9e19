//! Generic REST backend for har-sync.
//!
//! Implements the `RemoteStorageClient` contract against a self-hosted item
//! server rooted at `{base}/api/items`, with bearer-token authorization when
//! a token is configured. Unlike WebDAV, the server manages hierarchy itself:
//! a `parentId` string accompanies each item and no folder provisioning is
//! needed before a write.

mod adapter;

pub use adapter::CustomApiAdapter;
