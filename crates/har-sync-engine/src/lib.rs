//! Sync engine for har-sync.
//!
//! The `SyncCoordinator` holds the single active backend adapter, derives
//! remote paths from project/group/entry names, serializes entries into
//! exchange documents, and drives per-entry and per-project sync runs.

mod cancel;
mod coordinator;
mod sanitize;

pub use cancel::{cancel_pair, CancelHandle, CancelSignal};
pub use coordinator::{ConfigureReport, ProviderKind, SyncCoordinator, SyncReport};
pub use sanitize::sanitize_name;
