//! Persisted sync state for incremental syncs
//!
//! Tracks, per resource, the content hash and time of the last successful
//! sync so unchanged resources can be skipped on the next run.
//!
//! # Lifecycle
//!
//! | Step | Lock | Disk |
//! |------|------|------|
//! | `SyncStateStore::new` | - | none |
//! | `start` | held for the read | reads `sync.toml`, may remove build dirs |
//! | `update_resource_sync_state` | held for mutation + write | writes `sync.toml` |
//! | `record_resource_hash` | held for lookup + mutation + write | writes `sync.toml` if changed |
//! | `get_resource_latest_sync_hash` | held for the read | none |
//! | `SyncSession::stop` / drop | held for the write | writes `sync.toml` |
//!
//! Updates and queries are only reachable from a started session, through
//! [`SyncSession`] or a [`SyncHandle`] cloned from it.
//!
//! Entries never expire. A change of dependency layer mode between runs
//! wipes the build, cache and dependencies directories but keeps the
//! recorded hashes.

pub mod cleanup;
pub mod document;
pub mod model;
pub mod store;

pub use cleanup::{remove_dir_if_exists, CleanupExecutor, FsCleanup};
pub use document::{StateFormat, TomlFormat, SYNC_STATE_FILE_NAME};
pub use model::{
    escape_resource_id, unescape_resource_key, ResourceSyncRecord, SyncChange, SyncState,
};
pub use store::{
    read_state_file, state_file_path, SyncHandle, SyncSession, SyncStateStore,
    DEFAULT_DEPENDENCIES_DIR,
};
