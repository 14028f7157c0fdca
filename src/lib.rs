//! syncstate - change-detection cache for incremental syncs
//!
//! Persists a content hash per resource between sync runs so unchanged
//! resources can be skipped, and wipes build artifacts when the
//! dependency layer mode changes.

pub mod cli;
pub mod config;
pub mod error;
pub mod state;
pub mod ui;

pub use error::{SyncError, SyncResult};
pub use state::{SyncChange, SyncHandle, SyncSession, SyncState, SyncStateStore};
