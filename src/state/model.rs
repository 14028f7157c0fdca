//! Sync state model
//!
//! A `SyncState` is the dependency layer mode flag plus one
//! `ResourceSyncRecord` per resource that was synced successfully.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Change-detection record for a single resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceSyncRecord {
    /// Content fingerprint at the last successful sync
    pub hash_value: String,

    /// When the record was written
    pub sync_time: DateTime<Utc>,
}

impl ResourceSyncRecord {
    /// Create a record stamped with the current time
    pub fn new(hash_value: impl Into<String>) -> Self {
        Self::at(hash_value, Utc::now())
    }

    /// Create a record with an explicit sync time
    pub fn at(hash_value: impl Into<String>, sync_time: DateTime<Utc>) -> Self {
        Self {
            hash_value: hash_value.into(),
            sync_time,
        }
    }
}

/// Mode flag plus per-resource records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncState {
    /// Whether the shared dependency layer is active for this session family
    pub dependency_layer: bool,

    /// Records keyed by resource id (unescaped)
    pub resource_records: BTreeMap<String, ResourceSyncRecord>,
}

impl SyncState {
    /// Create an empty state with the given mode
    pub fn new(dependency_layer: bool) -> Self {
        Self {
            dependency_layer,
            resource_records: BTreeMap::new(),
        }
    }

    /// Replace the record for `resource_id` with a freshly stamped one
    pub fn update_resource_sync_state(&mut self, resource_id: &str, hash_value: &str) {
        self.resource_records
            .insert(resource_id.to_string(), ResourceSyncRecord::new(hash_value));
    }

    /// Record `hash_value` unless it is already the recorded hash
    ///
    /// An unchanged record keeps its original sync time.
    pub fn record_resource_hash(&mut self, resource_id: &str, hash_value: &str) -> SyncChange {
        let change = match self.hash_for(resource_id) {
            None => SyncChange::New,
            Some(previous) if previous == hash_value => return SyncChange::Unchanged,
            Some(previous) => SyncChange::Changed {
                previous: previous.to_string(),
            },
        };
        self.update_resource_sync_state(resource_id, hash_value);
        change
    }

    /// Hash recorded for `resource_id`, if any
    pub fn hash_for(&self, resource_id: &str) -> Option<&str> {
        self.resource_records
            .get(resource_id)
            .map(|record| record.hash_value.as_str())
    }
}

/// What recording a hash did to a resource's record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncChange {
    /// No hash was recorded before
    New,
    /// Hash differs from the recorded one
    Changed { previous: String },
    /// Hash matches the recorded one
    Unchanged,
}

impl fmt::Display for SyncChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => write!(f, "new"),
            Self::Changed { .. } => write!(f, "changed"),
            Self::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// Map a resource id to a persisted key.
///
/// Nested stack resource ids contain `/`, which is replaced with `-`.
/// Ids that already contain `-` collide with their `/` counterparts;
/// this is not detected.
pub fn escape_resource_id(resource_id: &str) -> String {
    resource_id.replace('/', "-")
}

/// Inverse of [`escape_resource_id`]
pub fn unescape_resource_key(key: &str) -> String {
    key.replace('-', "/")
}
