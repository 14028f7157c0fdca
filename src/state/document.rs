//! Sync state file format
//!
//! The state file is a TOML document with two sections:
//!
//! ```toml
//! # This file is auto generated by syncstate sync command
//! [sync_state]
//! dependency_layer = true
//!
//! [resource_sync_states]
//!
//! [resource_sync_states.Parent-Function]
//! hash = "9f86d081884c7d65"
//! sync_time = "2024-05-01T10:00:00.123456Z"
//! ```
//!
//! Decoding never fails: missing sections fall back to defaults and a
//! document with neither section decodes to `None`.

use super::model::{escape_resource_id, unescape_resource_key, ResourceSyncRecord, SyncState};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use toml_edit::{value, DocumentMut, Item, Table, TableLike};
use tracing::warn;

/// Fixed name of the state file, placed next to the build directory
pub const SYNC_STATE_FILE_NAME: &str = "sync.toml";

const HEADER_COMMENT: &str = "# This file is auto generated by syncstate sync command";

const SYNC_STATE: &str = "sync_state";
const RESOURCE_SYNC_STATES: &str = "resource_sync_states";
const DEPENDENCY_LAYER: &str = "dependency_layer";
const HASH: &str = "hash";
const SYNC_TIME: &str = "sync_time";

/// Text encoding of a [`SyncState`]
pub trait StateFormat: Send + Sync {
    /// Render the state as file contents
    fn encode(&self, state: &SyncState) -> String;

    /// Best-effort parse; `None` means "no usable state"
    fn decode(&self, text: &str) -> Option<SyncState>;
}

/// TOML state format backed by `toml_edit`
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlFormat;

impl StateFormat for TomlFormat {
    fn encode(&self, state: &SyncState) -> String {
        state_to_document(state).to_string()
    }

    fn decode(&self, text: &str) -> Option<SyncState> {
        match text.parse::<DocumentMut>() {
            Ok(doc) => document_to_state(&doc),
            Err(e) => {
                warn!("Ignoring unparseable sync state: {}", e);
                None
            }
        }
    }
}

/// Build the TOML document for a state
pub fn state_to_document(state: &SyncState) -> DocumentMut {
    let mut sync_state = Table::new();
    sync_state.insert(DEPENDENCY_LAYER, value(state.dependency_layer));
    sync_state
        .decor_mut()
        .set_prefix(format!("{}\n", HEADER_COMMENT));

    let mut records = Table::new();
    for (resource_id, record) in &state.resource_records {
        let mut entry = Table::new();
        entry.insert(HASH, value(record.hash_value.as_str()));
        entry.insert(SYNC_TIME, value(format_sync_time(&record.sync_time)));
        records.insert(&escape_resource_id(resource_id), Item::Table(entry));
    }

    let mut doc = DocumentMut::new();
    doc.insert(SYNC_STATE, Item::Table(sync_state));
    doc.insert(RESOURCE_SYNC_STATES, Item::Table(records));
    doc
}

/// Read a state back out of a TOML document
///
/// Empty sections count as absent. Records without a hash or with an
/// unreadable sync time are skipped.
pub fn document_to_state(doc: &DocumentMut) -> Option<SyncState> {
    let sync_state = section(doc, SYNC_STATE);
    let records = section(doc, RESOURCE_SYNC_STATES);

    if sync_state.is_none() && records.is_none() {
        return None;
    }

    let dependency_layer = sync_state
        .and_then(|table| table.get(DEPENDENCY_LAYER))
        .and_then(Item::as_bool)
        .unwrap_or(false);

    let mut state = SyncState::new(dependency_layer);
    for (key, item) in records.into_iter().flat_map(|table| table.iter()) {
        match read_record(item) {
            Some(record) => {
                state
                    .resource_records
                    .insert(unescape_resource_key(key), record);
            }
            None => warn!("Skipping malformed sync state record {}", key),
        }
    }

    Some(state)
}

fn section<'a>(doc: &'a DocumentMut, name: &str) -> Option<&'a dyn TableLike> {
    doc.get(name)
        .and_then(Item::as_table_like)
        .filter(|table| !table.is_empty())
}

fn read_record(item: &Item) -> Option<ResourceSyncRecord> {
    let table = item.as_table_like()?;
    let hash = table.get(HASH).and_then(Item::as_str)?;
    let sync_time = table
        .get(SYNC_TIME)
        .and_then(Item::as_str)
        .and_then(parse_sync_time)?;
    Some(ResourceSyncRecord::at(hash, sync_time))
}

/// Format a sync time as RFC 3339 in UTC
pub fn format_sync_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parse an ISO-8601 sync time
///
/// Offset-less timestamps are taken to be UTC.
pub fn parse_sync_time(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(time) = DateTime::parse_from_rfc3339(text) {
        return Some(time.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
