use crate::domain::value_objects::{RecordSyncStatus, Table};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Cached copy of a domain row, readable while offline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocalRecord {
    pub table: Table,
    pub id: String,
    pub data: Value,
    pub sync_status: RecordSyncStatus,
    pub last_modified: DateTime<Utc>,
}

impl LocalRecord {
    /// An optimistic local write, not yet confirmed by the remote store.
    pub fn local(table: Table, id: String, data: Value) -> Self {
        Self {
            table,
            id,
            data,
            sync_status: RecordSyncStatus::Local,
            last_modified: Utc::now(),
        }
    }

    /// A server-confirmed copy.
    pub fn synced(table: Table, id: String, data: Value) -> Self {
        Self {
            table,
            id,
            data,
            sync_status: RecordSyncStatus::Synced,
            last_modified: Utc::now(),
        }
    }
}
