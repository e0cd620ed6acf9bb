use crate::domain::entities::{LocalRecord, SyncAction};
use crate::domain::value_objects::Table;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metadata describing a stored backup, kept queryable without loading the
/// blob itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackupMetadata {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub tables: Vec<Table>,
    /// Per-table record count at snapshot time, keyed by table name.
    pub record_counts: BTreeMap<String, u64>,
    pub size_bytes: u64,
}

/// Point-in-time export of the full local dataset, including the action
/// queue. Serialized as a single JSON blob.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackupSnapshot {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub tables: BTreeMap<String, Vec<LocalRecord>>,
    pub actions: Vec<SyncAction>,
}

impl BackupSnapshot {
    pub fn record_counts(&self) -> BTreeMap<String, u64> {
        self.tables
            .iter()
            .map(|(name, records)| (name.clone(), records.len() as u64))
            .collect()
    }
}
