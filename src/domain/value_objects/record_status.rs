use serde::{Deserialize, Serialize};
use std::fmt;

/// Sync state of a cached local record.
///
/// `Conflict` is representable but no current code path sets it; conflict
/// handling is row-level last-writer-wins.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSyncStatus {
    /// Written offline, not yet confirmed by the remote store.
    Local,
    /// Confirmed by the remote store.
    Synced,
    /// Reserved.
    Conflict,
}

impl RecordSyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordSyncStatus::Local => "local",
            RecordSyncStatus::Synced => "synced",
            RecordSyncStatus::Conflict => "conflict",
        }
    }

    pub fn parse(value: &str) -> Result<Self, String> {
        match value {
            "local" => Ok(RecordSyncStatus::Local),
            "synced" => Ok(RecordSyncStatus::Synced),
            "conflict" => Ok(RecordSyncStatus::Conflict),
            other => Err(format!("Unknown record sync status: {other}")),
        }
    }
}

impl fmt::Display for RecordSyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
