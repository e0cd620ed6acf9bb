use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Aggregate sync state surfaced to presentation layers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineStatus {
    pub is_online: bool,
    pub pending_actions: u64,
    pub failed_actions: u64,
    /// Timestamp of the most recently completed action, if any.
    pub last_sync_at: Option<DateTime<Utc>>,
    /// Approximate footprint of all cached local data.
    pub storage_bytes: u64,
}
