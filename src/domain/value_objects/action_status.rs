use serde::{Deserialize, Serialize};
use std::fmt;

/// Processing state of a queued sync action.
///
/// Only the sync processor moves an action between states. `Completed` and
/// `Failed` are terminal: the processor never picks them up again without an
/// explicit retry reset.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncActionStatus {
    Pending,
    Syncing,
    Completed,
    Failed,
}

impl SyncActionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncActionStatus::Pending => "pending",
            SyncActionStatus::Syncing => "syncing",
            SyncActionStatus::Completed => "completed",
            SyncActionStatus::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Result<Self, String> {
        match value {
            "pending" => Ok(SyncActionStatus::Pending),
            "syncing" => Ok(SyncActionStatus::Syncing),
            "completed" => Ok(SyncActionStatus::Completed),
            "failed" => Ok(SyncActionStatus::Failed),
            other => Err(format!("Unknown sync action status: {other}")),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SyncActionStatus::Completed | SyncActionStatus::Failed)
    }
}

impl fmt::Display for SyncActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
