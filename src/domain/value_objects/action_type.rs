use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of deferred mutation carried by a sync action.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncActionType {
    Create,
    Update,
    Delete,
}

impl SyncActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncActionType::Create => "create",
            SyncActionType::Update => "update",
            SyncActionType::Delete => "delete",
        }
    }

    pub fn parse(value: &str) -> Result<Self, String> {
        match value {
            "create" => Ok(SyncActionType::Create),
            "update" => Ok(SyncActionType::Update),
            "delete" => Ok(SyncActionType::Delete),
            other => Err(format!("Unknown sync action type: {other}")),
        }
    }
}

impl fmt::Display for SyncActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
