use crate::domain::value_objects::{ActorId, SyncActionType, Table, TenantId};
use serde::{Deserialize, Serialize};

/// Structured audit record emitted for every sync attempt.
///
/// Delivery is fire-and-forget; producing one must never block or fail the
/// sync pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub actor_id: ActorId,
    pub tenant_id: TenantId,
    pub action: String,
    pub resource_type: Table,
    pub resource_id: Option<String>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub metadata: ActivityMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityMetadata {
    pub sync_action_id: String,
    pub sync_type: SyncActionType,
    pub retry_count: u32,
    pub is_online: bool,
}

impl ActivityEntry {
    pub const OFFLINE_SYNC: &'static str = "offline_sync";
}
