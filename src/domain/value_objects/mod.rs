mod action_status;
mod action_type;
mod actor_id;
mod payload;
mod record_status;
mod table;
mod tenant_id;

pub use action_status::SyncActionStatus;
pub use action_type::SyncActionType;
pub use actor_id::ActorId;
pub use payload::RecordPayload;
pub use record_status::RecordSyncStatus;
pub use table::Table;
pub use tenant_id::TenantId;
