use crate::domain::entities::{LocalRecord, SyncAction};
use crate::domain::value_objects::{SyncActionStatus, Table};
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// The optimistic local write paired with an enqueue.
///
/// Create/update upsert the readable cache copy; delete removes it, so
/// readers observe the mutation immediately.
#[derive(Debug, Clone, PartialEq)]
pub enum OptimisticWrite {
    Upsert(LocalRecord),
    Remove { table: Table, id: String },
}

/// Durable log of pending mutations.
#[async_trait]
pub trait ActionQueueStore: Send + Sync {
    /// Persists the action and applies its optimistic write in a single
    /// transaction; both land or neither does.
    async fn enqueue_action(
        &self,
        action: &SyncAction,
        write: OptimisticWrite,
    ) -> Result<(), AppError>;

    async fn update_action(&self, action: &SyncAction) -> Result<(), AppError>;
    async fn get_action(&self, id: &str) -> Result<Option<SyncAction>, AppError>;

    /// Actions in the given status, ordered by enqueue time ascending
    /// (insertion order breaks timestamp ties).
    async fn actions_with_status(
        &self,
        status: SyncActionStatus,
    ) -> Result<Vec<SyncAction>, AppError>;

    async fn count_actions(&self, status: SyncActionStatus) -> Result<u64, AppError>;
    async fn last_completed_at(&self) -> Result<Option<DateTime<Utc>>, AppError>;

    /// Everything in the queue regardless of status, for backups.
    async fn all_actions(&self) -> Result<Vec<SyncAction>, AppError>;

    /// Replaces the whole queue, for restores. Returns the number inserted.
    async fn replace_all_actions(&self, actions: &[SyncAction]) -> Result<u64, AppError>;

    /// Janitor: drops terminal completed actions older than the cutoff.
    async fn delete_completed_before(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError>;
}
