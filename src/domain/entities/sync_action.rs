use crate::domain::value_objects::{
    ActorId, RecordPayload, SyncActionStatus, SyncActionType, Table, TenantId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A durably queued mutation awaiting replay against the remote store.
///
/// Status, retry count and last error are owned by the sync processor; no
/// other component writes them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncAction {
    pub id: String,
    pub action_type: SyncActionType,
    pub table: Table,
    pub payload: RecordPayload,
    pub actor_id: ActorId,
    pub tenant_id: TenantId,
    pub status: SyncActionStatus,
    pub retry_count: u32,
    pub last_error: Option<String>,
    pub enqueued_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl SyncAction {
    pub fn new(
        action_type: SyncActionType,
        table: Table,
        payload: RecordPayload,
        actor_id: ActorId,
        tenant_id: TenantId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            action_type,
            table,
            payload,
            actor_id,
            tenant_id,
            status: SyncActionStatus::Pending,
            retry_count: 0,
            last_error: None,
            enqueued_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// The row this action targets, read from the payload.
    pub fn record_id(&self) -> Option<&str> {
        self.payload.record_id()
    }

    pub fn mark_syncing(&mut self) {
        self.status = SyncActionStatus::Syncing;
        self.updated_at = Utc::now();
    }

    pub fn mark_completed(&mut self) {
        let now = Utc::now();
        self.status = SyncActionStatus::Completed;
        self.last_error = None;
        self.updated_at = now;
        self.completed_at = Some(now);
    }

    /// Records a failed attempt. Returns to `Pending` while under the retry
    /// cap; settles at `Failed` once the cap is reached or the failure is
    /// known to be permanent.
    pub fn mark_attempt_failed(&mut self, error: String, max_retries: u32, permanent: bool) {
        self.retry_count += 1;
        self.last_error = Some(error);
        self.updated_at = Utc::now();
        self.status = if permanent || self.retry_count >= max_retries {
            SyncActionStatus::Failed
        } else {
            SyncActionStatus::Pending
        };
    }

    /// Recovery for an action caught mid-sync by a shutdown: back in line
    /// without consuming a retry. The remote call may or may not have
    /// landed; replaying it is safe because writes are row-level upserts.
    pub fn mark_interrupted(&mut self) {
        self.status = SyncActionStatus::Pending;
        self.last_error = Some("interrupted before remote confirmation".to_string());
        self.updated_at = Utc::now();
    }

    /// Manual remediation: puts a failed action back in line with a fresh
    /// retry budget.
    pub fn reset_for_retry(&mut self) {
        self.status = SyncActionStatus::Pending;
        self.retry_count = 0;
        self.last_error = None;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_action() -> SyncAction {
        SyncAction::new(
            SyncActionType::Update,
            Table::Crops,
            RecordPayload::new(json!({"id": "c1", "name": "Maize"})).unwrap(),
            ActorId::new("user-1".into()).unwrap(),
            TenantId::new("coop-9".into()).unwrap(),
        )
    }

    #[test]
    fn new_action_starts_pending_with_zero_retries() {
        let action = sample_action();
        assert_eq!(action.status, SyncActionStatus::Pending);
        assert_eq!(action.retry_count, 0);
        assert!(action.last_error.is_none());
        assert_eq!(action.record_id(), Some("c1"));
    }

    #[test]
    fn attempt_failures_return_to_pending_until_cap() {
        let mut action = sample_action();
        for attempt in 1..5 {
            action.mark_syncing();
            action.mark_attempt_failed("timeout".into(), 5, false);
            assert_eq!(action.status, SyncActionStatus::Pending);
            assert_eq!(action.retry_count, attempt);
        }
        action.mark_syncing();
        action.mark_attempt_failed("timeout".into(), 5, false);
        assert_eq!(action.status, SyncActionStatus::Failed);
        assert_eq!(action.retry_count, 5);
    }

    #[test]
    fn permanent_failure_skips_remaining_retries() {
        let mut action = sample_action();
        action.mark_syncing();
        action.mark_attempt_failed("validation rejected".into(), 5, true);
        assert_eq!(action.status, SyncActionStatus::Failed);
        assert_eq!(action.retry_count, 1);
    }

    #[test]
    fn completion_clears_last_error() {
        let mut action = sample_action();
        action.mark_attempt_failed("timeout".into(), 5, false);
        action.mark_syncing();
        action.mark_completed();
        assert_eq!(action.status, SyncActionStatus::Completed);
        assert!(action.last_error.is_none());
        assert!(action.completed_at.is_some());
    }

    #[test]
    fn interrupted_action_returns_to_pending_without_a_retry() {
        let mut action = sample_action();
        action.mark_syncing();
        action.mark_interrupted();
        assert_eq!(action.status, SyncActionStatus::Pending);
        assert_eq!(action.retry_count, 0);
        assert!(action.last_error.is_some());
    }

    #[test]
    fn reset_for_retry_restores_budget() {
        let mut action = sample_action();
        action.mark_attempt_failed("rejected".into(), 1, false);
        assert_eq!(action.status, SyncActionStatus::Failed);

        action.reset_for_retry();
        assert_eq!(action.status, SyncActionStatus::Pending);
        assert_eq!(action.retry_count, 0);
        assert!(action.last_error.is_none());
    }
}
