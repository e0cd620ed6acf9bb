use crate::application::ports::{ActionQueueStore, OptimisticWrite};
use crate::application::services::sync_service::SyncTrigger;
use crate::domain::entities::{LocalRecord, SyncAction};
use crate::domain::value_objects::{ActorId, RecordPayload, SyncActionType, Table, TenantId};
use crate::infrastructure::connectivity::ConnectivityMonitor;
use crate::shared::error::AppError;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

/// Entry point for mutations: records the intended change durably and
/// applies the optimistic local write in the same transaction, so readers
/// observe it immediately.
pub struct SyncQueueService {
    queue: Arc<dyn ActionQueueStore>,
    connectivity: Arc<ConnectivityMonitor>,
    trigger: Option<mpsc::UnboundedSender<SyncTrigger>>,
}

impl SyncQueueService {
    pub fn new(queue: Arc<dyn ActionQueueStore>, connectivity: Arc<ConnectivityMonitor>) -> Self {
        Self {
            queue,
            connectivity,
            trigger: None,
        }
    }

    /// Wires the fire-and-forget trigger the scheduler listens on.
    pub fn with_trigger(mut self, trigger: mpsc::UnboundedSender<SyncTrigger>) -> Self {
        self.trigger = Some(trigger);
        self
    }

    /// Durably queues a mutation and updates the readable cache. Returns the
    /// generated action id once both writes have committed; a storage
    /// failure here fails the originating operation rather than proceeding
    /// as if queued.
    pub async fn enqueue(
        &self,
        action_type: SyncActionType,
        table: Table,
        payload: serde_json::Value,
        actor_id: ActorId,
        tenant_id: TenantId,
    ) -> Result<String, AppError> {
        let payload = RecordPayload::new(payload).map_err(AppError::Validation)?;

        let (payload, write) = match action_type {
            SyncActionType::Create => {
                let id = payload
                    .record_id()
                    .map(str::to_string)
                    .unwrap_or_else(|| Uuid::new_v4().to_string());
                let payload = payload.with_record_id(&id);
                let record = LocalRecord::local(table, id, payload.as_json().clone());
                (payload, OptimisticWrite::Upsert(record))
            }
            SyncActionType::Update => {
                let id = payload
                    .record_id()
                    .ok_or_else(|| {
                        AppError::InvalidInput("Update payload must include an id".to_string())
                    })?
                    .to_string();
                let record = LocalRecord::local(table, id, payload.as_json().clone());
                (payload, OptimisticWrite::Upsert(record))
            }
            SyncActionType::Delete => {
                let id = payload
                    .record_id()
                    .ok_or_else(|| {
                        AppError::InvalidInput("Delete payload must include an id".to_string())
                    })?
                    .to_string();
                (payload.clone(), OptimisticWrite::Remove { table, id })
            }
        };

        let action = SyncAction::new(action_type, table, payload, actor_id, tenant_id);
        self.queue.enqueue_action(&action, write).await?;

        if self.connectivity.is_online() {
            self.request_sync(SyncTrigger::Enqueue);
        }

        Ok(action.id)
    }

    pub async fn get_action(&self, id: &str) -> Result<Option<SyncAction>, AppError> {
        self.queue.get_action(id).await
    }

    pub async fn pending_actions(&self) -> Result<Vec<SyncAction>, AppError> {
        self.queue
            .actions_with_status(crate::domain::value_objects::SyncActionStatus::Pending)
            .await
    }

    pub async fn failed_actions(&self) -> Result<Vec<SyncAction>, AppError> {
        self.queue
            .actions_with_status(crate::domain::value_objects::SyncActionStatus::Failed)
            .await
    }

    /// Manual remediation for an action that exhausted its retries: back to
    /// pending with a fresh budget, then nudge the scheduler.
    pub async fn retry_failed(&self, action_id: &str) -> Result<(), AppError> {
        let mut action = self
            .queue
            .get_action(action_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Sync action {action_id}")))?;

        if action.status != crate::domain::value_objects::SyncActionStatus::Failed {
            return Err(AppError::InvalidInput(format!(
                "Sync action {action_id} is {} and cannot be retried",
                action.status
            )));
        }

        action.reset_for_retry();
        self.queue.update_action(&action).await?;

        if self.connectivity.is_online() {
            self.request_sync(SyncTrigger::Enqueue);
        }
        Ok(())
    }

    /// Resets every failed action. Returns how many were requeued.
    pub async fn retry_all_failed(&self) -> Result<u64, AppError> {
        let failed = self.failed_actions().await?;
        let count = failed.len() as u64;
        for mut action in failed {
            action.reset_for_retry();
            self.queue.update_action(&action).await?;
        }
        if count > 0 && self.connectivity.is_online() {
            self.request_sync(SyncTrigger::Enqueue);
        }
        Ok(count)
    }

    /// Janitor for terminal completed actions; failed actions are kept until
    /// dealt with explicitly.
    pub async fn clear_completed_before(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        self.queue.delete_completed_before(cutoff).await
    }

    fn request_sync(&self, trigger: SyncTrigger) {
        if let Some(tx) = &self.trigger {
            if tx.send(trigger).is_err() {
                debug!("Sync scheduler not running; trigger dropped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::LocalStore;
    use crate::domain::value_objects::{RecordSyncStatus, SyncActionStatus};
    use crate::infrastructure::database::{initialize_schema, SqliteStore};
    use serde_json::json;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup() -> (SyncQueueService, Arc<SqliteStore>, Arc<ConnectivityMonitor>) {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        initialize_schema(&pool).await.unwrap();

        let store = Arc::new(SqliteStore::new(pool));
        let connectivity = Arc::new(ConnectivityMonitor::new(false));
        let service = SyncQueueService::new(store.clone(), connectivity.clone());
        (service, store, connectivity)
    }

    fn actor() -> ActorId {
        ActorId::new("user-1".into()).unwrap()
    }

    fn tenant() -> TenantId {
        TenantId::new("coop-9".into()).unwrap()
    }

    #[tokio::test]
    async fn enqueue_create_is_readable_immediately() {
        let (service, store, _) = setup().await;

        service
            .enqueue(
                SyncActionType::Create,
                Table::Farms,
                json!({"id": "f1", "name": "North Field"}),
                actor(),
                tenant(),
            )
            .await
            .unwrap();

        let record = store.get_record(Table::Farms, "f1").await.unwrap().unwrap();
        assert_eq!(record.sync_status, RecordSyncStatus::Local);
        assert_eq!(record.data["name"], "North Field");
    }

    #[tokio::test]
    async fn enqueue_create_generates_missing_id() {
        let (service, store, _) = setup().await;

        let action_id = service
            .enqueue(
                SyncActionType::Create,
                Table::Crops,
                json!({"name": "Maize"}),
                actor(),
                tenant(),
            )
            .await
            .unwrap();

        let action = store.get_action(&action_id).await.unwrap().unwrap();
        let record_id = action.record_id().unwrap().to_string();
        assert!(!record_id.is_empty());
        assert!(store
            .get_record(Table::Crops, &record_id)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn enqueue_update_requires_id() {
        let (service, _, _) = setup().await;

        let err = service
            .enqueue(
                SyncActionType::Update,
                Table::Crops,
                json!({"name": "Maize"}),
                actor(),
                tenant(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn enqueue_rejects_non_object_payload() {
        let (service, _, _) = setup().await;

        let err = service
            .enqueue(
                SyncActionType::Create,
                Table::Crops,
                json!(["not", "an", "object"]),
                actor(),
                tenant(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn enqueue_delete_removes_local_copy() {
        let (service, store, _) = setup().await;
        store
            .put_record(LocalRecord::synced(
                Table::Livestock,
                "l1".into(),
                json!({"id": "l1"}),
            ))
            .await
            .unwrap();

        service
            .enqueue(
                SyncActionType::Delete,
                Table::Livestock,
                json!({"id": "l1"}),
                actor(),
                tenant(),
            )
            .await
            .unwrap();

        assert!(store
            .get_record(Table::Livestock, "l1")
            .await
            .unwrap()
            .is_none());
        assert_eq!(service.pending_actions().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn enqueue_while_online_fires_trigger() {
        let (service, _, connectivity) = setup().await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        let service = service.with_trigger(tx);
        connectivity.set_online(true);

        service
            .enqueue(
                SyncActionType::Create,
                Table::Farms,
                json!({"id": "f1"}),
                actor(),
                tenant(),
            )
            .await
            .unwrap();

        assert_eq!(rx.try_recv().unwrap(), SyncTrigger::Enqueue);
    }

    #[tokio::test]
    async fn enqueue_while_offline_stays_quiet() {
        let (service, _, _) = setup().await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        let service = service.with_trigger(tx);

        service
            .enqueue(
                SyncActionType::Create,
                Table::Farms,
                json!({"id": "f1"}),
                actor(),
                tenant(),
            )
            .await
            .unwrap();

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn retry_failed_resets_budget() {
        let (service, store, _) = setup().await;
        let action_id = service
            .enqueue(
                SyncActionType::Create,
                Table::Farms,
                json!({"id": "f1"}),
                actor(),
                tenant(),
            )
            .await
            .unwrap();

        let mut action = store.get_action(&action_id).await.unwrap().unwrap();
        action.mark_attempt_failed("remote rejected".into(), 1, false);
        store.update_action(&action).await.unwrap();
        assert_eq!(action.status, SyncActionStatus::Failed);

        service.retry_failed(&action_id).await.unwrap();

        let reloaded = store.get_action(&action_id).await.unwrap().unwrap();
        assert_eq!(reloaded.status, SyncActionStatus::Pending);
        assert_eq!(reloaded.retry_count, 0);
    }

    #[tokio::test]
    async fn retry_failed_rejects_non_failed_actions() {
        let (service, _, _) = setup().await;
        let action_id = service
            .enqueue(
                SyncActionType::Create,
                Table::Farms,
                json!({"id": "f1"}),
                actor(),
                tenant(),
            )
            .await
            .unwrap();

        let err = service.retry_failed(&action_id).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
