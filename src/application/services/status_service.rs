use crate::application::ports::{ActionQueueStore, LocalStore};
use crate::domain::entities::EngineStatus;
use crate::domain::value_objects::SyncActionStatus;
use crate::infrastructure::connectivity::ConnectivityMonitor;
use crate::shared::error::AppError;
use std::sync::Arc;

/// Read-side aggregation for presentation layers; no side effects.
pub struct StatusService {
    queue: Arc<dyn ActionQueueStore>,
    records: Arc<dyn LocalStore>,
    connectivity: Arc<ConnectivityMonitor>,
}

impl StatusService {
    pub fn new(
        queue: Arc<dyn ActionQueueStore>,
        records: Arc<dyn LocalStore>,
        connectivity: Arc<ConnectivityMonitor>,
    ) -> Self {
        Self {
            queue,
            records,
            connectivity,
        }
    }

    pub async fn get_sync_status(&self) -> Result<EngineStatus, AppError> {
        let pending_actions = self.queue.count_actions(SyncActionStatus::Pending).await?;
        let failed_actions = self.queue.count_actions(SyncActionStatus::Failed).await?;
        let last_sync_at = self.queue.last_completed_at().await?;
        let storage_bytes = self.records.approximate_size_bytes().await?;

        Ok(EngineStatus {
            is_online: self.connectivity.is_online(),
            pending_actions,
            failed_actions,
            last_sync_at,
            storage_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::OptimisticWrite;
    use crate::domain::entities::{LocalRecord, SyncAction};
    use crate::domain::value_objects::{
        ActorId, RecordPayload, SyncActionType, Table, TenantId,
    };
    use crate::infrastructure::database::{initialize_schema, SqliteStore};
    use serde_json::json;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup() -> (StatusService, Arc<SqliteStore>, Arc<ConnectivityMonitor>) {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        initialize_schema(&pool).await.unwrap();

        let store = Arc::new(SqliteStore::new(pool));
        let connectivity = Arc::new(ConnectivityMonitor::new(false));
        let service = StatusService::new(store.clone(), store.clone(), connectivity.clone());
        (service, store, connectivity)
    }

    fn sample_action(id: &str) -> SyncAction {
        SyncAction::new(
            SyncActionType::Create,
            Table::Farms,
            RecordPayload::new(json!({"id": id})).unwrap(),
            ActorId::new("user-1".into()).unwrap(),
            TenantId::new("coop-9".into()).unwrap(),
        )
    }

    #[tokio::test]
    async fn empty_engine_reports_zero_counts() {
        let (service, _, _) = setup().await;
        let status = service.get_sync_status().await.unwrap();

        assert!(!status.is_online);
        assert_eq!(status.pending_actions, 0);
        assert_eq!(status.failed_actions, 0);
        assert!(status.last_sync_at.is_none());
        assert_eq!(status.storage_bytes, 0);
    }

    #[tokio::test]
    async fn counts_track_queue_and_cache_state() {
        let (service, store, connectivity) = setup().await;
        connectivity.set_online(true);

        let pending = sample_action("f1");
        store
            .enqueue_action(
                &pending,
                OptimisticWrite::Upsert(LocalRecord::local(
                    Table::Farms,
                    "f1".into(),
                    json!({"id": "f1"}),
                )),
            )
            .await
            .unwrap();

        let mut failed = sample_action("f2");
        store
            .enqueue_action(
                &failed,
                OptimisticWrite::Upsert(LocalRecord::local(
                    Table::Farms,
                    "f2".into(),
                    json!({"id": "f2"}),
                )),
            )
            .await
            .unwrap();
        failed.mark_attempt_failed("rejected".into(), 1, false);
        store.update_action(&failed).await.unwrap();

        let mut completed = sample_action("f3");
        store
            .enqueue_action(
                &completed,
                OptimisticWrite::Upsert(LocalRecord::local(
                    Table::Farms,
                    "f3".into(),
                    json!({"id": "f3"}),
                )),
            )
            .await
            .unwrap();
        completed.mark_syncing();
        completed.mark_completed();
        store.update_action(&completed).await.unwrap();

        let status = service.get_sync_status().await.unwrap();
        assert!(status.is_online);
        assert_eq!(status.pending_actions, 1);
        assert_eq!(status.failed_actions, 1);
        assert_eq!(status.last_sync_at, completed.completed_at.map(truncate_ms));
        assert!(status.storage_bytes > 0);
    }

    fn truncate_ms(ts: chrono::DateTime<chrono::Utc>) -> chrono::DateTime<chrono::Utc> {
        chrono::DateTime::from_timestamp_millis(ts.timestamp_millis()).unwrap()
    }
}
