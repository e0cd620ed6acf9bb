use crate::application::ports::{ActivitySink, LocalStore, RemoteStore};
use crate::application::services::{
    BackupService, StatusService, SyncProcessor, SyncQueueService, SyncTrigger,
};
use crate::infrastructure::activity::TracingActivitySink;
use crate::infrastructure::connectivity::ConnectivityMonitor;
use crate::infrastructure::database::{initialize_schema, ConnectionPool, SqliteStore};
use crate::shared::config::EngineConfig;
use crate::shared::error::AppError;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Composition root: one long-lived engine instance owns the durable store
/// handle and the in-flight pass guard, and hands out service handles to
/// consumers. Built by the application once and injected where needed.
pub struct SyncEngine {
    config: EngineConfig,
    pool: ConnectionPool,
    connectivity: Arc<ConnectivityMonitor>,
    records: Arc<SqliteStore>,
    queue: Arc<SyncQueueService>,
    processor: Arc<SyncProcessor>,
    backups: Arc<BackupService>,
    status: Arc<StatusService>,
    trigger_rx: Mutex<Option<mpsc::UnboundedReceiver<SyncTrigger>>>,
}

impl SyncEngine {
    /// Builds the engine with the default activity sink (structured log).
    pub async fn new(config: EngineConfig, remote: Arc<dyn RemoteStore>) -> Result<Self, AppError> {
        Self::with_activity_sink(config, remote, Arc::new(TracingActivitySink)).await
    }

    pub async fn with_activity_sink(
        config: EngineConfig,
        remote: Arc<dyn RemoteStore>,
        activity: Arc<dyn ActivitySink>,
    ) -> Result<Self, AppError> {
        config.validate().map_err(AppError::InvalidInput)?;

        let pool = ConnectionPool::new(
            &config.database.url,
            config.database.max_connections,
            config.database.connection_timeout,
        )
        .await?;
        initialize_schema(pool.get_pool()).await?;

        let store = Arc::new(SqliteStore::new(pool.get_pool().clone()));
        let connectivity = Arc::new(ConnectivityMonitor::new(false));
        let (trigger_tx, trigger_rx) = mpsc::unbounded_channel();

        let queue = Arc::new(
            SyncQueueService::new(store.clone(), connectivity.clone()).with_trigger(trigger_tx),
        );
        let processor = Arc::new(SyncProcessor::new(
            store.clone(),
            store.clone(),
            remote,
            connectivity.clone(),
            activity,
            config.sync.max_retries,
        ));
        let backups = Arc::new(BackupService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            config.backup.retention,
        ));
        let status = Arc::new(StatusService::new(
            store.clone(),
            store.clone(),
            connectivity.clone(),
        ));

        // A previous process may have died mid-pass; requeue whatever it
        // left in `syncing` before anything reads queue state.
        processor.recover_interrupted_actions().await?;

        Ok(Self {
            config,
            pool,
            connectivity,
            records: store,
            queue,
            processor,
            backups,
            status,
            trigger_rx: Mutex::new(Some(trigger_rx)),
        })
    }

    /// Spawns the background scheduler: a pass on every offline→online
    /// edge, on every enqueue trigger, and on a fixed interval while
    /// online. Idempotent; the second call returns `None`.
    pub fn start(&self) -> Option<JoinHandle<()>> {
        if !self.config.sync.auto_sync {
            info!("Auto sync disabled; passes run only on explicit request");
            return None;
        }
        let mut trigger_rx = self.trigger_rx.lock().ok()?.take()?;

        let processor = self.processor.clone();
        let mut online_rx = self.connectivity.subscribe();
        let interval = Duration::from_secs(self.config.sync.sync_interval_secs);

        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The immediate first tick would race engine startup.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if *online_rx.borrow() {
                            run_pass(&processor, SyncTrigger::Interval).await;
                        }
                    }
                    changed = online_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let online = *online_rx.borrow_and_update();
                        if online {
                            run_pass(&processor, SyncTrigger::BecameOnline).await;
                        }
                    }
                    trigger = trigger_rx.recv() => {
                        match trigger {
                            Some(trigger) => run_pass(&processor, trigger).await,
                            None => break,
                        }
                    }
                }
            }
        }))
    }

    /// Runs a sync pass right now, subject to the usual guard.
    pub async fn sync_now(&self) -> Result<crate::domain::entities::SyncRunReport, AppError> {
        self.processor.sync_pending_actions().await
    }

    pub fn queue(&self) -> Arc<SyncQueueService> {
        self.queue.clone()
    }

    /// Read access to the local cache, for offline-first reads.
    pub fn records(&self) -> Arc<dyn LocalStore> {
        self.records.clone()
    }

    pub fn backups(&self) -> Arc<BackupService> {
        self.backups.clone()
    }

    pub fn status(&self) -> Arc<StatusService> {
        self.status.clone()
    }

    pub fn connectivity(&self) -> Arc<ConnectivityMonitor> {
        self.connectivity.clone()
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

async fn run_pass(processor: &Arc<SyncProcessor>, trigger: SyncTrigger) {
    if let Err(e) = processor.sync_pending_actions().await {
        error!(trigger = trigger.as_str(), "Sync pass error: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::RemoteError;
    use crate::domain::value_objects::{ActorId, SyncActionType, Table, TenantId};
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct AcceptingRemote;

    #[async_trait]
    impl RemoteStore for AcceptingRemote {
        async fn insert(&self, _table: Table, record: &Value) -> Result<Value, RemoteError> {
            Ok(record.clone())
        }
        async fn update(
            &self,
            _table: Table,
            _id: &str,
            partial: &Value,
        ) -> Result<Value, RemoteError> {
            Ok(partial.clone())
        }
        async fn delete(&self, _table: Table, _id: &str) -> Result<(), RemoteError> {
            Ok(())
        }
        async fn select_all(&self, _table: Table) -> Result<Vec<Value>, RemoteError> {
            Ok(Vec::new())
        }
    }

    fn test_config() -> EngineConfig {
        let mut config = EngineConfig::default();
        config.database.url = "sqlite::memory:".to_string();
        config.database.max_connections = 1;
        config
    }

    #[tokio::test]
    async fn engine_wires_services_over_one_store() {
        let engine = SyncEngine::new(test_config(), Arc::new(AcceptingRemote))
            .await
            .unwrap();

        engine
            .queue()
            .enqueue(
                SyncActionType::Create,
                Table::Crops,
                json!({"id": "c1", "name": "Maize"}),
                ActorId::new("user-1".into()).unwrap(),
                TenantId::new("coop-9".into()).unwrap(),
            )
            .await
            .unwrap();

        let status = engine.status().get_sync_status().await.unwrap();
        assert!(!status.is_online);
        assert_eq!(status.pending_actions, 1);

        engine.connectivity().set_online(true);
        let report = engine.sync_now().await.unwrap();
        assert_eq!(report.synced, 1);

        let status = engine.status().get_sync_status().await.unwrap();
        assert_eq!(status.pending_actions, 0);
        assert!(status.last_sync_at.is_some());
    }

    #[tokio::test]
    async fn start_is_single_shot() {
        let engine = SyncEngine::new(test_config(), Arc::new(AcceptingRemote))
            .await
            .unwrap();

        let first = engine.start();
        assert!(first.is_some());
        assert!(engine.start().is_none());
        first.unwrap().abort();
    }

    #[tokio::test]
    async fn auto_sync_off_means_no_scheduler() {
        let mut config = test_config();
        config.sync.auto_sync = false;
        let engine = SyncEngine::new(config, Arc::new(AcceptingRemote))
            .await
            .unwrap();
        assert!(engine.start().is_none());
    }

    #[tokio::test]
    async fn invalid_config_is_rejected() {
        let mut config = test_config();
        config.sync.max_retries = 0;
        let result = SyncEngine::new(config, Arc::new(AcceptingRemote)).await;
        assert!(matches!(result.err(), Some(AppError::InvalidInput(_))));
    }
}
