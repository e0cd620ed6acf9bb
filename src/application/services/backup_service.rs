use crate::application::ports::{ActionQueueStore, BackupStore, LocalStore};
use crate::domain::entities::{BackupMetadata, BackupSnapshot};
use crate::domain::value_objects::Table;
use crate::shared::error::AppError;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Snapshots the full local dataset (data tables plus the action queue) to
/// a portable blob, and restores from one. Restore is destructive for every
/// table the backup contains.
pub struct BackupService {
    records: Arc<dyn LocalStore>,
    queue: Arc<dyn ActionQueueStore>,
    backups: Arc<dyn BackupStore>,
    retention: usize,
}

impl BackupService {
    pub fn new(
        records: Arc<dyn LocalStore>,
        queue: Arc<dyn ActionQueueStore>,
        backups: Arc<dyn BackupStore>,
        retention: usize,
    ) -> Self {
        Self {
            records,
            queue,
            backups,
            retention,
        }
    }

    pub async fn create_backup(&self) -> Result<BackupMetadata, AppError> {
        let mut tables = BTreeMap::new();
        for table in Table::ALL {
            let records = self.records.get_records(table).await?;
            tables.insert(table.as_str().to_string(), records);
        }
        let actions = self.queue.all_actions().await?;

        let snapshot = BackupSnapshot {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            tables,
            actions,
        };

        let blob = serde_json::to_string(&snapshot)
            .map_err(|e| AppError::Backup(format!("Failed to serialize snapshot: {e}")))?;

        let metadata = BackupMetadata {
            id: snapshot.id.clone(),
            created_at: snapshot.created_at,
            tables: Table::ALL.to_vec(),
            record_counts: snapshot.record_counts(),
            size_bytes: blob.len() as u64,
        };

        self.backups
            .store_backup(&metadata, &blob)
            .await
            .map_err(|e| AppError::Backup(format!("Failed to persist backup: {e}")))?;

        self.prune_old_backups().await?;

        info!(backup_id = %metadata.id, size_bytes = metadata.size_bytes, "Backup created");
        Ok(metadata)
    }

    /// Replaces local state with the backup's contents. Returns `false`
    /// (rather than an error) when the backup is missing or unreadable, so
    /// callers can tell "nothing to restore" from a fatal storage failure.
    pub async fn restore_from_backup(&self, backup_id: &str) -> Result<bool, AppError> {
        let blob = match self.backups.load_backup(backup_id).await? {
            Some(blob) => blob,
            None => {
                warn!(backup_id, "Restore requested for unknown backup");
                return Ok(false);
            }
        };

        let snapshot: BackupSnapshot = match serde_json::from_str(&blob) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(backup_id, error = %e, "Stored backup is unreadable");
                return Ok(false);
            }
        };

        for (table_name, records) in &snapshot.tables {
            let table = match Table::parse(table_name) {
                Ok(table) => table,
                Err(reason) => {
                    warn!(backup_id, table = %table_name, %reason,
                        "Backup references an unknown table; skipping");
                    continue;
                }
            };
            self.records.clear_table(table).await?;
            for record in records {
                self.records.put_record(record.clone()).await?;
            }
        }
        self.queue.replace_all_actions(&snapshot.actions).await?;

        info!(backup_id, "Restore complete");
        Ok(true)
    }

    pub async fn list_backups(&self) -> Result<Vec<BackupMetadata>, AppError> {
        self.backups.list_backups().await
    }

    pub async fn delete_backup(&self, backup_id: &str) -> Result<(), AppError> {
        self.backups.delete_backup(backup_id).await
    }

    async fn prune_old_backups(&self) -> Result<(), AppError> {
        let listed = self.backups.list_backups().await?;
        for stale in listed.iter().skip(self.retention) {
            info!(backup_id = %stale.id, "Pruning backup beyond retention");
            self.backups.delete_backup(&stale.id).await?;
        }
        Ok(())
    }
}
