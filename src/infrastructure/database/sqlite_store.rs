use crate::application::ports::{ActionQueueStore, BackupStore, LocalStore, OptimisticWrite};
use crate::domain::entities::{BackupMetadata, LocalRecord, SyncAction};
use crate::domain::value_objects::{RecordSyncStatus, SyncActionStatus, Table};
use crate::infrastructure::database::rows::{
    backup_metadata_from_row, local_record_from_row, sync_action_from_row, BackupMetadataRow,
    LocalRecordRow, SyncActionRow,
};
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};

/// SQLite-backed implementation of the engine's durable stores: cached
/// records, the action queue, and backup blobs all live in one database so
/// the queue write and its optimistic record write can share a transaction.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn upsert_record_tx(
        tx: &mut Transaction<'_, Sqlite>,
        record: &LocalRecord,
    ) -> Result<(), AppError> {
        let data = serde_json::to_string(&record.data)?;
        sqlx::query(
            r#"
            INSERT INTO local_records (table_name, record_id, data, sync_status, last_modified)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(table_name, record_id) DO UPDATE SET
                data = excluded.data,
                sync_status = excluded.sync_status,
                last_modified = excluded.last_modified
            "#,
        )
        .bind(record.table.as_str())
        .bind(&record.id)
        .bind(&data)
        .bind(record.sync_status.as_str())
        .bind(record.last_modified.timestamp_millis())
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn insert_action_tx(
        tx: &mut Transaction<'_, Sqlite>,
        action: &SyncAction,
    ) -> Result<(), AppError> {
        let payload = serde_json::to_string(action.payload.as_json())?;
        sqlx::query(
            r#"
            INSERT INTO sync_actions (
                action_id, action_type, table_name, payload, actor_id, tenant_id,
                status, retry_count, last_error, enqueued_at, updated_at, completed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&action.id)
        .bind(action.action_type.as_str())
        .bind(action.table.as_str())
        .bind(&payload)
        .bind(action.actor_id.as_str())
        .bind(action.tenant_id.as_str())
        .bind(action.status.as_str())
        .bind(action.retry_count as i64)
        .bind(&action.last_error)
        .bind(action.enqueued_at.timestamp_millis())
        .bind(action.updated_at.timestamp_millis())
        .bind(action.completed_at.map(|t| t.timestamp_millis()))
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl LocalStore for SqliteStore {
    async fn put_record(&self, record: LocalRecord) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        Self::upsert_record_tx(&mut tx, &record).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn get_record(&self, table: Table, id: &str) -> Result<Option<LocalRecord>, AppError> {
        let row = sqlx::query_as::<_, LocalRecordRow>(
            r#"
            SELECT table_name, record_id, data, sync_status, last_modified
            FROM local_records
            WHERE table_name = ?1 AND record_id = ?2
            "#,
        )
        .bind(table.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(local_record_from_row).transpose()
    }

    async fn get_records(&self, table: Table) -> Result<Vec<LocalRecord>, AppError> {
        let rows = sqlx::query_as::<_, LocalRecordRow>(
            r#"
            SELECT table_name, record_id, data, sync_status, last_modified
            FROM local_records
            WHERE table_name = ?1
            ORDER BY record_id ASC
            "#,
        )
        .bind(table.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(local_record_from_row).collect()
    }

    async fn records_with_status(
        &self,
        table: Table,
        status: RecordSyncStatus,
    ) -> Result<Vec<LocalRecord>, AppError> {
        let rows = sqlx::query_as::<_, LocalRecordRow>(
            r#"
            SELECT table_name, record_id, data, sync_status, last_modified
            FROM local_records
            WHERE table_name = ?1 AND sync_status = ?2
            ORDER BY last_modified ASC
            "#,
        )
        .bind(table.as_str())
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(local_record_from_row).collect()
    }

    async fn delete_record(&self, table: Table, id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM local_records WHERE table_name = ?1 AND record_id = ?2")
            .bind(table.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn clear_table(&self, table: Table) -> Result<(), AppError> {
        sqlx::query("DELETE FROM local_records WHERE table_name = ?1")
            .bind(table.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn approximate_size_bytes(&self) -> Result<u64, AppError> {
        let (records_bytes,): (i64,) =
            sqlx::query_as("SELECT COALESCE(SUM(LENGTH(data)), 0) FROM local_records")
                .fetch_one(&self.pool)
                .await?;
        let (queue_bytes,): (i64,) =
            sqlx::query_as("SELECT COALESCE(SUM(LENGTH(payload)), 0) FROM sync_actions")
                .fetch_one(&self.pool)
                .await?;

        Ok(records_bytes.max(0) as u64 + queue_bytes.max(0) as u64)
    }
}

#[async_trait]
impl ActionQueueStore for SqliteStore {
    async fn enqueue_action(
        &self,
        action: &SyncAction,
        write: OptimisticWrite,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        Self::insert_action_tx(&mut tx, action).await?;
        match write {
            OptimisticWrite::Upsert(record) => {
                Self::upsert_record_tx(&mut tx, &record).await?;
            }
            OptimisticWrite::Remove { table, id } => {
                sqlx::query("DELETE FROM local_records WHERE table_name = ?1 AND record_id = ?2")
                    .bind(table.as_str())
                    .bind(&id)
                    .execute(&mut *tx)
                    .await?;
            }
        }
        tx.commit().await?;
        Ok(())
    }

    async fn update_action(&self, action: &SyncAction) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE sync_actions
            SET status = ?1, retry_count = ?2, last_error = ?3,
                updated_at = ?4, completed_at = ?5
            WHERE action_id = ?6
            "#,
        )
        .bind(action.status.as_str())
        .bind(action.retry_count as i64)
        .bind(&action.last_error)
        .bind(action.updated_at.timestamp_millis())
        .bind(action.completed_at.map(|t| t.timestamp_millis()))
        .bind(&action.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_action(&self, id: &str) -> Result<Option<SyncAction>, AppError> {
        let row = sqlx::query_as::<_, SyncActionRow>(
            r#"
            SELECT action_id, action_type, table_name, payload, actor_id, tenant_id,
                   status, retry_count, last_error, enqueued_at, updated_at, completed_at
            FROM sync_actions
            WHERE action_id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(sync_action_from_row).transpose()
    }

    async fn actions_with_status(
        &self,
        status: SyncActionStatus,
    ) -> Result<Vec<SyncAction>, AppError> {
        let rows = sqlx::query_as::<_, SyncActionRow>(
            r#"
            SELECT action_id, action_type, table_name, payload, actor_id, tenant_id,
                   status, retry_count, last_error, enqueued_at, updated_at, completed_at
            FROM sync_actions
            WHERE status = ?1
            ORDER BY enqueued_at ASC, seq ASC
            "#,
        )
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(sync_action_from_row).collect()
    }

    async fn count_actions(&self, status: SyncActionStatus) -> Result<u64, AppError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM sync_actions WHERE status = ?1")
                .bind(status.as_str())
                .fetch_one(&self.pool)
                .await?;
        Ok(count.max(0) as u64)
    }

    async fn last_completed_at(&self) -> Result<Option<DateTime<Utc>>, AppError> {
        let (max_ms,): (Option<i64>,) = sqlx::query_as(
            "SELECT MAX(completed_at) FROM sync_actions WHERE status = 'completed'",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(max_ms.and_then(DateTime::<Utc>::from_timestamp_millis))
    }

    async fn all_actions(&self) -> Result<Vec<SyncAction>, AppError> {
        let rows = sqlx::query_as::<_, SyncActionRow>(
            r#"
            SELECT action_id, action_type, table_name, payload, actor_id, tenant_id,
                   status, retry_count, last_error, enqueued_at, updated_at, completed_at
            FROM sync_actions
            ORDER BY enqueued_at ASC, seq ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(sync_action_from_row).collect()
    }

    async fn replace_all_actions(&self, actions: &[SyncAction]) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM sync_actions")
            .execute(&mut *tx)
            .await?;
        for action in actions {
            Self::insert_action_tx(&mut tx, action).await?;
        }
        tx.commit().await?;
        Ok(actions.len() as u64)
    }

    async fn delete_completed_before(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query(
            "DELETE FROM sync_actions WHERE status = 'completed' AND completed_at < ?1",
        )
        .bind(cutoff.timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl BackupStore for SqliteStore {
    async fn store_backup(&self, metadata: &BackupMetadata, blob: &str) -> Result<(), AppError> {
        let tables = serde_json::to_string(&metadata.tables)?;
        let record_counts = serde_json::to_string(&metadata.record_counts)?;
        sqlx::query(
            r#"
            INSERT INTO backups (backup_id, created_at, tables, record_counts, size_bytes, payload)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&metadata.id)
        .bind(metadata.created_at.timestamp_millis())
        .bind(&tables)
        .bind(&record_counts)
        .bind(metadata.size_bytes as i64)
        .bind(blob)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn load_backup(&self, id: &str) -> Result<Option<String>, AppError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT payload FROM backups WHERE backup_id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(payload,)| payload))
    }

    async fn list_backups(&self) -> Result<Vec<BackupMetadata>, AppError> {
        let rows = sqlx::query_as::<_, BackupMetadataRow>(
            r#"
            SELECT backup_id, created_at, tables, record_counts, size_bytes
            FROM backups
            ORDER BY created_at DESC, backup_id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(backup_metadata_from_row).collect()
    }

    async fn delete_backup(&self, id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM backups WHERE backup_id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
