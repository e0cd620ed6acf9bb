use crate::domain::entities::{BackupMetadata, LocalRecord, SyncAction};
use crate::domain::value_objects::{
    ActorId, RecordPayload, RecordSyncStatus, SyncActionStatus, SyncActionType, Table, TenantId,
};
use crate::shared::error::AppError;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct LocalRecordRow {
    pub table_name: String,
    pub record_id: String,
    pub data: String,
    pub sync_status: String,
    pub last_modified: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct SyncActionRow {
    pub action_id: String,
    pub action_type: String,
    pub table_name: String,
    pub payload: String,
    pub actor_id: String,
    pub tenant_id: String,
    pub status: String,
    pub retry_count: i64,
    pub last_error: Option<String>,
    pub enqueued_at: i64,
    pub updated_at: i64,
    pub completed_at: Option<i64>,
}

#[derive(Debug, Clone, FromRow)]
pub struct BackupMetadataRow {
    pub backup_id: String,
    pub created_at: i64,
    pub tables: String,
    pub record_counts: String,
    pub size_bytes: i64,
}

pub fn local_record_from_row(row: LocalRecordRow) -> Result<LocalRecord, AppError> {
    let table = Table::parse(&row.table_name).map_err(AppError::Deserialization)?;
    let sync_status =
        RecordSyncStatus::parse(&row.sync_status).map_err(AppError::Deserialization)?;
    let data = serde_json::from_str(&row.data)
        .map_err(|e| AppError::Deserialization(format!("local record data: {e}")))?;

    Ok(LocalRecord {
        table,
        id: row.record_id,
        data,
        sync_status,
        last_modified: timestamp_to_datetime(row.last_modified),
    })
}

pub fn sync_action_from_row(row: SyncActionRow) -> Result<SyncAction, AppError> {
    let action_type = SyncActionType::parse(&row.action_type).map_err(AppError::Deserialization)?;
    let table = Table::parse(&row.table_name).map_err(AppError::Deserialization)?;
    let status = SyncActionStatus::parse(&row.status).map_err(AppError::Deserialization)?;
    let payload = RecordPayload::from_json_str(&row.payload).map_err(AppError::Deserialization)?;
    let actor_id = ActorId::new(row.actor_id).map_err(AppError::Deserialization)?;
    let tenant_id = TenantId::new(row.tenant_id).map_err(AppError::Deserialization)?;
    let retry_count = u32::try_from(row.retry_count)
        .map_err(|_| AppError::Deserialization("retry_count cannot be negative".to_string()))?;

    Ok(SyncAction {
        id: row.action_id,
        action_type,
        table,
        payload,
        actor_id,
        tenant_id,
        status,
        retry_count,
        last_error: row.last_error,
        enqueued_at: timestamp_to_datetime(row.enqueued_at),
        updated_at: timestamp_to_datetime(row.updated_at),
        completed_at: row.completed_at.map(timestamp_to_datetime),
    })
}

pub fn backup_metadata_from_row(row: BackupMetadataRow) -> Result<BackupMetadata, AppError> {
    let tables: Vec<Table> = serde_json::from_str(&row.tables)
        .map_err(|e| AppError::Deserialization(format!("backup tables: {e}")))?;
    let record_counts = serde_json::from_str(&row.record_counts)
        .map_err(|e| AppError::Deserialization(format!("backup record counts: {e}")))?;
    let size_bytes = u64::try_from(row.size_bytes)
        .map_err(|_| AppError::Deserialization("size_bytes cannot be negative".to_string()))?;

    Ok(BackupMetadata {
        id: row.backup_id,
        created_at: timestamp_to_datetime(row.created_at),
        tables,
        record_counts,
        size_bytes,
    })
}

pub fn timestamp_to_datetime(ms: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(ms).unwrap_or_else(Utc::now)
}
