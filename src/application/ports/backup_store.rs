use crate::domain::entities::BackupMetadata;
use crate::shared::error::AppError;
use async_trait::async_trait;

/// Durable blob storage for backup snapshots, addressable by backup id.
#[async_trait]
pub trait BackupStore: Send + Sync {
    async fn store_backup(&self, metadata: &BackupMetadata, blob: &str) -> Result<(), AppError>;
    async fn load_backup(&self, id: &str) -> Result<Option<String>, AppError>;
    /// Stored backup metadata, newest first.
    async fn list_backups(&self) -> Result<Vec<BackupMetadata>, AppError>;
    async fn delete_backup(&self, id: &str) -> Result<(), AppError>;
}
