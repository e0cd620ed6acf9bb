use crate::domain::entities::LocalRecord;
use crate::domain::value_objects::{RecordSyncStatus, Table};
use crate::shared::error::AppError;
use async_trait::async_trait;

/// Durable, per-table indexed store for cached domain rows.
///
/// Every call is atomic and scoped to one logical table. A storage failure
/// is fatal for writes; reads already cached upstream may survive it.
#[async_trait]
pub trait LocalStore: Send + Sync {
    async fn put_record(&self, record: LocalRecord) -> Result<(), AppError>;
    async fn get_record(&self, table: Table, id: &str) -> Result<Option<LocalRecord>, AppError>;
    async fn get_records(&self, table: Table) -> Result<Vec<LocalRecord>, AppError>;
    /// Index scan over the per-table `sync_status` index.
    async fn records_with_status(
        &self,
        table: Table,
        status: RecordSyncStatus,
    ) -> Result<Vec<LocalRecord>, AppError>;
    async fn delete_record(&self, table: Table, id: &str) -> Result<(), AppError>;
    async fn clear_table(&self, table: Table) -> Result<(), AppError>;
    /// Approximate byte size of all cached data, for quota-awareness UI.
    async fn approximate_size_bytes(&self) -> Result<u64, AppError>;
}
