use crate::domain::value_objects::Table;
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Failure reported by a remote adapter.
///
/// Transient failures (network, 5xx, timeout) are retried up to the cap;
/// permanent rejections (validation, not-found on update/delete) settle the
/// action immediately. Adapters that cannot tell the difference report
/// everything as transient and get uniform retry-then-fail.
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    #[error("transient remote failure: {0}")]
    Transient(String),

    #[error("permanent remote rejection: {0}")]
    Permanent(String),
}

impl RemoteError {
    pub fn is_permanent(&self) -> bool {
        matches!(self, RemoteError::Permanent(_))
    }
}

/// Row-based remote persistence API the engine reconciles against.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Inserts a record, returning the canonical server copy.
    async fn insert(&self, table: Table, record: &Value) -> Result<Value, RemoteError>;

    /// Applies a partial update by id, returning the canonical server copy.
    async fn update(&self, table: Table, id: &str, partial: &Value)
        -> Result<Value, RemoteError>;

    async fn delete(&self, table: Table, id: &str) -> Result<(), RemoteError>;

    async fn select_all(&self, table: Table) -> Result<Vec<Value>, RemoteError>;
}
