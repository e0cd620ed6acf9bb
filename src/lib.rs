pub mod application;
pub mod domain;
pub mod engine;
pub mod infrastructure;
pub mod shared;

pub use application::ports::{ActivitySink, RemoteError, RemoteStore};
pub use application::services::{BackupService, StatusService, SyncQueueService};
pub use domain::entities::{BackupMetadata, EngineStatus, SyncAction, SyncRunReport};
pub use domain::value_objects::{
    ActorId, RecordPayload, RecordSyncStatus, SyncActionStatus, SyncActionType, Table, TenantId,
};
pub use engine::SyncEngine;
pub use shared::config::EngineConfig;
pub use shared::error::{AppError, Result};

use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber. Call once at process startup;
/// `RUST_LOG` overrides the default filter.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("agrisync=debug,info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    tracing::info!("logging initialized");
}
