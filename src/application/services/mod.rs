pub mod backup_service;
pub mod queue_service;
pub mod status_service;
pub mod sync_service;

pub use backup_service::BackupService;
pub use queue_service::SyncQueueService;
pub use status_service::StatusService;
pub use sync_service::{SyncProcessor, SyncTrigger};
