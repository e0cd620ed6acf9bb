mod activity;
mod backup;
mod engine_status;
mod local_record;
mod sync_action;
mod sync_report;

pub use activity::{ActivityEntry, ActivityMetadata};
pub use backup::{BackupMetadata, BackupSnapshot};
pub use engine_status::EngineStatus;
pub use local_record::LocalRecord;
pub use sync_action::SyncAction;
pub use sync_report::SyncRunReport;
