mod activity_sink;
mod backup_store;
mod local_store;
mod queue_store;
mod remote_store;

pub use activity_sink::ActivitySink;
pub use backup_store::BackupStore;
pub use local_store::LocalStore;
pub use queue_store::{ActionQueueStore, OptimisticWrite};
pub use remote_store::{RemoteError, RemoteStore};
