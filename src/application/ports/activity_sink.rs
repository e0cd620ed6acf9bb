use crate::domain::entities::ActivityEntry;

/// Outbound audit/observability collaborator.
///
/// `record` must not block and must not fail the caller; sinks swallow their
/// own delivery problems.
pub trait ActivitySink: Send + Sync {
    fn record(&self, entry: ActivityEntry);
}
