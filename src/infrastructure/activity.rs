use crate::application::ports::ActivitySink;
use crate::domain::entities::ActivityEntry;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Default sink: writes each attempt to the structured log.
pub struct TracingActivitySink;

impl ActivitySink for TracingActivitySink {
    fn record(&self, entry: ActivityEntry) {
        if entry.success {
            info!(
                actor = %entry.actor_id,
                tenant = %entry.tenant_id,
                table = %entry.resource_type,
                record = entry.resource_id.as_deref().unwrap_or("-"),
                action_id = %entry.metadata.sync_action_id,
                retry_count = entry.metadata.retry_count,
                "offline sync attempt succeeded"
            );
        } else {
            warn!(
                actor = %entry.actor_id,
                tenant = %entry.tenant_id,
                table = %entry.resource_type,
                record = entry.resource_id.as_deref().unwrap_or("-"),
                action_id = %entry.metadata.sync_action_id,
                retry_count = entry.metadata.retry_count,
                error = entry.error_message.as_deref().unwrap_or("unknown"),
                "offline sync attempt failed"
            );
        }
    }
}

/// Forwards entries to an external collector over an unbounded channel.
///
/// Never blocks; if the receiver is gone the entry is dropped with a
/// warning rather than failing the sync pass.
pub struct ChannelActivitySink {
    tx: mpsc::UnboundedSender<ActivityEntry>,
}

impl ChannelActivitySink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ActivityEntry>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ActivitySink for ChannelActivitySink {
    fn record(&self, entry: ActivityEntry) {
        if self.tx.send(entry).is_err() {
            warn!("Activity collector closed; audit entry dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ActivityMetadata;
    use crate::domain::value_objects::{ActorId, SyncActionType, Table, TenantId};

    fn sample_entry(success: bool) -> ActivityEntry {
        ActivityEntry {
            actor_id: ActorId::new("user-1".into()).unwrap(),
            tenant_id: TenantId::new("coop-9".into()).unwrap(),
            action: ActivityEntry::OFFLINE_SYNC.to_string(),
            resource_type: Table::Crops,
            resource_id: Some("c1".into()),
            success,
            error_message: (!success).then(|| "timeout".to_string()),
            metadata: ActivityMetadata {
                sync_action_id: "a1".into(),
                sync_type: SyncActionType::Create,
                retry_count: 0,
                is_online: true,
            },
        }
    }

    #[tokio::test]
    async fn channel_sink_forwards_entries() {
        let (sink, mut rx) = ChannelActivitySink::new();
        sink.record(sample_entry(true));

        let received = rx.recv().await.unwrap();
        assert!(received.success);
        assert_eq!(received.action, "offline_sync");
    }

    #[tokio::test]
    async fn channel_sink_survives_closed_receiver() {
        let (sink, rx) = ChannelActivitySink::new();
        drop(rx);
        // Must not panic or error.
        sink.record(sample_entry(false));
    }
}
