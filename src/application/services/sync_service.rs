use crate::application::ports::{
    ActionQueueStore, ActivitySink, LocalStore, OptimisticWrite, RemoteError, RemoteStore,
};
use crate::domain::entities::{
    ActivityEntry, ActivityMetadata, LocalRecord, SyncAction, SyncRunReport,
};
use crate::domain::value_objects::{
    ActorId, RecordPayload, RecordSyncStatus, SyncActionStatus, SyncActionType, Table, TenantId,
};
use crate::infrastructure::connectivity::ConnectivityMonitor;
use crate::shared::error::AppError;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Why a sync pass was requested. Purely informational; every trigger runs
/// the same pass.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SyncTrigger {
    Enqueue,
    BecameOnline,
    Interval,
    Manual,
}

impl SyncTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncTrigger::Enqueue => "enqueue",
            SyncTrigger::BecameOnline => "became_online",
            SyncTrigger::Interval => "interval",
            SyncTrigger::Manual => "manual",
        }
    }
}

enum ActionOutcome {
    Synced,
    Retried,
    Failed,
}

/// Drains the action queue against the remote store.
///
/// The only writer of action status, retry count and last error, and of a
/// record's sync status. At most one pass runs at a time; triggers that
/// arrive mid-pass are dropped, the next timer tick or enqueue catches
/// whatever they would have picked up.
pub struct SyncProcessor {
    queue: Arc<dyn ActionQueueStore>,
    records: Arc<dyn LocalStore>,
    remote: Arc<dyn RemoteStore>,
    connectivity: Arc<ConnectivityMonitor>,
    activity: Arc<dyn ActivitySink>,
    max_retries: u32,
    in_flight: AtomicBool,
}

impl SyncProcessor {
    pub fn new(
        queue: Arc<dyn ActionQueueStore>,
        records: Arc<dyn LocalStore>,
        remote: Arc<dyn RemoteStore>,
        connectivity: Arc<ConnectivityMonitor>,
        activity: Arc<dyn ActivitySink>,
        max_retries: u32,
    ) -> Self {
        Self {
            queue,
            records,
            remote,
            connectivity,
            activity,
            max_retries,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Runs one reconciliation pass over all pending actions, oldest first.
    ///
    /// Returns a skipped report when offline or when a pass is already
    /// running. Per-action sync failures are absorbed into action state;
    /// only local storage failures surface as errors.
    pub async fn sync_pending_actions(&self) -> Result<SyncRunReport, AppError> {
        if !self.connectivity.is_online() {
            debug!("Sync pass skipped: offline");
            return Ok(SyncRunReport::skipped());
        }
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Sync pass skipped: another pass is running");
            return Ok(SyncRunReport::skipped());
        }

        let _guard = PassGuard(&self.in_flight);
        self.run_pass().await
    }

    /// Requeues actions persisted as `syncing` by a pass that never finished
    /// (process death between the status write and the remote response).
    /// Only one pass runs at a time, so any `syncing` row seen outside a
    /// pass is stale. Returns how many were requeued.
    pub async fn recover_interrupted_actions(&self) -> Result<u64, AppError> {
        let stale = self
            .queue
            .actions_with_status(SyncActionStatus::Syncing)
            .await?;
        let count = stale.len() as u64;
        for mut action in stale {
            warn!(
                action_id = %action.id,
                table = %action.table,
                "Requeueing action left mid-sync by an interrupted pass"
            );
            action.mark_interrupted();
            self.queue.update_action(&action).await?;
        }
        Ok(count)
    }

    async fn run_pass(&self) -> Result<SyncRunReport, AppError> {
        self.recover_interrupted_actions().await?;
        let pending = self
            .queue
            .actions_with_status(SyncActionStatus::Pending)
            .await?;
        let mut report = SyncRunReport::started();

        // Strictly sequential: actions touching the same record must reach
        // the remote store in enqueue order.
        for mut action in pending {
            match self.process_action(&mut action).await? {
                ActionOutcome::Synced => report.synced += 1,
                ActionOutcome::Retried => report.retried += 1,
                ActionOutcome::Failed => report.failed += 1,
            }
        }

        report.reconciled = self.reconcile_unqueued_records().await?;

        info!(
            synced = report.synced,
            retried = report.retried,
            failed = report.failed,
            reconciled = report.reconciled,
            "Sync pass finished"
        );
        Ok(report)
    }

    async fn process_action(&self, action: &mut SyncAction) -> Result<ActionOutcome, AppError> {
        action.mark_syncing();
        self.queue.update_action(action).await?;

        match self.dispatch_remote(action).await {
            Ok(canonical) => {
                action.mark_completed();
                self.queue.update_action(action).await?;
                self.write_back(action, canonical).await?;
                self.emit_activity(action, true, None);
                Ok(ActionOutcome::Synced)
            }
            Err(err) => {
                let message = err.to_string();
                action.mark_attempt_failed(message.clone(), self.max_retries, err.is_permanent());
                self.queue.update_action(action).await?;
                self.emit_activity(action, false, Some(message));
                if action.status == SyncActionStatus::Failed {
                    warn!(
                        action_id = %action.id,
                        table = %action.table,
                        retry_count = action.retry_count,
                        "Sync action settled as failed; manual retry required"
                    );
                    Ok(ActionOutcome::Failed)
                } else {
                    Ok(ActionOutcome::Retried)
                }
            }
        }
    }

    async fn dispatch_remote(&self, action: &SyncAction) -> Result<Option<Value>, RemoteError> {
        match action.action_type {
            SyncActionType::Create => self
                .remote
                .insert(action.table, action.payload.as_json())
                .await
                .map(Some),
            SyncActionType::Update => {
                let id = action.record_id().ok_or_else(|| {
                    RemoteError::Permanent("update payload has no id".to_string())
                })?;
                self.remote
                    .update(action.table, id, action.payload.as_json())
                    .await
                    .map(Some)
            }
            SyncActionType::Delete => {
                let id = action.record_id().ok_or_else(|| {
                    RemoteError::Permanent("delete payload has no id".to_string())
                })?;
                self.remote.delete(action.table, id).await.map(|_| None)
            }
        }
    }

    /// Applies the server-confirmed result to the local cache. The remote
    /// copy wins wholesale; there is no field-level merge.
    async fn write_back(
        &self,
        action: &SyncAction,
        canonical: Option<Value>,
    ) -> Result<(), AppError> {
        match (action.action_type, canonical) {
            (SyncActionType::Delete, _) => {
                if let Some(id) = action.record_id() {
                    self.records.delete_record(action.table, id).await?;
                }
                Ok(())
            }
            (_, Some(data)) => {
                let id = data
                    .get("id")
                    .and_then(Value::as_str)
                    .or_else(|| action.record_id())
                    .map(str::to_string);
                match id {
                    Some(id) => {
                        self.records
                            .put_record(LocalRecord::synced(action.table, id, data))
                            .await
                    }
                    None => {
                        warn!(
                            action_id = %action.id,
                            table = %action.table,
                            "Remote returned a record without an id; local copy left as-is"
                        );
                        Ok(())
                    }
                }
            }
            (_, None) => Ok(()),
        }
    }

    /// Self-repair sweep: a record can be stuck `local` with no queue entry
    /// if its original enqueue half-failed. Each such record gets a
    /// corrective update action, picked up by the next pass.
    async fn reconcile_unqueued_records(&self) -> Result<u32, AppError> {
        let mut covered: HashSet<(Table, String)> = HashSet::new();
        // Failed actions hold their record until a manual retry; re-enqueueing
        // here would sidestep the retry cap.
        for status in [
            SyncActionStatus::Pending,
            SyncActionStatus::Syncing,
            SyncActionStatus::Failed,
        ] {
            for action in self.queue.actions_with_status(status).await? {
                if let Some(id) = action.record_id() {
                    covered.insert((action.table, id.to_string()));
                }
            }
        }

        let mut repaired = 0;
        for table in Table::ALL {
            let stranded = self
                .records
                .records_with_status(table, RecordSyncStatus::Local)
                .await?;
            for record in stranded {
                if covered.contains(&(table, record.id.clone())) {
                    continue;
                }
                let payload = match RecordPayload::new(record.data.clone()) {
                    Ok(payload) => payload.with_record_id(&record.id),
                    Err(reason) => {
                        warn!(table = %table, record = %record.id, %reason,
                            "Stranded local record has an unusable body; skipping repair");
                        continue;
                    }
                };
                let action = SyncAction::new(
                    SyncActionType::Update,
                    table,
                    payload,
                    ActorId::system(),
                    TenantId::system(),
                );
                self.queue
                    .enqueue_action(&action, OptimisticWrite::Upsert(record))
                    .await?;
                repaired += 1;
            }
        }

        if repaired > 0 {
            info!(count = repaired, "Reconciliation enqueued corrective updates");
        }
        Ok(repaired)
    }

    fn emit_activity(&self, action: &SyncAction, success: bool, error_message: Option<String>) {
        self.activity.record(ActivityEntry {
            actor_id: action.actor_id.clone(),
            tenant_id: action.tenant_id.clone(),
            action: ActivityEntry::OFFLINE_SYNC.to_string(),
            resource_type: action.table,
            resource_id: action.record_id().map(str::to_string),
            success,
            error_message,
            metadata: ActivityMetadata {
                sync_action_id: action.id.clone(),
                sync_type: action.action_type,
                retry_count: action.retry_count,
                is_online: self.connectivity.is_online(),
            },
        });
    }
}

/// Releases the in-flight flag when the pass scope unwinds, panics included.
struct PassGuard<'a>(&'a AtomicBool);

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
