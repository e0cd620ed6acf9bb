use serde::{Deserialize, Serialize};

/// Outcome of one `sync_pending_actions` pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncRunReport {
    /// False when the pass was skipped (offline, or another pass running).
    pub ran: bool,
    pub synced: u32,
    pub retried: u32,
    pub failed: u32,
    /// Corrective actions enqueued by the reconciliation sweep.
    pub reconciled: u32,
}

impl SyncRunReport {
    pub fn skipped() -> Self {
        Self::default()
    }

    pub fn started() -> Self {
        Self {
            ran: true,
            ..Self::default()
        }
    }
}
