use tokio::sync::watch;
use tracing::info;

/// Tracks the host platform's reachability signal and exposes it to the
/// scheduler.
///
/// The host feeds transitions through `set_online`; consumers either poll
/// `is_online` or `subscribe` to observe edges.
pub struct ConnectivityMonitor {
    tx: watch::Sender<bool>,
}

impl ConnectivityMonitor {
    pub fn new(initially_online: bool) -> Self {
        let (tx, _rx) = watch::channel(initially_online);
        Self { tx }
    }

    pub fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    /// Updates the network state. Edges are logged; repeated reports of the
    /// same state are ignored so subscribers only wake on transitions.
    pub fn set_online(&self, online: bool) {
        let changed = self.tx.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
        if changed {
            if online {
                info!("Connectivity restored; sync may proceed");
            } else {
                info!("Connectivity lost; mutations will queue locally");
            }
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}
