use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::store::{ReplicatedStore, StoreChange, StorePath};

/// The value at a subscribed path as of `version`. `None` means absent.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub version: u64,
    pub path: StorePath,
    pub value: Option<Value>,
}

/// Live view of one path. Yields the current value first, then a fresh
/// snapshot after every commit that touches the path, its ancestors or its
/// descendants. Dropping the subscription unsubscribes.
pub struct Subscription {
    store: Arc<ReplicatedStore>,
    path: StorePath,
    receiver: broadcast::Receiver<StoreChange>,
    primed: bool,
    last_version: Option<u64>,
}

impl Subscription {
    pub(crate) fn new(
        store: Arc<ReplicatedStore>,
        path: StorePath,
        receiver: broadcast::Receiver<StoreChange>,
    ) -> Self {
        Self {
            store,
            path,
            receiver,
            primed: false,
            last_version: None,
        }
    }

    pub fn path(&self) -> &StorePath {
        &self.path
    }

    /// Waits for the next snapshot. Returns `None` once the store is gone
    /// or can no longer be read.
    pub async fn next(&mut self) -> Option<Snapshot> {
        if !self.primed {
            self.primed = true;
            return self.current();
        }

        loop {
            match self.receiver.recv().await {
                Ok(change) => {
                    if self.last_version.is_some_and(|seen| change.version <= seen) {
                        continue;
                    }
                    if change.paths.iter().any(|changed| changed.overlaps(&self.path)) {
                        return self.current();
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    // Snapshots are full values, so skipping straight to the
                    // latest state loses nothing.
                    tracing::warn!(path = %self.path, skipped, "Subscription lagged, resyncing");
                    return self.current();
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    fn current(&mut self) -> Option<Snapshot> {
        match self.store.read_versioned(&self.path) {
            Ok((version, value)) => {
                self.last_version = Some(version);
                Some(Snapshot {
                    version,
                    path: self.path.clone(),
                    value,
                })
            }
            Err(e) => {
                tracing::error!(path = %self.path, "Subscription read failed: {}", e);
                None
            }
        }
    }
}
