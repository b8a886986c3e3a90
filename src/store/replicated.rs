use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::store::subscription::Subscription;
use crate::store::{decode, document, StoreChange, StoreError, StorePath, Transaction, Update};

const CHANGE_CHANNEL_CAPACITY: usize = 256;

struct StoreState {
    root: Value,
    version: u64,
}

/// In-process replicated store.
///
/// All reads and writes go through one `RwLock`, so a [`transact`] closure
/// observes and mutates a consistent tree. Change notifications are pushed
/// to subscribers after the lock is released.
///
/// [`transact`]: ReplicatedStore::transact
pub struct ReplicatedStore {
    state: RwLock<StoreState>,
    changes: broadcast::Sender<StoreChange>,
}

/// Read-only view of the tree handed to [`ReplicatedStore::transact`].
pub struct StoreView<'a> {
    root: &'a Value,
}

impl<'a> StoreView<'a> {
    pub fn get(&self, path: &StorePath) -> Option<&'a Value> {
        document::get(self.root, path)
    }

    pub fn get_as<T: DeserializeOwned>(&self, path: &StorePath) -> Result<Option<T>, StoreError> {
        self.get(path).map(decode).transpose()
    }

    pub fn contains(&self, path: &StorePath) -> bool {
        self.get(path).is_some()
    }

    /// Decodes every direct child of `path`, keyed by child name.
    pub fn children_as<T: DeserializeOwned>(
        &self,
        path: &StorePath,
    ) -> Result<Vec<(String, T)>, StoreError> {
        let Some(Value::Object(children)) = self.get(path) else {
            return Ok(Vec::new());
        };
        children
            .iter()
            .map(|(key, value)| Ok((key.clone(), decode(value)?)))
            .collect()
    }
}

impl Default for ReplicatedStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplicatedStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            state: RwLock::new(StoreState {
                root: Value::Object(Map::new()),
                version: 0,
            }),
            changes,
        }
    }

    fn read_state(&self) -> Result<RwLockReadGuard<'_, StoreState>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
    }

    fn write_state(&self) -> Result<RwLockWriteGuard<'_, StoreState>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
    }

    pub fn version(&self) -> Result<u64, StoreError> {
        Ok(self.read_state()?.version)
    }

    /// Point-in-time fetch.
    pub fn read(&self, path: &StorePath) -> Result<Option<Value>, StoreError> {
        Ok(self.read_versioned(path)?.1)
    }

    pub fn read_as<T: DeserializeOwned>(&self, path: &StorePath) -> Result<Option<T>, StoreError> {
        self.read(path)?.as_ref().map(decode).transpose()
    }

    pub(crate) fn read_versioned(&self, path: &StorePath) -> Result<(u64, Option<Value>), StoreError> {
        let state = self.read_state()?;
        Ok((state.version, document::get(&state.root, path).cloned()))
    }

    /// Full overwrite of the node at `path`.
    pub fn write<T: Serialize + ?Sized>(&self, path: &StorePath, value: &T) -> Result<u64, StoreError> {
        self.patch(vec![Update::set(path.clone(), value)?])
    }

    pub fn remove(&self, path: &StorePath) -> Result<u64, StoreError> {
        self.patch(vec![Update::remove(path.clone())])
    }

    /// Applies all `updates` as one atomic commit.
    pub fn patch(&self, updates: Vec<Update>) -> Result<u64, StoreError> {
        let (version, ()) = self.commit(|_| Ok::<_, StoreError>(Transaction::commit(updates, ())))?;
        Ok(version)
    }

    /// Stores `value` under a freshly generated child key of `path`.
    pub fn append_child<T: Serialize + ?Sized>(
        &self,
        path: &StorePath,
        value: &T,
    ) -> Result<String, StoreError> {
        let key = self.generate_key();
        self.patch(vec![Update::set(path.child(&key), value)?])?;
        Ok(key)
    }

    pub fn generate_key(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }

    /// Runs `f` against the current tree under the write lock and commits
    /// the updates it returns. Nothing else can interleave between the
    /// reads `f` makes and the commit, which makes this the building block
    /// for compare-and-transition and read-modify-write updates.
    pub fn transact<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&StoreView<'_>) -> Result<Transaction<T>, E>,
        E: From<StoreError>,
    {
        Ok(self.commit(f)?.1)
    }

    /// [`transact`](Self::transact) that also reports the store version the
    /// closure's updates were committed at (or the version it read, when it
    /// wrote nothing).
    fn commit<T, E, F>(&self, f: F) -> Result<(u64, T), E>
    where
        F: FnOnce(&StoreView<'_>) -> Result<Transaction<T>, E>,
        E: From<StoreError>,
    {
        let (change, output) = {
            let mut state = self.write_state()?;
            let Transaction { updates, output } = f(&StoreView { root: &state.root })?;
            if updates.is_empty() {
                return Ok((state.version, output));
            }

            let mut paths = Vec::with_capacity(updates.len());
            for update in updates {
                match update.value {
                    Some(value) => document::set(&mut state.root, &update.path, value),
                    None => document::remove(&mut state.root, &update.path),
                }
                paths.push(update.path);
            }
            state.version += 1;
            tracing::debug!(version = state.version, paths = paths.len(), "Store commit");

            (
                StoreChange {
                    version: state.version,
                    paths,
                },
                output,
            )
        };

        let version = change.version;
        // No receivers is not an error: nobody is observing yet.
        let _ = self.changes.send(change);
        Ok((version, output))
    }

    /// Live stream of the value at `path`, starting with its current value.
    pub fn subscribe(self: &Arc<Self>, path: StorePath) -> Subscription {
        Subscription::new(Arc::clone(self), path, self.changes.subscribe())
    }

    /// Raw change notifications, used for cross-process fan-out.
    pub fn changes(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }
}
