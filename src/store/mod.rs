//! Shared replicated store.
//!
//! A keyed, versioned JSON document tree. Every committed mutation bumps the
//! store version and is announced on a broadcast channel, which is what
//! observers subscribe to. Multi-path mutations commit atomically.

mod document;
mod path;
mod replicated;
mod subscription;

pub mod paths;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

pub use path::StorePath;
pub use replicated::{ReplicatedStore, StoreView};
pub use subscription::{Snapshot, Subscription};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("invalid store path: {0}")]
    InvalidPath(String),

    #[error("failed to encode or decode stored value: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Notification published after every committed mutation.
#[derive(Debug, Clone, Serialize)]
pub struct StoreChange {
    pub version: u64,
    pub paths: Vec<StorePath>,
}

/// A single path mutation. `None` removes the node.
#[derive(Debug, Clone)]
pub struct Update {
    pub path: StorePath,
    pub value: Option<Value>,
}

impl Update {
    pub fn set<T: Serialize + ?Sized>(path: StorePath, value: &T) -> Result<Self, StoreError> {
        Ok(Self {
            path,
            value: Some(serde_json::to_value(value)?),
        })
    }

    pub fn remove(path: StorePath) -> Self {
        Self { path, value: None }
    }
}

/// Outcome of a [`ReplicatedStore::transact`] closure.
#[derive(Debug)]
pub struct Transaction<T> {
    updates: Vec<Update>,
    output: T,
}

impl<T> Transaction<T> {
    /// Apply `updates` atomically and hand `output` back to the caller.
    pub fn commit(updates: Vec<Update>, output: T) -> Self {
        Self { updates, output }
    }

    /// Leave the store untouched.
    pub fn abort(output: T) -> Self {
        Self {
            updates: Vec::new(),
            output,
        }
    }
}

pub(crate) fn decode<T: DeserializeOwned>(value: &Value) -> Result<T, StoreError> {
    Ok(T::deserialize(value)?)
}
