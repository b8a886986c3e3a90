use std::cmp::Ordering;
use std::sync::Arc;

use uuid::Uuid;

use crate::clock::Clock;
use crate::errors::AppError;
use crate::models::history::{HistoryEntry, PlayerStats};
use crate::models::match_state::MatchState;
use crate::store::{paths, ReplicatedStore, StoreError, StorePath, StoreView, Transaction, Update};

/// Newest first by end time, ties by entry id. Entries without an end time
/// sort last.
pub fn sort_for_display(entries: &mut [HistoryEntry]) {
    entries.sort_by(|a, b| match (a.end_time(), b.end_time()) {
        (Some(a_end), Some(b_end)) => b_end.cmp(&a_end),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.entry_id.cmp(&b.entry_id)));
}

/// Immutable record of finished matches.
#[derive(Clone)]
pub struct HistoryArchive {
    store: Arc<ReplicatedStore>,
    clock: Arc<dyn Clock>,
}

impl HistoryArchive {
    pub fn new(store: Arc<ReplicatedStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Builds the entry and the updates that write it, so a caller can
    /// commit them inside its own transaction.
    pub fn stage(&self, snapshot: &MatchState) -> Result<(HistoryEntry, Vec<Update>), StoreError> {
        let entry = HistoryEntry {
            entry_id: self.store.generate_key(),
            archived_at: self.clock.now(),
            snapshot: snapshot.clone(),
        };
        let updates = vec![
            Update::set(paths::history_entry(&entry.entry_id), &entry)?,
            Update::set(paths::history_index(snapshot.id), &entry.entry_id)?,
        ];
        Ok((entry, updates))
    }

    /// Copies `snapshot` into a new entry. Callers guarding against double
    /// archiving use [`HistoryArchive::archived_entry`] first.
    pub fn archive(&self, snapshot: &MatchState) -> Result<HistoryEntry, AppError> {
        let (entry, updates) = self.stage(snapshot)?;
        self.store.patch(updates)?;
        tracing::info!(entry_id = %entry.entry_id, match_id = %snapshot.id, "Archived match");
        Ok(entry)
    }

    /// Entry already written for `match_id`, if any.
    pub fn archived_entry(view: &StoreView<'_>, match_id: Uuid) -> Result<Option<HistoryEntry>, StoreError> {
        let Some(entry_id) = view.get_as::<String>(&paths::history_index(match_id))? else {
            return Ok(None);
        };
        view.get_as::<HistoryEntry>(&paths::history_entry(&entry_id))
    }

    pub fn list(&self) -> Result<Vec<HistoryEntry>, AppError> {
        let mut entries: Vec<HistoryEntry> = self.store.transact(|view| {
            let entries = view.children_as::<HistoryEntry>(&paths::history())?;
            Ok::<_, StoreError>(Transaction::abort(entries.into_iter().map(|(_, entry)| entry).collect()))
        })?;
        sort_for_display(&mut entries);
        Ok(entries)
    }

    pub fn get(&self, entry_id: &str) -> Result<HistoryEntry, AppError> {
        // Path parameters arrive percent-decoded and may carry a '/'.
        if !StorePath::is_valid_segment(entry_id) {
            return Err(AppError::NotFound(format!("History entry {}", entry_id)));
        }
        let path = paths::history_entry(entry_id);
        self.store
            .read_as::<HistoryEntry>(&path)?
            .ok_or_else(|| AppError::NotFound(format!("History entry {}", entry_id)))
    }

    pub fn player_stats(&self, player_id: Uuid) -> Result<PlayerStats, AppError> {
        Ok(PlayerStats::from_history(player_id, &self.list()?))
    }
}
