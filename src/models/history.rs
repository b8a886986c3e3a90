use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::match_state::{EventType, MatchState};

/// Archived copy of a finished match, stored at `history/{entry_id}` and
/// never written again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub entry_id: String,
    pub archived_at: DateTime<Utc>,
    #[serde(flatten)]
    pub snapshot: MatchState,
}

impl HistoryEntry {
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.snapshot.end_time
    }
}

/// Per-player totals over the archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub matches: u32,
    pub goals: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
}

impl PlayerStats {
    pub fn from_history<'a>(player_id: Uuid, entries: impl IntoIterator<Item = &'a HistoryEntry>) -> Self {
        entries
            .into_iter()
            .filter(|entry| entry.snapshot.participants().any(|id| *id == player_id))
            .fold(Self::default(), |mut stats, entry| {
                stats.matches += 1;
                for event in entry.snapshot.events.iter().filter(|e| e.player_id == player_id) {
                    match event.event_type {
                        EventType::Goal => stats.goals += 1,
                        EventType::Yellow => stats.yellow_cards += 1,
                        EventType::Red => stats.red_cards += 1,
                    }
                }
                stats
            })
    }
}
