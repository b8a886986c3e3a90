use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::team::TeamNumber;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Countdown,
    Active,
    Finished,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Countdown => "countdown",
            MatchStatus::Active => "active",
            MatchStatus::Finished => "finished",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Goal,
    Yellow,
    Red,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub team1: u32,
    pub team2: u32,
}

impl Score {
    pub fn for_team(&self, team: TeamNumber) -> u32 {
        match team {
            TeamNumber::One => self.team1,
            TeamNumber::Two => self.team2,
        }
    }
}

/// Ledger entry. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchEvent {
    pub id: Uuid,
    /// Position in the ledger, assigned by the store at commit time
    pub sequence: u64,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub player_id: Uuid,
    /// Name as it was when the event was recorded
    pub player_name: String,
    pub team_number: TeamNumber,
    pub timestamp: DateTime<Utc>,
    pub minute: u32,
}

/// Stored shape of `current-match`. Events are keyed by id so concurrent
/// appends write disjoint paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: Uuid,
    pub status: MatchStatus,
    pub duration_minutes: u32,
    pub halves: u8,
    pub current_half: u8,
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub score: Score,
    #[serde(default)]
    pub events: BTreeMap<Uuid, MatchEvent>,
    #[serde(default)]
    pub team1_ids: Vec<Uuid>,
    #[serde(default)]
    pub team2_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl MatchRecord {
    pub fn team_of(&self, player_id: &Uuid) -> Option<TeamNumber> {
        if self.team1_ids.contains(player_id) {
            Some(TeamNumber::One)
        } else if self.team2_ids.contains(player_id) {
            Some(TeamNumber::Two)
        } else {
            None
        }
    }

    pub fn next_sequence(&self) -> u64 {
        self.events.values().map(|event| event.sequence).max().unwrap_or(0) + 1
    }
}

/// Match as observers see it: events in ledger order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    pub id: Uuid,
    pub status: MatchStatus,
    pub duration_minutes: u32,
    pub halves: u8,
    pub current_half: u8,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub score: Score,
    pub events: Vec<MatchEvent>,
    pub team1_ids: Vec<Uuid>,
    pub team2_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<MatchRecord> for MatchState {
    fn from(record: MatchRecord) -> Self {
        let mut events: Vec<MatchEvent> = record.events.into_values().collect();
        events.sort_by_key(|event| event.sequence);
        Self {
            id: record.id,
            status: record.status,
            duration_minutes: record.duration_minutes,
            halves: record.halves,
            current_half: record.current_half,
            start_time: record.start_time,
            end_time: record.end_time,
            score: record.score,
            events,
            team1_ids: record.team1_ids,
            team2_ids: record.team2_ids,
            created_at: record.created_at,
        }
    }
}

impl MatchState {
    /// Time since the current half started. Always derived from the anchor,
    /// never stored, so a reconnecting observer gets the same answer.
    pub fn elapsed(&self, now: DateTime<Utc>) -> Option<Duration> {
        let start = self.start_time?;
        let until = match self.status {
            MatchStatus::Finished => self.end_time.unwrap_or(now),
            _ => now,
        };
        Some((until - start).max(Duration::zero()))
    }

    pub fn goals_for(&self, team: TeamNumber) -> u32 {
        self.events
            .iter()
            .filter(|event| event.event_type == EventType::Goal && event.team_number == team)
            .count() as u32
    }

    pub fn participants(&self) -> impl Iterator<Item = &Uuid> {
        self.team1_ids.iter().chain(self.team2_ids.iter())
    }
}

/// `floor((at - start) / 60s) + 1`, never below 1.
pub fn event_minute(start: DateTime<Utc>, at: DateTime<Utc>) -> u32 {
    let elapsed_ms = (at - start).num_milliseconds();
    if elapsed_ms <= 0 {
        return 1;
    }
    u32::try_from(elapsed_ms / 60_000).map_or(u32::MAX, |minutes| minutes.saturating_add(1))
}

/// `MM:SS` match clock.
pub fn format_clock(elapsed: Duration) -> String {
    let total_seconds = elapsed.num_seconds().max(0);
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateMatchRequest {
    pub duration_minutes: u32,
    pub halves: u8,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecordEventRequest {
    pub event_type: EventType,
    pub player_id: Uuid,
    pub team_number: TeamNumber,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ActivateMatchRequest {
    pub match_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct CurrentMatchResponse {
    #[serde(rename = "match")]
    pub match_state: Option<MatchState>,
    pub elapsed_seconds: Option<i64>,
    pub clock: Option<String>,
}
