use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::history::HistoryEntry;
use crate::models::match_state::{MatchRecord, MatchState};
use crate::models::team::TeamAssignment;
use crate::models::user::User;
use crate::store::{paths, Snapshot, StoreError};

/// Messages pushed to observers over the live WebSocket channel
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "event_type")]
pub enum LiveUpdate {
    #[serde(rename = "users_updated")]
    UsersUpdated {
        version: u64,
        users: Vec<User>,
    },

    #[serde(rename = "teams_updated")]
    TeamsUpdated {
        version: u64,
        assignment: TeamAssignment,
    },

    #[serde(rename = "match_updated")]
    MatchUpdated {
        version: u64,
        #[serde(rename = "match")]
        match_state: Option<MatchState>,
    },

    #[serde(rename = "history_updated")]
    HistoryUpdated {
        version: u64,
        entries: Vec<HistoryEntry>,
    },

    #[serde(rename = "subscriptions_ready")]
    SubscriptionsReady {
        channels: Vec<String>,
        timestamp: DateTime<Utc>,
    },
}

impl LiveUpdate {
    /// Paths every observer follows.
    pub fn observed_paths() -> Vec<crate::store::StorePath> {
        vec![
            paths::users(),
            paths::team_assignment(),
            paths::current_match(),
            paths::history(),
        ]
    }

    /// Typed view of a snapshot of one of [`LiveUpdate::observed_paths`].
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Option<Self>, StoreError> {
        let version = snapshot.version;
        let value = snapshot.value.as_ref();
        let update = match snapshot.path.to_string().as_str() {
            paths::USERS => {
                let mut users: Vec<User> = match value {
                    Some(value) => decode_children(value)?,
                    None => Vec::new(),
                };
                users.sort_by(|a, b| a.name.cmp(&b.name));
                LiveUpdate::UsersUpdated { version, users }
            }
            paths::TEAM_ASSIGNMENT => LiveUpdate::TeamsUpdated {
                version,
                assignment: value.map(crate::store::decode).transpose()?.unwrap_or_default(),
            },
            paths::CURRENT_MATCH => LiveUpdate::MatchUpdated {
                version,
                match_state: value
                    .map(crate::store::decode::<MatchRecord>)
                    .transpose()?
                    .map(MatchState::from),
            },
            paths::HISTORY => {
                let mut entries: Vec<HistoryEntry> = match value {
                    Some(value) => decode_children(value)?,
                    None => Vec::new(),
                };
                crate::services::history_archive::sort_for_display(&mut entries);
                LiveUpdate::HistoryUpdated { version, entries }
            }
            _ => return Ok(None),
        };
        Ok(Some(update))
    }
}

fn decode_children<T: serde::de::DeserializeOwned>(value: &serde_json::Value) -> Result<Vec<T>, StoreError> {
    match value.as_object() {
        Some(children) => children.values().map(crate::store::decode).collect(),
        None => Ok(Vec::new()),
    }
}
