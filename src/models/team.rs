use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Side of the pitch, replicated as the integer 1 or 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TeamNumber {
    One,
    Two,
}

impl TeamNumber {
    /// Team for the player at `index` of a shuffled draw.
    pub fn for_draw_index(index: usize) -> Self {
        if index % 2 == 0 {
            TeamNumber::One
        } else {
            TeamNumber::Two
        }
    }
}

impl TryFrom<u8> for TeamNumber {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(TeamNumber::One),
            2 => Ok(TeamNumber::Two),
            other => Err(format!("team number must be 1 or 2, got {}", other)),
        }
    }
}

impl From<TeamNumber> for u8 {
    fn from(team: TeamNumber) -> Self {
        match team {
            TeamNumber::One => 1,
            TeamNumber::Two => 2,
        }
    }
}

impl fmt::Display for TeamNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

/// Current draw: player id to team. Replicated at `team-assignment`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamAssignment(BTreeMap<Uuid, TeamNumber>);

impl TeamAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, player_id: Uuid, team: TeamNumber) {
        self.0.insert(player_id, team);
    }

    pub fn team_of(&self, player_id: &Uuid) -> Option<TeamNumber> {
        self.0.get(player_id).copied()
    }

    /// Players on `team`, in id order.
    pub fn players(&self, team: TeamNumber) -> Vec<Uuid> {
        self.0
            .iter()
            .filter(|(_, assigned)| **assigned == team)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Uuid, &TeamNumber)> {
        self.0.iter()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DrawRequest {
    pub player_ids: Vec<Uuid>,
    /// Confirms an uneven draw
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DrawOutcome {
    Drawn { assignment: TeamAssignment },
    /// Odd player count: nothing was written, re-issue with `force`
    NeedsConfirmation { player_count: usize },
}

#[derive(Debug, Serialize)]
pub struct TeamsResponse {
    pub assignment: TeamAssignment,
    pub team1: Vec<Uuid>,
    pub team2: Vec<Uuid>,
}

impl From<TeamAssignment> for TeamsResponse {
    fn from(assignment: TeamAssignment) -> Self {
        Self {
            team1: assignment.players(TeamNumber::One),
            team2: assignment.players(TeamNumber::Two),
            assignment,
        }
    }
}
