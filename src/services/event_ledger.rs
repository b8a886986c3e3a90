use std::sync::Arc;

use uuid::Uuid;

use crate::clock::Clock;
use crate::errors::AppError;
use crate::models::match_state::{event_minute, EventType, MatchEvent, MatchRecord, MatchState, MatchStatus};
use crate::models::team::TeamNumber;
use crate::services::access::Actor;
use crate::store::{paths, ReplicatedStore, Transaction, Update};

/// Append-only goals and cards of the current match.
#[derive(Clone)]
pub struct EventLedger {
    store: Arc<ReplicatedStore>,
    clock: Arc<dyn Clock>,
}

impl EventLedger {
    pub fn new(store: Arc<ReplicatedStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Appends an event and, for goals, bumps the team score in the same
    /// commit. The sequence number is assigned under the store lock.
    pub fn record_event(
        &self,
        actor: &Actor,
        event_type: EventType,
        player_id: Uuid,
        team_number: TeamNumber,
    ) -> Result<MatchEvent, AppError> {
        actor.require_privileged()?;
        let now = self.clock.now();

        let (event, match_id) = self.store.transact(|view| {
            let record = view
                .get_as::<MatchRecord>(&paths::current_match())?
                .ok_or_else(|| AppError::invalid_state("No match in progress"))?;
            if record.status != MatchStatus::Active {
                return Err(AppError::invalid_state(format!(
                    "Events can only be recorded while the match is active, it is {}",
                    record.status.as_str()
                )));
            }
            let start_time = record
                .start_time
                .ok_or_else(|| AppError::invalid_state("Active match has no start time"))?;

            match record.team_of(&player_id) {
                Some(team) if team == team_number => {}
                Some(team) => {
                    return Err(AppError::Validation(format!(
                        "Player {} plays for team {}, not team {}",
                        player_id, team, team_number
                    )));
                }
                None => return Err(AppError::UnknownPlayer(player_id)),
            }
            let player_name = view
                .get_as::<String>(&paths::user(player_id).child("name"))?
                .ok_or(AppError::UnknownPlayer(player_id))?;

            let event = MatchEvent {
                id: Uuid::new_v4(),
                sequence: record.next_sequence(),
                event_type,
                player_id,
                player_name,
                team_number,
                timestamp: now,
                minute: event_minute(start_time, now),
            };

            let mut updates = vec![Update::set(paths::current_match_event(event.id), &event)?];
            if event_type == EventType::Goal {
                let (field, goals) = match team_number {
                    TeamNumber::One => ("team1", record.score.team1 + 1),
                    TeamNumber::Two => ("team2", record.score.team2 + 1),
                };
                updates.push(Update::set(paths::current_match_field("score").child(field), &goals)?);
            }
            Ok(Transaction::commit(updates, (event, record.id)))
        })?;

        tracing::info!(
            actor = %actor.user_id,
            %match_id,
            event_id = %event.id,
            sequence = event.sequence,
            event_type = ?event.event_type,
            team = %event.team_number,
            minute = event.minute,
            "Recorded match event"
        );
        Ok(event)
    }

    /// Events of the current match in ledger order.
    pub fn events(&self) -> Result<Vec<MatchEvent>, AppError> {
        Ok(self
            .store
            .read_as::<MatchRecord>(&paths::current_match())?
            .map(|record| MatchState::from(record).events)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::models::match_state::Score;
    use crate::models::team::TeamAssignment;
    use crate::models::user::UserRole;
    use crate::services::history_archive::HistoryArchive;
    use crate::services::match_lifecycle::MatchLifecycle;
    use chrono::{DateTime, Duration, Utc};
    use serde_json::json;

    struct Fixture {
        store: Arc<ReplicatedStore>,
        clock: Arc<ManualClock>,
        lifecycle: MatchLifecycle,
        ledger: EventLedger,
        admin: Actor,
        team1: Vec<Uuid>,
        team2: Vec<Uuid>,
    }

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn fixture() -> Fixture {
        let store = Arc::new(ReplicatedStore::new());
        let clock = Arc::new(ManualClock::new(t0()));
        let archive = HistoryArchive::new(Arc::clone(&store), clock.clone());
        let lifecycle = MatchLifecycle::new(Arc::clone(&store), clock.clone(), archive);
        let ledger = EventLedger::new(Arc::clone(&store), clock.clone());

        let mut assignment = TeamAssignment::new();
        for (index, name) in ["Ana", "Bia", "Caio", "Duda"].into_iter().enumerate() {
            let id = Uuid::new_v4();
            store.write(&paths::user(id), &json!({"id": id, "name": name})).unwrap();
            assignment.assign(id, TeamNumber::for_draw_index(index));
        }
        store.write(&paths::team_assignment(), &assignment).unwrap();

        Fixture {
            team1: assignment.players(TeamNumber::One),
            team2: assignment.players(TeamNumber::Two),
            store,
            clock,
            lifecycle,
            ledger,
            admin: Actor::new(Uuid::new_v4(), UserRole::Privileged),
        }
    }

    fn start(f: &Fixture) {
        let created = f.lifecycle.create(&f.admin, 10, 2).unwrap();
        f.lifecycle.activate(created.id).unwrap().unwrap();
    }

    #[test]
    fn events_outside_an_active_match_are_rejected() {
        let f = fixture();
        let result = f.ledger.record_event(&f.admin, EventType::Goal, f.team1[0], TeamNumber::One);
        assert!(matches!(result, Err(AppError::InvalidMatchState(_))));

        f.lifecycle.create(&f.admin, 10, 2).unwrap();
        let version = f.store.version().unwrap();
        let result = f.ledger.record_event(&f.admin, EventType::Goal, f.team1[0], TeamNumber::One);
        assert!(matches!(result, Err(AppError::InvalidMatchState(_))));
        assert_eq!(f.store.version().unwrap(), version);
    }

    #[test]
    fn goal_after_65_seconds_is_minute_two() {
        let f = fixture();
        start(&f);
        f.clock.advance(Duration::milliseconds(65_000));

        let event = f
            .ledger
            .record_event(&f.admin, EventType::Goal, f.team1[0], TeamNumber::One)
            .unwrap();

        assert_eq!(event.minute, 2);
        assert_eq!(event.sequence, 1);
        let current = f.lifecycle.current().unwrap().unwrap();
        assert_eq!(current.score, Score { team1: 1, team2: 0 });
        assert_eq!(current.events, vec![event]);
    }

    #[test]
    fn score_matches_goal_count_for_any_sequence() {
        let f = fixture();
        start(&f);
        let script = [
            (EventType::Goal, 0usize, TeamNumber::One),
            (EventType::Yellow, 1, TeamNumber::Two),
            (EventType::Goal, 0, TeamNumber::Two),
            (EventType::Red, 1, TeamNumber::One),
            (EventType::Goal, 1, TeamNumber::One),
            (EventType::Goal, 1, TeamNumber::Two),
        ];
        for (event_type, index, team) in script {
            let player = match team {
                TeamNumber::One => f.team1[index],
                TeamNumber::Two => f.team2[index],
            };
            f.ledger.record_event(&f.admin, event_type, player, team).unwrap();
            f.clock.advance(Duration::seconds(20));

            let current = f.lifecycle.current().unwrap().unwrap();
            assert_eq!(current.score.team1, current.goals_for(TeamNumber::One));
            assert_eq!(current.score.team2, current.goals_for(TeamNumber::Two));
        }

        let events = f.ledger.events().unwrap();
        let sequences: Vec<u64> = events.iter().map(|e| e.sequence).collect();
        assert_eq!(sequences, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn minute_uses_the_current_half_anchor() {
        let f = fixture();
        start(&f);
        f.clock.advance(Duration::minutes(5));
        f.lifecycle.advance_half(&f.admin).unwrap();
        f.clock.advance(Duration::seconds(30));

        let event = f
            .ledger
            .record_event(&f.admin, EventType::Yellow, f.team2[0], TeamNumber::Two)
            .unwrap();
        assert_eq!(event.minute, 1);
    }

    #[test]
    fn player_must_be_on_the_named_team() {
        let f = fixture();
        start(&f);

        let wrong_team = f.ledger.record_event(&f.admin, EventType::Goal, f.team1[0], TeamNumber::Two);
        assert!(matches!(wrong_team, Err(AppError::Validation(_))));

        let stranger = Uuid::new_v4();
        let not_playing = f.ledger.record_event(&f.admin, EventType::Goal, stranger, TeamNumber::One);
        assert!(matches!(not_playing, Err(AppError::UnknownPlayer(id)) if id == stranger));
        assert!(f.ledger.events().unwrap().is_empty());
    }

    #[test]
    fn player_name_is_a_snapshot() {
        let f = fixture();
        start(&f);
        let scorer = f.team1[0];
        let event = f
            .ledger
            .record_event(&f.admin, EventType::Goal, scorer, TeamNumber::One)
            .unwrap();

        f.store.write(&paths::user(scorer).child("name"), "Renamed").unwrap();

        assert_ne!(event.player_name, "Renamed");
        assert_eq!(f.ledger.events().unwrap()[0].player_name, event.player_name);
    }

    #[test]
    fn concurrent_goals_are_all_counted() {
        let f = fixture();
        start(&f);
        let scorer = f.team2[0];

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ledger = f.ledger.clone();
                let admin = f.admin;
                std::thread::spawn(move || {
                    for _ in 0..10 {
                        ledger
                            .record_event(&admin, EventType::Goal, scorer, TeamNumber::Two)
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let current = f.lifecycle.current().unwrap().unwrap();
        assert_eq!(current.score.team2, 80);
        assert_eq!(current.events.len(), 80);
        let mut sequences: Vec<u64> = current.events.iter().map(|e| e.sequence).collect();
        sequences.dedup();
        assert_eq!(sequences, (1..=80).collect::<Vec<u64>>());
    }

    #[test]
    fn standard_players_cannot_record() {
        let f = fixture();
        start(&f);
        let player = Actor::new(f.team1[0], UserRole::Standard);
        let result = f.ledger.record_event(&player, EventType::Goal, f.team1[0], TeamNumber::One);
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }
}
