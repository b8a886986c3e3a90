use std::sync::Arc;

use uuid::Uuid;

use crate::clock::Clock;
use crate::errors::AppError;
use crate::models::history::HistoryEntry;
use crate::models::match_state::{
    format_clock, CurrentMatchResponse, MatchRecord, MatchState, MatchStatus, Score,
};
use crate::models::team::{TeamAssignment, TeamNumber};
use crate::services::access::Actor;
use crate::services::history_archive::HistoryArchive;
use crate::store::{paths, ReplicatedStore, StoreError, StoreView, Transaction, Update};

/// State machine for the single current match:
/// absent -> countdown -> active -> finished -> (reset) absent.
#[derive(Clone)]
pub struct MatchLifecycle {
    store: Arc<ReplicatedStore>,
    clock: Arc<dyn Clock>,
    archive: HistoryArchive,
}

fn current_record(view: &StoreView<'_>) -> Result<Option<MatchRecord>, StoreError> {
    view.get_as::<MatchRecord>(&paths::current_match())
}

fn require_record(view: &StoreView<'_>) -> Result<MatchRecord, AppError> {
    current_record(view)?.ok_or_else(|| AppError::invalid_state("No match in progress"))
}

impl MatchLifecycle {
    pub fn new(store: Arc<ReplicatedStore>, clock: Arc<dyn Clock>, archive: HistoryArchive) -> Self {
        Self { store, clock, archive }
    }

    /// Starts a countdown for a new match with the current teams.
    pub fn create(&self, actor: &Actor, duration_minutes: u32, halves: u8) -> Result<MatchState, AppError> {
        actor.require_privileged()?;
        if duration_minutes == 0 {
            return Err(AppError::Validation("Duration must be at least one minute".to_string()));
        }
        if !(1..=2).contains(&halves) {
            return Err(AppError::Validation(format!("Halves must be 1 or 2, got {}", halves)));
        }

        let now = self.clock.now();
        let record = self.store.transact(|view| {
            if let Some(existing) = current_record(view)? {
                if existing.status != MatchStatus::Finished {
                    return Err(AppError::invalid_state(format!(
                        "A match is already {}",
                        existing.status.as_str()
                    )));
                }
            }
            let assignment = view
                .get_as::<TeamAssignment>(&paths::team_assignment())?
                .unwrap_or_default();
            if assignment.is_empty() {
                return Err(AppError::NoTeamAssignment);
            }

            let record = MatchRecord {
                id: Uuid::new_v4(),
                status: MatchStatus::Countdown,
                duration_minutes,
                halves,
                current_half: 1,
                start_time: None,
                end_time: None,
                score: Score::default(),
                events: Default::default(),
                team1_ids: assignment.players(TeamNumber::One),
                team2_ids: assignment.players(TeamNumber::Two),
                created_at: now,
            };
            Ok(Transaction::commit(
                vec![Update::set(paths::current_match(), &record)?],
                record,
            ))
        })?;

        tracing::info!(
            actor = %actor.user_id,
            match_id = %record.id,
            duration_minutes,
            halves,
            "Created match"
        );
        Ok(record.into())
    }

    /// Compare-and-transition `countdown -> active` for `match_id`.
    /// Returns `None` when the match is gone or already past countdown,
    /// so racing callers all succeed but only the first one writes.
    pub fn activate(&self, match_id: Uuid) -> Result<Option<MatchState>, AppError> {
        let now = self.clock.now();
        let activated = self.store.transact(|view| {
            let Some(mut record) = current_record(view)? else {
                return Ok(Transaction::abort(None));
            };
            if record.id != match_id || record.status != MatchStatus::Countdown {
                return Ok(Transaction::abort(None));
            }
            record.status = MatchStatus::Active;
            record.current_half = 1;
            record.start_time = Some(now);
            Ok::<_, AppError>(Transaction::commit(
                vec![
                    Update::set(paths::current_match_field("status"), &record.status)?,
                    Update::set(paths::current_match_field("current_half"), &record.current_half)?,
                    Update::set(paths::current_match_field("start_time"), &record.start_time)?,
                ],
                Some(record),
            ))
        })?;

        match &activated {
            Some(_) => tracing::info!(%match_id, "Match is active"),
            None => tracing::debug!(%match_id, "Activation skipped, match is not counting down"),
        }
        Ok(activated.map(MatchState::from))
    }

    /// Privileged client request for the same transition the scheduler makes.
    pub fn activate_as(&self, actor: &Actor, match_id: Uuid) -> Result<Option<MatchState>, AppError> {
        actor.require_privileged()?;
        self.activate(match_id)
    }

    /// Moves to the next half and restarts the half-anchor.
    pub fn advance_half(&self, actor: &Actor) -> Result<MatchState, AppError> {
        actor.require_privileged()?;
        let now = self.clock.now();
        let record = self.store.transact(|view| {
            let mut record = require_record(view)?;
            if record.status != MatchStatus::Active {
                return Err(AppError::invalid_state(format!(
                    "Cannot advance half while match is {}",
                    record.status.as_str()
                )));
            }
            if record.current_half >= record.halves {
                return Err(AppError::invalid_state("Match is already in its last half"));
            }
            record.current_half += 1;
            record.start_time = Some(now);
            Ok(Transaction::commit(
                vec![
                    Update::set(paths::current_match_field("current_half"), &record.current_half)?,
                    Update::set(paths::current_match_field("start_time"), &record.start_time)?,
                ],
                record,
            ))
        })?;

        tracing::info!(match_id = %record.id, half = record.current_half, "Advanced half");
        Ok(record.into())
    }

    /// Ends the active match and archives it in the same commit. Finishing
    /// an already finished match returns the entry written the first time.
    pub fn finish(&self, actor: &Actor) -> Result<HistoryEntry, AppError> {
        actor.require_privileged()?;
        let now = self.clock.now();
        let (entry, newly_archived) = self.store.transact(|view| {
            let mut record = require_record(view)?;
            match record.status {
                MatchStatus::Active => {}
                MatchStatus::Finished => {
                    if let Some(existing) = HistoryArchive::archived_entry(view, record.id)? {
                        return Ok(Transaction::abort((existing, false)));
                    }
                    tracing::warn!(match_id = %record.id, "Finished match was never archived");
                    let (entry, updates) = self.archive.stage(&MatchState::from(record))?;
                    return Ok(Transaction::commit(updates, (entry, true)));
                }
                MatchStatus::Countdown => {
                    return Err(AppError::invalid_state("Cannot finish a match that has not started"));
                }
            }

            record.status = MatchStatus::Finished;
            record.end_time = Some(now);
            let mut updates = vec![
                Update::set(paths::current_match_field("status"), &record.status)?,
                Update::set(paths::current_match_field("end_time"), &record.end_time)?,
            ];
            let (entry, archive_updates) = self.archive.stage(&MatchState::from(record))?;
            updates.extend(archive_updates);
            Ok(Transaction::commit(updates, (entry, true)))
        })?;

        if newly_archived {
            tracing::info!(
                actor = %actor.user_id,
                match_id = %entry.snapshot.id,
                entry_id = %entry.entry_id,
                team1 = entry.snapshot.score.team1,
                team2 = entry.snapshot.score.team2,
                "Finished match"
            );
        } else {
            tracing::info!(match_id = %entry.snapshot.id, "Match was already finished");
        }
        Ok(entry)
    }

    /// Drops the finished match, returning to idle.
    pub fn reset(&self, actor: &Actor) -> Result<(), AppError> {
        actor.require_privileged()?;
        let match_id = self.store.transact(|view| {
            let record = require_record(view)?;
            if record.status != MatchStatus::Finished {
                return Err(AppError::invalid_state(format!(
                    "Cannot reset a match that is {}",
                    record.status.as_str()
                )));
            }
            Ok(Transaction::commit(vec![Update::remove(paths::current_match())], record.id))
        })?;

        tracing::info!(actor = %actor.user_id, %match_id, "Reset match");
        Ok(())
    }

    pub fn current(&self) -> Result<Option<MatchState>, AppError> {
        Ok(self
            .store
            .read_as::<MatchRecord>(&paths::current_match())?
            .map(MatchState::from))
    }

    /// Current match with its clock derived from the half-anchor.
    pub fn current_view(&self) -> Result<CurrentMatchResponse, AppError> {
        let match_state = self.current()?;
        let elapsed = match_state
            .as_ref()
            .and_then(|state| state.elapsed(self.clock.now()));
        Ok(CurrentMatchResponse {
            elapsed_seconds: elapsed.map(|elapsed| elapsed.num_seconds()),
            clock: elapsed.map(format_clock),
            match_state,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::models::user::UserRole;
    use chrono::{DateTime, Duration, Utc};
    use serde_json::json;

    struct Fixture {
        store: Arc<ReplicatedStore>,
        clock: Arc<ManualClock>,
        lifecycle: MatchLifecycle,
        archive: HistoryArchive,
        admin: Actor,
    }

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn fixture_with_players(players: usize) -> Fixture {
        let store = Arc::new(ReplicatedStore::new());
        let clock = Arc::new(ManualClock::new(t0()));
        let archive = HistoryArchive::new(Arc::clone(&store), clock.clone());
        let lifecycle = MatchLifecycle::new(Arc::clone(&store), clock.clone(), archive.clone());

        let mut assignment = TeamAssignment::new();
        for index in 0..players {
            assignment.assign(Uuid::new_v4(), TeamNumber::for_draw_index(index));
        }
        if players > 0 {
            store.write(&paths::team_assignment(), &assignment).unwrap();
        }

        Fixture {
            store,
            clock,
            lifecycle,
            archive,
            admin: Actor::new(Uuid::new_v4(), UserRole::Privileged),
        }
    }

    fn fixture() -> Fixture {
        fixture_with_players(4)
    }

    fn active(f: &Fixture) -> MatchState {
        let created = f.lifecycle.create(&f.admin, 10, 2).unwrap();
        f.lifecycle.activate(created.id).unwrap().unwrap()
    }

    #[test]
    fn create_snapshots_the_rosters_in_countdown() {
        let f = fixture();
        let assignment: TeamAssignment = f.store.read_as(&paths::team_assignment()).unwrap().unwrap();

        let created = f.lifecycle.create(&f.admin, 10, 2).unwrap();

        assert_eq!(created.status, MatchStatus::Countdown);
        assert_eq!(created.score, Score::default());
        assert_eq!(created.current_half, 1);
        assert_eq!(created.start_time, None);
        assert_eq!(created.team1_ids, assignment.players(TeamNumber::One));
        assert_eq!(created.team2_ids, assignment.players(TeamNumber::Two));
        assert!(created.team1_ids.iter().all(|id| !created.team2_ids.contains(id)));
    }

    #[test]
    fn create_requires_teams_and_valid_rules() {
        let f = fixture_with_players(0);
        assert!(matches!(
            f.lifecycle.create(&f.admin, 10, 2),
            Err(AppError::NoTeamAssignment)
        ));

        let f = fixture();
        assert!(matches!(f.lifecycle.create(&f.admin, 0, 2), Err(AppError::Validation(_))));
        assert!(matches!(f.lifecycle.create(&f.admin, 10, 3), Err(AppError::Validation(_))));
    }

    #[test]
    fn create_is_rejected_while_a_match_is_running() {
        let f = fixture();
        f.lifecycle.create(&f.admin, 10, 2).unwrap();
        assert!(matches!(
            f.lifecycle.create(&f.admin, 10, 2),
            Err(AppError::InvalidMatchState(_))
        ));
    }

    #[test]
    fn activation_applies_once_under_racing_callers() {
        let f = fixture();
        let created = f.lifecycle.create(&f.admin, 10, 2).unwrap();

        let first = f.lifecycle.activate(created.id).unwrap();
        f.clock.advance(Duration::seconds(5));
        let second = f.lifecycle.activate(created.id).unwrap();

        let first = first.unwrap();
        assert_eq!(first.status, MatchStatus::Active);
        assert_eq!(first.start_time, Some(t0()));
        assert!(second.is_none());
        assert_eq!(f.lifecycle.current().unwrap().unwrap().start_time, Some(t0()));
    }

    #[test]
    fn activation_for_a_stale_match_id_is_a_no_op() {
        let f = fixture();
        f.lifecycle.create(&f.admin, 10, 2).unwrap();
        let version = f.store.version().unwrap();

        assert!(f.lifecycle.activate(Uuid::new_v4()).unwrap().is_none());
        assert_eq!(f.store.version().unwrap(), version);
    }

    #[test]
    fn advance_half_restarts_the_anchor() {
        let f = fixture();
        active(&f);
        f.clock.advance(Duration::minutes(6));

        let second_half = f.lifecycle.advance_half(&f.admin).unwrap();

        assert_eq!(second_half.current_half, 2);
        assert_eq!(second_half.start_time, Some(t0() + Duration::minutes(6)));
        assert!(matches!(
            f.lifecycle.advance_half(&f.admin),
            Err(AppError::InvalidMatchState(_))
        ));
    }

    #[test]
    fn advance_half_requires_an_active_match() {
        let f = fixture();
        f.lifecycle.create(&f.admin, 10, 2).unwrap();
        assert!(matches!(
            f.lifecycle.advance_half(&f.admin),
            Err(AppError::InvalidMatchState(_))
        ));
    }

    #[test]
    fn finish_archives_exactly_once() {
        let f = fixture();
        let started = active(&f);
        f.clock.advance(Duration::minutes(10));

        let entry = f.lifecycle.finish(&f.admin).unwrap();
        let again = f.lifecycle.finish(&f.admin).unwrap();

        assert_eq!(entry, again);
        assert_eq!(f.archive.list().unwrap().len(), 1);
        assert_eq!(entry.snapshot.id, started.id);
        assert_eq!(entry.snapshot.status, MatchStatus::Finished);
        assert_eq!(entry.snapshot.end_time, Some(t0() + Duration::minutes(10)));
        assert_eq!(entry.snapshot.team1_ids, started.team1_ids);

        let current = f.lifecycle.current().unwrap().unwrap();
        assert_eq!(current.status, MatchStatus::Finished);
    }

    #[test]
    fn finish_archives_a_finished_match_missing_from_history() {
        let f = fixture();
        let started = active(&f);
        f.clock.advance(Duration::minutes(7));
        let end_time = f.clock.now();
        f.store
            .patch(vec![
                Update::set(paths::current_match_field("status"), &MatchStatus::Finished).unwrap(),
                Update::set(paths::current_match_field("end_time"), &Some(end_time)).unwrap(),
            ])
            .unwrap();
        assert!(f.archive.list().unwrap().is_empty());

        let entry = f.lifecycle.finish(&f.admin).unwrap();
        let again = f.lifecycle.finish(&f.admin).unwrap();

        assert_eq!(entry, again);
        assert_eq!(f.archive.list().unwrap(), vec![entry.clone()]);
        assert_eq!(entry.snapshot.id, started.id);
        assert_eq!(entry.snapshot.end_time, Some(end_time));
        assert!(f
            .store
            .read(&paths::history_index(started.id))
            .unwrap()
            .is_some());
    }

    #[test]
    fn finish_during_countdown_is_rejected() {
        let f = fixture();
        f.lifecycle.create(&f.admin, 10, 1).unwrap();
        assert!(matches!(f.lifecycle.finish(&f.admin), Err(AppError::InvalidMatchState(_))));
        assert!(f.archive.list().unwrap().is_empty());
    }

    #[test]
    fn reset_only_from_finished() {
        let f = fixture();
        assert!(matches!(f.lifecycle.reset(&f.admin), Err(AppError::InvalidMatchState(_))));

        active(&f);
        assert!(matches!(f.lifecycle.reset(&f.admin), Err(AppError::InvalidMatchState(_))));

        f.lifecycle.finish(&f.admin).unwrap();
        f.lifecycle.reset(&f.admin).unwrap();
        assert!(f.lifecycle.current().unwrap().is_none());
        assert_eq!(f.archive.list().unwrap().len(), 1);

        // A new match can follow the reset, or follow a finished one directly.
        active(&f);
        f.lifecycle.finish(&f.admin).unwrap();
        assert!(f.lifecycle.create(&f.admin, 5, 1).is_ok());
    }

    #[test]
    fn standard_players_cannot_drive_the_match() {
        let f = fixture();
        let player = Actor::new(Uuid::new_v4(), UserRole::Standard);
        assert!(matches!(f.lifecycle.create(&player, 10, 2), Err(AppError::Unauthorized)));

        let created = f.lifecycle.create(&f.admin, 10, 2).unwrap();
        assert!(matches!(
            f.lifecycle.activate_as(&player, created.id),
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(f.lifecycle.advance_half(&player), Err(AppError::Unauthorized)));
        assert!(matches!(f.lifecycle.finish(&player), Err(AppError::Unauthorized)));
        assert!(matches!(f.lifecycle.reset(&player), Err(AppError::Unauthorized)));
    }

    #[test]
    fn clock_is_derived_from_the_anchor() {
        let f = fixture();
        assert!(f.lifecycle.current_view().unwrap().match_state.is_none());

        active(&f);
        f.clock.advance(Duration::seconds(65));
        let view = f.lifecycle.current_view().unwrap();
        assert_eq!(view.elapsed_seconds, Some(65));
        assert_eq!(view.clock.as_deref(), Some("01:05"));
    }

    #[test]
    fn finished_clock_stops_at_end_time() {
        let f = fixture();
        active(&f);
        f.clock.advance(Duration::seconds(90));
        f.lifecycle.finish(&f.admin).unwrap();
        f.clock.advance(Duration::minutes(30));

        assert_eq!(f.lifecycle.current_view().unwrap().elapsed_seconds, Some(90));
    }

    #[test]
    fn match_written_by_hand_still_decodes() {
        let f = fixture();
        let id = Uuid::new_v4();
        f.store
            .write(
                &paths::current_match(),
                &json!({
                    "id": id,
                    "status": "countdown",
                    "duration_minutes": 10,
                    "halves": 1,
                    "current_half": 1,
                    "start_time": null,
                    "created_at": t0(),
                }),
            )
            .unwrap();

        let activated = f.lifecycle.activate(id).unwrap().unwrap();
        assert!(activated.events.is_empty());
        assert_eq!(activated.score, Score::default());
    }
}
