use std::collections::HashSet;
use std::sync::Arc;

use rand::Rng;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::team::{DrawOutcome, TeamAssignment, TeamNumber};
use crate::services::access::Actor;
use crate::store::{paths, ReplicatedStore, StoreError, Transaction, Update};

const MIN_PLAYERS: usize = 2;

/// Shuffles `player_ids` with Fisher–Yates and alternates teams by index.
pub fn draw_teams<R: Rng + ?Sized>(player_ids: &[Uuid], rng: &mut R) -> TeamAssignment {
    let mut shuffled = player_ids.to_vec();
    for i in (1..shuffled.len()).rev() {
        let j = rng.gen_range(0..=i);
        shuffled.swap(i, j);
    }

    let mut assignment = TeamAssignment::new();
    for (index, player_id) in shuffled.into_iter().enumerate() {
        assignment.assign(player_id, TeamNumber::for_draw_index(index));
    }
    assignment
}

#[derive(Clone)]
pub struct TeamDrawer {
    store: Arc<ReplicatedStore>,
}

impl TeamDrawer {
    pub fn new(store: Arc<ReplicatedStore>) -> Self {
        Self { store }
    }

    /// Replaces the current assignment with a fresh draw and drops any
    /// current match. An odd selection needs `force`.
    pub fn draw(&self, actor: &Actor, player_ids: &[Uuid], force: bool) -> Result<DrawOutcome, AppError> {
        actor.require_privileged()?;

        let mut seen = HashSet::new();
        let selected: Vec<Uuid> = player_ids.iter().copied().filter(|id| seen.insert(*id)).collect();

        if selected.len() < MIN_PLAYERS {
            return Err(AppError::InsufficientPlayers(selected.len()));
        }
        if selected.len() % 2 == 1 && !force {
            tracing::info!(player_count = selected.len(), "Uneven draw needs confirmation");
            return Ok(DrawOutcome::NeedsConfirmation {
                player_count: selected.len(),
            });
        }

        let assignment = draw_teams(&selected, &mut rand::thread_rng());

        self.store.transact(|view| {
            if let Some(unknown) = selected.iter().find(|id| !view.contains(&paths::user(**id))) {
                return Err(AppError::UnknownPlayer(*unknown));
            }
            Ok(Transaction::commit(
                vec![
                    Update::set(paths::team_assignment(), &assignment)?,
                    Update::remove(paths::current_match()),
                ],
                (),
            ))
        })?;

        tracing::info!(
            actor = %actor.user_id,
            team1 = assignment.players(TeamNumber::One).len(),
            team2 = assignment.players(TeamNumber::Two).len(),
            "Drew teams"
        );
        Ok(DrawOutcome::Drawn { assignment })
    }

    /// Removes the assignment and any current match.
    pub fn clear(&self, actor: &Actor) -> Result<(), AppError> {
        actor.require_privileged()?;
        self.store.patch(vec![
            Update::remove(paths::team_assignment()),
            Update::remove(paths::current_match()),
        ])?;
        tracing::info!(actor = %actor.user_id, "Cleared teams");
        Ok(())
    }

    pub fn current(&self) -> Result<TeamAssignment, StoreError> {
        Ok(self
            .store
            .read_as::<TeamAssignment>(&paths::team_assignment())?
            .unwrap_or_default())
    }
}
