//! Match coordinator: match lifecycle, active set and dispatch.
//!
//! The coordinator owns every match from creation to completion, but it
//! never mutates a `Tournament` it does not own. Validation borrows the
//! roster; outcomes (created matches, released players) are returned for
//! the tournament engine to apply.

use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use super::models::{ActiveMatch, MatchId, MatchResult, MatchStatistics, MatchStatus, PlayerSnapshot};
use super::queue::MatchQueue;
use super::session::{SessionError, SessionLauncher};
use crate::tournament::bracket::MatchPairing;
use crate::tournament::config::{ForfeitPolicy, GameConfig};
use crate::tournament::models::{PlayerId, PlayerStatus, Tournament, TournamentId};

/// Match coordinator errors
#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("Match not found: {0}")]
    MatchNotFound(MatchId),

    #[error("Player {0} is not in this tournament")]
    PlayerNotInTournament(PlayerId),

    #[error("Player {0} is already in an active match")]
    MatchAlreadyInProgress(PlayerId),

    #[error("Player {0} has been eliminated")]
    PlayerEliminated(PlayerId),

    #[error("Duplicate player {0} in pairing")]
    DuplicatePlayerInPairing(PlayerId),

    #[error("Match {id} not in correct state: expected {expected:?}, got {actual:?}")]
    InvalidMatchState {
        id: MatchId,
        expected: MatchStatus,
        actual: MatchStatus,
    },

    #[error(transparent)]
    Session(#[from] SessionError),
}

pub type CoordinatorResult<T> = Result<T, CoordinatorError>;

/// A match handed back on completion, with the players it released.
#[derive(Debug, Clone)]
pub struct CompletedMatch {
    /// The completed match record, removed from the active set
    pub record: ActiveMatch,
    /// Players no longer reserved by this match
    pub released: [PlayerId; 2],
}

/// Outcome of a forfeiture, per the configured policy.
#[derive(Debug, Clone)]
pub enum ForfeitOutcome {
    /// The opponent was awarded a zero-score win
    Awarded(CompletedMatch),
    /// The match was voided; the pairing should be re-queued
    Voided {
        pairing: MatchPairing,
        released: [PlayerId; 2],
    },
}

/// Match coordinator
pub struct MatchCoordinator {
    /// External game-play engine boundary
    launcher: Arc<dyn SessionLauncher>,
    /// Active matches by id (scheduled and in-progress)
    active: HashMap<MatchId, ActiveMatch>,
    /// Active match ids per tournament
    by_tournament: HashMap<TournamentId, HashSet<MatchId>>,
    /// Per-tournament pairing queues
    queue: MatchQueue,
}

impl MatchCoordinator {
    /// Create a coordinator using the given session launcher.
    pub fn new(launcher: Arc<dyn SessionLauncher>) -> Self {
        Self {
            launcher,
            active: HashMap::new(),
            by_tournament: HashMap::new(),
            queue: MatchQueue::new(),
        }
    }

    /// Create a match from a pairing, reserving both players.
    ///
    /// All-or-nothing: any validation failure leaves the coordinator
    /// untouched. The caller applies the `InMatch` roster transition.
    pub fn create_match(
        &mut self,
        pairing: &MatchPairing,
        tournament: &Tournament,
    ) -> CoordinatorResult<ActiveMatch> {
        if pairing.player1_id == pairing.player2_id {
            return Err(CoordinatorError::DuplicatePlayerInPairing(pairing.player1_id));
        }

        let busy = self.busy_players(tournament.id);
        let snapshot = |id: PlayerId| -> CoordinatorResult<PlayerSnapshot> {
            let player = tournament
                .player(id)
                .ok_or(CoordinatorError::PlayerNotInTournament(id))?;
            if player.is_eliminated {
                return Err(CoordinatorError::PlayerEliminated(id));
            }
            if player.status == PlayerStatus::InMatch || busy.contains(&id) {
                return Err(CoordinatorError::MatchAlreadyInProgress(id));
            }
            Ok(PlayerSnapshot {
                id,
                name: player.name.clone(),
            })
        };

        let player1 = snapshot(pairing.player1_id)?;
        let player2 = snapshot(pairing.player2_id)?;
        let record = ActiveMatch {
            id: Uuid::new_v4(),
            tournament_id: tournament.id,
            round_number: pairing.round_number,
            bracket_position: pairing.bracket_position,
            player1,
            player2,
            status: MatchStatus::Scheduled,
            game_session_id: None,
            start_time: None,
            end_time: None,
            result: None,
        };

        self.by_tournament
            .entry(tournament.id)
            .or_default()
            .insert(record.id);
        self.active.insert(record.id, record.clone());

        log::debug!(
            "Match {} scheduled: {} vs {} (round {})",
            record.id,
            record.player1.name,
            record.player2.name,
            record.round_number
        );

        Ok(record)
    }

    /// Start a scheduled match: obtain a game session and go in-progress.
    pub async fn start_match(
        &mut self,
        match_id: MatchId,
        config: &GameConfig,
    ) -> CoordinatorResult<ActiveMatch> {
        let record = self
            .active
            .get(&match_id)
            .ok_or(CoordinatorError::MatchNotFound(match_id))?;
        if record.status != MatchStatus::Scheduled {
            return Err(CoordinatorError::InvalidMatchState {
                id: match_id,
                expected: MatchStatus::Scheduled,
                actual: record.status,
            });
        }

        let session_id = self
            .launcher
            .start_session(&record.player1, &record.player2, config)
            .await?;

        // Re-borrow mutably after the await.
        let record = self
            .active
            .get_mut(&match_id)
            .ok_or(CoordinatorError::MatchNotFound(match_id))?;
        record.status = MatchStatus::InProgress;
        record.game_session_id = Some(session_id);
        record.start_time = Some(Utc::now());

        log::info!("Match {} started (session {})", match_id, session_id);
        Ok(record.clone())
    }

    /// Record a result and remove the match from the active set.
    ///
    /// Duplicate deliveries are expected: completing a match that is no
    /// longer active is a logged no-op that returns `None`.
    pub fn complete_match(
        &mut self,
        match_id: MatchId,
        result: MatchResult,
    ) -> CoordinatorResult<Option<CompletedMatch>> {
        match self.active.get(&match_id) {
            None => {
                log::debug!("Ignoring completion for inactive match {match_id}");
                return Ok(None);
            }
            Some(record) if record.status != MatchStatus::InProgress => {
                return Err(CoordinatorError::InvalidMatchState {
                    id: match_id,
                    expected: MatchStatus::InProgress,
                    actual: record.status,
                });
            }
            Some(_) => {}
        }

        let mut record = self
            .active
            .remove(&match_id)
            .ok_or(CoordinatorError::MatchNotFound(match_id))?;
        record.status = MatchStatus::Completed;
        record.end_time = Some(Utc::now());
        record.result = Some(result);
        if let Some(ids) = self.by_tournament.get_mut(&record.tournament_id) {
            ids.remove(&match_id);
        }

        log::info!(
            "Match {} completed: {} vs {}",
            match_id,
            record.player1.name,
            record.player2.name
        );

        let released = record.player_ids();
        Ok(Some(CompletedMatch { record, released }))
    }

    /// Resolve a mid-play disconnect according to the forfeit policy.
    pub fn forfeit_match(
        &mut self,
        match_id: MatchId,
        forfeiting_player: PlayerId,
        policy: ForfeitPolicy,
    ) -> CoordinatorResult<ForfeitOutcome> {
        let record = self
            .active
            .get(&match_id)
            .ok_or(CoordinatorError::MatchNotFound(match_id))?;
        if !record.involves(forfeiting_player) {
            return Err(CoordinatorError::PlayerNotInTournament(forfeiting_player));
        }

        match policy {
            ForfeitPolicy::AwardWin => {
                let winner_id = record
                    .opponent_unchecked(forfeiting_player);
                let result = MatchResult {
                    match_id,
                    player1_id: record.player1.id,
                    player2_id: record.player2.id,
                    winner_id,
                    loser_id: forfeiting_player,
                    player1_score: 0,
                    player2_score: 0,
                    statistics: MatchStatistics::default(),
                    forfeit: true,
                    completed_at: Utc::now(),
                };
                log::warn!(
                    "Match {} forfeited by {}; win awarded to {}",
                    match_id,
                    forfeiting_player,
                    winner_id
                );
                // Scheduled matches may also be forfeited; force them
                // through the in-progress gate first.
                if let Some(r) = self.active.get_mut(&match_id)
                    && r.status == MatchStatus::Scheduled
                {
                    r.status = MatchStatus::InProgress;
                }
                let completed = self
                    .complete_match(match_id, result)?
                    .ok_or(CoordinatorError::MatchNotFound(match_id))?;
                Ok(ForfeitOutcome::Awarded(completed))
            }
            ForfeitPolicy::VoidAndRequeue => {
                let record = self
                    .active
                    .remove(&match_id)
                    .ok_or(CoordinatorError::MatchNotFound(match_id))?;
                if let Some(ids) = self.by_tournament.get_mut(&record.tournament_id) {
                    ids.remove(&match_id);
                }
                log::warn!("Match {} voided after forfeit by {}", match_id, forfeiting_player);
                Ok(ForfeitOutcome::Voided {
                    pairing: MatchPairing {
                        player1_id: record.player1.id,
                        player2_id: record.player2.id,
                        round_number: record.round_number,
                        bracket_position: record.bracket_position,
                    },
                    released: record.player_ids(),
                })
            }
        }
    }

    /// Look up an active match.
    pub fn get_match(&self, match_id: MatchId) -> Option<&ActiveMatch> {
        self.active.get(&match_id)
    }

    /// Find the active match for a game session handle.
    pub fn match_for_session(&self, session_id: Uuid) -> Option<&ActiveMatch> {
        self.active
            .values()
            .find(|m| m.game_session_id == Some(session_id))
    }

    /// Active match count for a tournament.
    pub fn active_count(&self, tournament_id: TournamentId) -> usize {
        self.by_tournament
            .get(&tournament_id)
            .map_or(0, HashSet::len)
    }

    /// Player ids reserved by a tournament's active matches.
    pub fn busy_players(&self, tournament_id: TournamentId) -> HashSet<PlayerId> {
        self.by_tournament
            .get(&tournament_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.active.get(id))
            .flat_map(ActiveMatch::player_ids)
            .collect()
    }

    /// Append pairings to a tournament's dispatch queue.
    pub fn queue_pairings(&mut self, tournament_id: TournamentId, pairings: Vec<MatchPairing>) {
        log::debug!(
            "Queued {} pairing(s) for tournament {}",
            pairings.len(),
            tournament_id
        );
        self.queue.push_pairings(tournament_id, pairings);
    }

    /// Queued pairing count for a tournament.
    pub fn queued_len(&self, tournament_id: TournamentId) -> usize {
        self.queue.len(tournament_id)
    }

    /// Pull the next conflict-free, cap-bounded batch from the queue.
    pub fn next_available_matches(
        &mut self,
        tournament: &Tournament,
        max_concurrent: usize,
    ) -> Vec<MatchPairing> {
        let busy = self.busy_players(tournament.id);
        let active_count = self.active_count(tournament.id);
        self.queue
            .next_available(tournament.id, tournament, &busy, max_concurrent, active_count)
    }

    /// Drop all queue and active-set state for a finished tournament.
    pub fn remove_tournament(&mut self, tournament_id: TournamentId) {
        self.queue.remove(tournament_id);
        if let Some(ids) = self.by_tournament.remove(&tournament_id) {
            for id in ids {
                self.active.remove(&id);
            }
        }
    }
}

impl ActiveMatch {
    /// The other participant. Caller must have checked membership.
    fn opponent_unchecked(&self, player: PlayerId) -> PlayerId {
        if self.player1.id == player {
            self.player2.id
        } else {
            self.player1.id
        }
    }
}
