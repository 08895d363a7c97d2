//! Tournament engine: lifecycle, round progression and result ingestion.
//!
//! The engine owns every `Tournament` in an in-memory arena keyed by id.
//! Match creation and queueing are delegated to the match coordinator, but
//! roster mutation always happens here: the coordinator validates against a
//! borrowed tournament and hands outcomes back.
//!
//! Result processing is idempotent. Network redelivery is expected, so a
//! resubmitted result is detected against the match history and ignored
//! rather than thrown.

use chrono::Utc;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use super::bracket::{self, MatchPairing, Round};
use super::config::TournamentSettings;
use super::errors::{TournamentError, TournamentResult};
use super::models::{
    LobbyInfo, PlayerId, PlayerStatus, Tournament, TournamentFormat, TournamentId,
    TournamentPlayer, TournamentStatus, TournamentUpdate,
};
use crate::coordinator::manager::{ForfeitOutcome, MatchCoordinator};
use crate::coordinator::models::{ActiveMatch, MatchId, MatchResult};
use crate::stats;

/// Tournament engine
pub struct TournamentEngine {
    settings: TournamentSettings,
    tournaments: HashMap<TournamentId, Tournament>,
    /// Pairings already turned into active matches, per tournament,
    /// keyed by (round, bracket position)
    dispatched: HashMap<TournamentId, HashSet<(u32, u32)>>,
}

impl TournamentEngine {
    /// Create an engine with the given settings.
    pub fn new(settings: TournamentSettings) -> Self {
        Self {
            settings,
            tournaments: HashMap::new(),
            dispatched: HashMap::new(),
        }
    }

    /// Engine settings.
    pub fn settings(&self) -> &TournamentSettings {
        &self.settings
    }

    /// Create a tournament from a lobby roster. All-or-nothing: any
    /// validation failure leaves the arena untouched.
    pub fn create_tournament(&mut self, lobby: LobbyInfo) -> TournamentResult<Tournament> {
        self.settings
            .validate()
            .map_err(TournamentError::InvalidSettings)?;
        let mut seen = HashSet::new();
        for player in &lobby.players {
            if !seen.insert(player.id) {
                return Err(TournamentError::DuplicatePlayer(player.id));
            }
        }

        let ids: Vec<PlayerId> = lobby.players.iter().map(|p| p.id).collect();
        let bracket = bracket::generate(&ids, lobby.format)?;
        let total_rounds = bracket.total_rounds;

        let tournament = Tournament {
            id: Uuid::new_v4(),
            lobby_id: lobby.lobby_id,
            format: lobby.format,
            players: lobby
                .players
                .into_iter()
                .map(|p| TournamentPlayer::new(p.id, p.name, p.is_host))
                .collect(),
            bracket,
            status: TournamentStatus::NotStarted,
            current_round: 0,
            total_rounds,
            start_time: None,
            end_time: None,
            winner: None,
            match_history: Vec::new(),
        };

        log::info!(
            "Tournament {} created: {:?}, {} players, {} round(s)",
            tournament.id,
            tournament.format,
            tournament.players.len(),
            tournament.total_rounds
        );

        self.tournaments.insert(tournament.id, tournament.clone());
        Ok(tournament)
    }

    /// Start a tournament: round 1 opens and every player becomes ready.
    pub fn start_tournament(&mut self, id: TournamentId) -> TournamentResult<TournamentUpdate> {
        let tournament = self
            .tournaments
            .get_mut(&id)
            .ok_or(TournamentError::NotFound(id))?;
        if tournament.status != TournamentStatus::NotStarted {
            return Err(TournamentError::InvalidState {
                expected: TournamentStatus::NotStarted,
                actual: tournament.status,
            });
        }

        tournament.status = TournamentStatus::InProgress;
        tournament.current_round = 1;
        tournament.start_time = Some(Utc::now());
        for player in &mut tournament.players {
            player.status = PlayerStatus::Ready;
        }

        let pairings = tournament
            .bracket
            .round(1)
            .map(|r| r.pairings.clone())
            .unwrap_or_default();

        log::info!(
            "Tournament {} started: round 1 with {} pairing(s)",
            id,
            pairings.len()
        );

        Ok(TournamentUpdate::RoundStarted {
            tournament_id: id,
            round: 1,
            pairings,
        })
    }

    /// Pairings of the current round not yet turned into active matches.
    pub fn get_next_matches(&self, id: TournamentId) -> TournamentResult<Vec<MatchPairing>> {
        let tournament = self
            .tournaments
            .get(&id)
            .ok_or(TournamentError::NotFound(id))?;
        let dispatched = self.dispatched.get(&id);
        let Some(round) = tournament.bracket.round(tournament.current_round) else {
            return Ok(Vec::new());
        };
        Ok(round
            .pairings
            .iter()
            .filter(|p| {
                let key = (p.round_number, p.bracket_position);
                !round.winners.contains_key(&p.bracket_position)
                    && dispatched.is_none_or(|d| !d.contains(&key))
            })
            .cloned()
            .collect())
    }

    /// Like [`get_next_matches`](Self::get_next_matches), but marks the
    /// returned pairings as handed off so repeated calls never yield the
    /// same pairing twice. A voided forfeit puts its pairing back.
    pub fn take_next_matches(&mut self, id: TournamentId) -> TournamentResult<Vec<MatchPairing>> {
        let pairings = self.get_next_matches(id)?;
        let dispatched = self.dispatched.entry(id).or_default();
        for pairing in &pairings {
            dispatched.insert((pairing.round_number, pairing.bracket_position));
        }
        Ok(pairings)
    }

    /// Create an active match for a pairing, delegating validation and
    /// storage to the coordinator, then reserve both players.
    pub fn create_active_match(
        &mut self,
        id: TournamentId,
        pairing: &MatchPairing,
        coordinator: &mut MatchCoordinator,
    ) -> TournamentResult<ActiveMatch> {
        let tournament = self
            .tournaments
            .get_mut(&id)
            .ok_or(TournamentError::NotFound(id))?;
        if tournament.status != TournamentStatus::InProgress {
            return Err(TournamentError::InvalidState {
                expected: TournamentStatus::InProgress,
                actual: tournament.status,
            });
        }

        let record = coordinator.create_match(pairing, tournament)?;

        for player_id in record.player_ids() {
            if let Some(player) = tournament.player_mut(player_id) {
                player.status = PlayerStatus::InMatch;
            }
        }
        self.dispatched
            .entry(id)
            .or_default()
            .insert((pairing.round_number, pairing.bracket_position));

        Ok(record)
    }

    /// True if a result for this match has already been applied.
    pub fn result_applied(&self, id: TournamentId, match_id: MatchId) -> bool {
        self.tournaments
            .get(&id)
            .is_some_and(|t| t.match_history.iter().any(|r| r.match_id == match_id))
    }

    /// Apply a completed match to the tournament.
    ///
    /// The `record` must be the completed match handed back by
    /// [`MatchCoordinator::complete_match`]; the engine does not
    /// re-validate it against the coordinator's active set, so results
    /// for matches the coordinator never knew about must be rejected
    /// before this call.
    ///
    /// Returns `Ok(None)` for a duplicate of an already-applied result.
    /// The strongest transition wins the update: completing the tournament
    /// beats starting a round beats a plain match result.
    pub fn process_match_result(
        &mut self,
        record: &ActiveMatch,
        result: &MatchResult,
    ) -> TournamentResult<Option<TournamentUpdate>> {
        let id = record.tournament_id;
        if self.result_applied(id, result.match_id) {
            log::debug!("Duplicate result for match {} ignored", result.match_id);
            return Ok(None);
        }

        let tournament = self
            .tournaments
            .get_mut(&id)
            .ok_or(TournamentError::NotFound(id))?;
        if tournament.status != TournamentStatus::InProgress {
            return Err(TournamentError::InvalidState {
                expected: TournamentStatus::InProgress,
                actual: tournament.status,
            });
        }
        for player_id in [result.winner_id, result.loser_id] {
            if tournament.player(player_id).is_none() {
                return Err(TournamentError::PlayerNotInTournament(player_id));
            }
        }

        stats::engine::apply_result(tournament, result);

        // Elimination policy: enough losses and the player is out,
        // otherwise back to ready. Round robin never eliminates.
        let threshold = tournament.format.elimination_threshold();
        let loser_out = {
            let loser = tournament
                .player_mut(result.loser_id)
                .ok_or(TournamentError::PlayerNotInTournament(result.loser_id))?;
            let out = threshold.is_some_and(|t| loser.statistics.matches_lost >= t);
            if out {
                loser.eliminate();
            } else {
                loser.status = PlayerStatus::Ready;
            }
            out
        };
        if let Some(winner) = tournament.player_mut(result.winner_id) {
            winner.status = PlayerStatus::Ready;
        }
        if loser_out {
            log::info!("Player {} eliminated from tournament {}", result.loser_id, id);
        }

        if let Some(round) = tournament.bracket.round_mut(record.round_number) {
            round
                .winners
                .insert(record.bracket_position, result.winner_id);
        }
        tournament.match_history.push(result.clone());
        stats::engine::assign_ranks(tournament);

        let update = self.advance_if_round_complete(id, record.round_number)?;
        Ok(Some(update.unwrap_or(TournamentUpdate::MatchResult {
            tournament_id: id,
            match_id: result.match_id,
            winner_id: result.winner_id,
            loser_id: result.loser_id,
            round: record.round_number,
        })))
    }

    /// Resolve a mid-play forfeiture according to the configured policy.
    ///
    /// Awarded forfeits flow through normal result processing; voided
    /// matches release their players and make the pairing dispatchable
    /// again.
    pub fn process_forfeit(
        &mut self,
        id: TournamentId,
        match_id: MatchId,
        forfeiting_player: PlayerId,
        coordinator: &mut MatchCoordinator,
    ) -> TournamentResult<Option<TournamentUpdate>> {
        if !self.tournaments.contains_key(&id) {
            return Err(TournamentError::NotFound(id));
        }

        let outcome = coordinator.forfeit_match(match_id, forfeiting_player, self.settings.forfeit_policy)?;
        match outcome {
            ForfeitOutcome::Awarded(completed) => {
                let result = completed
                    .record
                    .result
                    .clone()
                    .ok_or(TournamentError::MatchNotFound(match_id))?;
                self.process_match_result(&completed.record, &result)
            }
            ForfeitOutcome::Voided { pairing, released } => {
                if let Some(tournament) = self.tournaments.get_mut(&id) {
                    for player_id in released {
                        if let Some(player) = tournament.player_mut(player_id)
                            && !player.is_eliminated
                        {
                            player.status = PlayerStatus::Ready;
                        }
                    }
                }
                if let Some(dispatched) = self.dispatched.get_mut(&id) {
                    dispatched.remove(&(pairing.round_number, pairing.bracket_position));
                }
                Ok(None)
            }
        }
    }

    /// Read-only snapshot; unknown ids return `None`, never an error.
    pub fn get_tournament_status(&self, id: TournamentId) -> Option<Tournament> {
        self.tournaments.get(&id).cloned()
    }

    /// Ids of every tournament in the arena.
    pub fn tournament_ids(&self) -> Vec<TournamentId> {
        self.tournaments.keys().copied().collect()
    }

    /// Drop a finished tournament from the arena.
    pub fn remove_tournament(&mut self, id: TournamentId) -> Option<Tournament> {
        self.dispatched.remove(&id);
        self.tournaments.remove(&id)
    }

    /// If the given round has fully resolved, advance: finish the
    /// tournament when a champion is decided, otherwise open the next
    /// round.
    fn advance_if_round_complete(
        &mut self,
        id: TournamentId,
        round_number: u32,
    ) -> TournamentResult<Option<TournamentUpdate>> {
        let tournament = self
            .tournaments
            .get_mut(&id)
            .ok_or(TournamentError::NotFound(id))?;
        if round_number != tournament.current_round {
            return Ok(None);
        }
        let Some(round) = tournament.bracket.round(round_number) else {
            return Ok(None);
        };
        if !round.is_complete() {
            return Ok(None);
        }

        match tournament.format {
            TournamentFormat::SingleElimination | TournamentFormat::DoubleElimination => {
                Self::advance_elimination(tournament, round_number)
            }
            TournamentFormat::RoundRobin => Self::advance_round_robin(tournament, round_number),
        }
    }

    fn advance_elimination(
        tournament: &mut Tournament,
        round_number: u32,
    ) -> TournamentResult<Option<TournamentUpdate>> {
        let remaining: Vec<PlayerId> = tournament
            .remaining_players()
            .iter()
            .map(|p| p.id)
            .collect();

        if let [champion] = remaining.as_slice() {
            return Ok(Some(Self::complete(tournament, *champion)));
        }

        let next_number = round_number + 1;
        let (pairings, byes) = if tournament.format == TournamentFormat::SingleElimination {
            let advancers = tournament
                .bracket
                .round(round_number)
                .map(Round::advancers)
                .unwrap_or_default();
            bracket::pair_adjacent(&advancers, next_number, 0)
        } else if remaining.len() == 2 {
            // Grand final. Its loser is only eliminated on a second loss,
            // so an unbeaten finalist who drops it gets the rematch.
            bracket::pair_adjacent(&remaining, next_number, 0)
        } else {
            // Survivors pair within their loss-count group, upper group
            // first.
            let unbeaten: Vec<PlayerId> = tournament
                .players
                .iter()
                .filter(|p| !p.is_eliminated && p.statistics.matches_lost == 0)
                .map(|p| p.id)
                .collect();
            let one_loss: Vec<PlayerId> = tournament
                .players
                .iter()
                .filter(|p| !p.is_eliminated && p.statistics.matches_lost == 1)
                .map(|p| p.id)
                .collect();
            let (mut pairings, mut byes) = bracket::pair_adjacent(&unbeaten, next_number, 0);
            let offset = pairings.len() as u32 + byes.len() as u32;
            let (lower_pairings, lower_byes) =
                bracket::pair_adjacent(&one_loss, next_number, offset);
            pairings.extend(lower_pairings);
            byes.extend(lower_byes);
            (pairings, byes)
        };

        if pairings.is_empty() {
            return Err(TournamentError::MalformedPairing {
                round: next_number,
                reason: "no pairings derivable from survivors".to_string(),
            });
        }

        tournament.bracket.rounds.push(Round {
            number: next_number,
            pairings: pairings.clone(),
            byes,
            winners: HashMap::new(),
        });
        tournament.current_round = next_number;

        log::info!(
            "Tournament {} advanced to round {} ({} pairing(s))",
            tournament.id,
            next_number,
            pairings.len()
        );

        Ok(Some(TournamentUpdate::RoundStarted {
            tournament_id: tournament.id,
            round: next_number,
            pairings,
        }))
    }

    fn advance_round_robin(
        tournament: &mut Tournament,
        round_number: u32,
    ) -> TournamentResult<Option<TournamentUpdate>> {
        if round_number >= tournament.total_rounds {
            let winner = stats::engine::round_robin_winner(tournament)
                .ok_or(TournamentError::InsufficientPlayers {
                    needed: bracket::MIN_PLAYERS,
                    current: 0,
                })?;
            return Ok(Some(Self::complete(tournament, winner)));
        }

        let next_number = round_number + 1;
        tournament.current_round = next_number;
        let pairings = tournament
            .bracket
            .round(next_number)
            .map(|r| r.pairings.clone())
            .unwrap_or_default();

        log::info!(
            "Tournament {} advanced to round {} ({} pairing(s))",
            tournament.id,
            next_number,
            pairings.len()
        );

        Ok(Some(TournamentUpdate::RoundStarted {
            tournament_id: tournament.id,
            round: next_number,
            pairings,
        }))
    }

    fn complete(tournament: &mut Tournament, winner: PlayerId) -> TournamentUpdate {
        tournament.status = TournamentStatus::Completed;
        tournament.winner = Some(winner);
        tournament.end_time = Some(Utc::now());
        stats::engine::assign_ranks(tournament);

        log::info!("Tournament {} completed, winner {}", tournament.id, winner);

        TournamentUpdate::TournamentCompleted {
            tournament_id: tournament.id,
            winner_id: winner,
        }
    }
}
