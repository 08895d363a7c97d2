//! Tournament data models for elimination and round-robin brackets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::bracket::{Bracket, MatchPairing};
use crate::coordinator::models::MatchResult;

/// Tournament ID type
pub type TournamentId = Uuid;

/// Player ID type
pub type PlayerId = Uuid;

/// Tournament format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TournamentFormat {
    /// One loss eliminates
    SingleElimination,
    /// Two losses eliminate; losers bracket grants a second chance
    DoubleElimination,
    /// Everyone plays everyone once
    RoundRobin,
}

impl TournamentFormat {
    /// Number of losses that eliminate a player, `None` for round robin.
    pub fn elimination_threshold(&self) -> Option<u32> {
        match self {
            TournamentFormat::SingleElimination => Some(1),
            TournamentFormat::DoubleElimination => Some(2),
            TournamentFormat::RoundRobin => None,
        }
    }
}

/// Tournament state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TournamentStatus {
    /// Created, bracket built, not yet running
    NotStarted,
    /// Rounds in progress
    InProgress,
    /// Winner decided
    Completed,
}

/// Player state within a tournament
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerStatus {
    /// Tournament has not started yet
    Waiting,
    /// Available for the next match
    Ready,
    /// Currently assigned to an active match
    InMatch,
    /// Out of the tournament
    Eliminated,
}

/// Cumulative record against a single opponent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadToHeadRecord {
    /// Matches played against this opponent
    pub matches_played: u32,
    /// Wins against this opponent
    pub wins: u32,
    /// Losses against this opponent
    pub losses: u32,
    /// Points scored against this opponent
    pub points_scored: i64,
    /// Points conceded to this opponent
    pub points_conceded: i64,
}

/// Per-player statistics, updated after every completed match
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerStatistics {
    /// Completed matches
    pub matches_played: u32,
    /// Matches won
    pub matches_won: u32,
    /// Matches lost
    pub matches_lost: u32,
    /// Sum of in-match scores
    pub total_points: i64,
    /// Total cooperate decisions across all matches
    pub total_cooperations: u32,
    /// Total betray decisions across all matches
    pub total_betrayals: u32,
    /// Fraction of decisions that were cooperations (0.0 when no decisions)
    pub cooperation_rate: f64,
    /// Fraction of decisions that were betrayals (0.0 when no decisions)
    pub betrayal_rate: f64,
    /// `total_points / matches_played`
    pub average_match_score: f64,
    /// Ranking points: 3 per win, 0 per loss
    pub tournament_points: u32,
    /// Record against each opponent, keyed by opponent id
    pub head_to_head: HashMap<PlayerId, HeadToHeadRecord>,
}

impl PlayerStatistics {
    /// Win rate as a fraction (0.0 when no matches played).
    pub fn win_rate(&self) -> f64 {
        if self.matches_played == 0 {
            0.0
        } else {
            f64::from(self.matches_won) / f64::from(self.matches_played)
        }
    }

    /// Recompute the derived rate fields from the running totals.
    pub fn refresh_rates(&mut self) {
        let decisions = self.total_cooperations + self.total_betrayals;
        if decisions == 0 {
            self.cooperation_rate = 0.0;
            self.betrayal_rate = 0.0;
        } else {
            self.cooperation_rate = f64::from(self.total_cooperations) / f64::from(decisions);
            self.betrayal_rate = f64::from(self.total_betrayals) / f64::from(decisions);
        }
        if self.matches_played > 0 {
            self.average_match_score = self.total_points as f64 / f64::from(self.matches_played);
        }
    }
}

/// A player enrolled in a tournament
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentPlayer {
    /// Player ID
    pub id: PlayerId,
    /// Display name
    pub name: String,
    /// Was this player the lobby host
    pub is_host: bool,
    /// Eliminated flag, monotonic: once true it never reverses
    pub is_eliminated: bool,
    /// Current ranking position (1-indexed), assigned by the statistics engine
    pub current_rank: Option<u32>,
    /// Player state
    pub status: PlayerStatus,
    /// Accumulated statistics
    pub statistics: PlayerStatistics,
}

impl TournamentPlayer {
    /// Create an enrolled player in the waiting state.
    pub fn new(id: PlayerId, name: String, is_host: bool) -> Self {
        Self {
            id,
            name,
            is_host,
            is_eliminated: false,
            current_rank: None,
            status: PlayerStatus::Waiting,
            statistics: PlayerStatistics::default(),
        }
    }

    /// Mark the player eliminated. The flag never reverses.
    pub fn eliminate(&mut self) {
        self.is_eliminated = true;
        self.status = PlayerStatus::Eliminated;
    }
}

/// Roster entry supplied by the external lobby service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LobbyPlayer {
    /// Player ID
    pub id: PlayerId,
    /// Display name
    pub name: String,
    /// Lobby host flag
    pub is_host: bool,
}

/// Creation request from the external lobby service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LobbyInfo {
    /// Lobby ID
    pub lobby_id: Uuid,
    /// Requested format
    pub format: TournamentFormat,
    /// Roster in seeding order
    pub players: Vec<LobbyPlayer>,
}

/// A tournament and all of its in-memory state.
///
/// The roster is fixed at creation; players are never added or removed
/// mid-tournament, only eliminated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tournament {
    /// Tournament ID
    pub id: TournamentId,
    /// Originating lobby
    pub lobby_id: Uuid,
    /// Format
    pub format: TournamentFormat,
    /// Enrolled players in seeding order
    pub players: Vec<TournamentPlayer>,
    /// Round structure and recorded winners
    pub bracket: Bracket,
    /// Lifecycle state
    pub status: TournamentStatus,
    /// Current round, 0 until started
    pub current_round: u32,
    /// Total rounds (upper bound for double elimination)
    pub total_rounds: u32,
    /// Set when the tournament starts
    pub start_time: Option<DateTime<Utc>>,
    /// Set when the tournament completes
    pub end_time: Option<DateTime<Utc>>,
    /// Set once status is `Completed`
    pub winner: Option<PlayerId>,
    /// Completed match results, in completion order
    pub match_history: Vec<MatchResult>,
}

impl Tournament {
    /// Look up a player by id.
    pub fn player(&self, id: PlayerId) -> Option<&TournamentPlayer> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Look up a player by id, mutable.
    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut TournamentPlayer> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// Players still in contention.
    pub fn remaining_players(&self) -> Vec<&TournamentPlayer> {
        self.players.iter().filter(|p| !p.is_eliminated).collect()
    }

    /// True once a winner has been decided.
    pub fn is_completed(&self) -> bool {
        self.status == TournamentStatus::Completed
    }
}

/// State transition emitted by the tournament engine, for the external
/// notification layer to forward.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TournamentUpdate {
    /// A match result was applied
    MatchResult {
        tournament_id: TournamentId,
        match_id: Uuid,
        winner_id: PlayerId,
        loser_id: PlayerId,
        round: u32,
    },
    /// A new round began, with its pairings
    RoundStarted {
        tournament_id: TournamentId,
        round: u32,
        pairings: Vec<MatchPairing>,
    },
    /// The tournament finished
    TournamentCompleted {
        tournament_id: TournamentId,
        winner_id: PlayerId,
    },
}
