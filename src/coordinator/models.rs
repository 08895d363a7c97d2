//! Match coordinator data models: the per-match lifecycle and its result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tournament::models::{PlayerId, TournamentId};

/// Match ID type
pub type MatchId = Uuid;

/// Game session ID handed back by the external game-play engine
pub type SessionId = Uuid;

/// Match lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    /// Created and players reserved, session not yet started
    Scheduled,
    /// Game session running
    InProgress,
    /// Result recorded
    Completed,
}

/// Snapshot of a player taken when the match is created. Not a live
/// reference; the tournament roster is the authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    /// Player ID
    pub id: PlayerId,
    /// Display name at match creation
    pub name: String,
}

/// Cooperate/betray decision tallies for one player in one match
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionCounts {
    /// Cooperate decisions
    pub cooperations: u32,
    /// Betray decisions
    pub betrayals: u32,
}

/// Aggregate statistics reported by the game-play engine for one match
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStatistics {
    /// Decision rounds played
    pub rounds_played: u32,
    /// Player 1 decision tallies
    pub player1_decisions: DecisionCounts,
    /// Player 2 decision tallies
    pub player2_decisions: DecisionCounts,
    /// Wall-clock duration of the match in seconds
    pub duration_secs: u64,
}

/// Final outcome of a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Match this result belongs to
    pub match_id: MatchId,
    /// Player 1 ID
    pub player1_id: PlayerId,
    /// Player 2 ID
    pub player2_id: PlayerId,
    /// Winner
    pub winner_id: PlayerId,
    /// Loser
    pub loser_id: PlayerId,
    /// Player 1 score
    pub player1_score: i64,
    /// Player 2 score
    pub player2_score: i64,
    /// Per-match statistics
    pub statistics: MatchStatistics,
    /// Whether this result was synthesized from a forfeiture
    pub forfeit: bool,
    /// Completion timestamp
    pub completed_at: DateTime<Utc>,
}

impl MatchResult {
    /// Combined score of both players.
    pub fn total_score(&self) -> i64 {
        self.player1_score + self.player2_score
    }

    /// Score for one participant, `None` for a non-participant.
    pub fn score_for(&self, player: PlayerId) -> Option<i64> {
        if player == self.player1_id {
            Some(self.player1_score)
        } else if player == self.player2_id {
            Some(self.player2_score)
        } else {
            None
        }
    }

    /// Decision tallies for one participant, `None` for a non-participant.
    pub fn decisions_for(&self, player: PlayerId) -> Option<DecisionCounts> {
        if player == self.player1_id {
            Some(self.statistics.player1_decisions)
        } else if player == self.player2_id {
            Some(self.statistics.player2_decisions)
        } else {
            None
        }
    }

    /// The participant that is not `player`.
    pub fn opponent_of(&self, player: PlayerId) -> Option<PlayerId> {
        if player == self.player1_id {
            Some(self.player2_id)
        } else if player == self.player2_id {
            Some(self.player1_id)
        } else {
            None
        }
    }
}

/// A match owned by the coordinator from creation until completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveMatch {
    /// Match ID
    pub id: MatchId,
    /// Owning tournament
    pub tournament_id: TournamentId,
    /// Round this match belongs to
    pub round_number: u32,
    /// Position within the round
    pub bracket_position: u32,
    /// First player snapshot
    pub player1: PlayerSnapshot,
    /// Second player snapshot
    pub player2: PlayerSnapshot,
    /// Lifecycle state
    pub status: MatchStatus,
    /// Session handle from the external game-play engine, set on start
    pub game_session_id: Option<SessionId>,
    /// Set when the session starts
    pub start_time: Option<DateTime<Utc>>,
    /// Set when the result is recorded
    pub end_time: Option<DateTime<Utc>>,
    /// Final outcome, set on completion
    pub result: Option<MatchResult>,
}

impl ActiveMatch {
    /// Both participant ids.
    pub fn player_ids(&self) -> [PlayerId; 2] {
        [self.player1.id, self.player2.id]
    }

    /// True if the given player takes part in this match.
    pub fn involves(&self, player: PlayerId) -> bool {
        self.player1.id == player || self.player2.id == player
    }
}
