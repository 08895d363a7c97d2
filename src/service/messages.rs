//! Tournament actor message types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::coordinator::models::{ActiveMatch, MatchId, MatchResult, PlayerSnapshot};
use crate::stats::models::{PlayerRanking, TournamentHighlights};
use crate::tournament::bracket::MatchPairing;
use crate::tournament::errors::TournamentResult;
use crate::tournament::models::{PlayerId, Tournament, TournamentId, TournamentUpdate};

/// Messages that can be sent to a TournamentActor
#[derive(Debug)]
pub enum TournamentMessage {
    /// Start the tournament and dispatch the opening matches
    Start {
        response: oneshot::Sender<TournamentResult<TournamentUpdate>>,
    },

    /// Dispatch as many queued pairings as the concurrency cap allows
    DispatchMatches {
        response: oneshot::Sender<TournamentResult<Vec<ActiveMatch>>>,
    },

    /// Submit a completed match result
    SubmitResult {
        match_id: MatchId,
        result: MatchResult,
        response: oneshot::Sender<TournamentResult<Option<TournamentUpdate>>>,
    },

    /// Report a player forfeiting an active match
    SubmitForfeit {
        match_id: MatchId,
        forfeiting_player: PlayerId,
        response: oneshot::Sender<TournamentResult<Option<TournamentUpdate>>>,
    },

    /// Get a snapshot of the tournament state
    GetStatus {
        response: oneshot::Sender<Option<Tournament>>,
    },

    /// Get current rankings
    GetRankings {
        response: oneshot::Sender<Vec<PlayerRanking>>,
    },

    /// Get the highlight summary
    GetHighlights {
        response: oneshot::Sender<Option<TournamentHighlights>>,
    },

    /// Subscribe to tournament notifications
    Subscribe {
        subscriber_id: Uuid,
        sender: mpsc::Sender<TournamentNotification>,
    },

    /// Unsubscribe from tournament notifications
    Unsubscribe { subscriber_id: Uuid },

    /// Shut the actor down
    Shutdown { response: oneshot::Sender<()> },
}

/// Notification pushed to subscribers as the tournament progresses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TournamentNotification {
    /// A match has been created and its game session started
    MatchReady {
        tournament_id: TournamentId,
        match_id: MatchId,
        round: u32,
        player1: PlayerSnapshot,
        player2: PlayerSnapshot,
        estimated_start: DateTime<Utc>,
    },

    /// A match result was applied
    MatchCompleted {
        tournament_id: TournamentId,
        match_id: MatchId,
        winner_id: PlayerId,
        loser_id: PlayerId,
        round: u32,
    },

    /// A new round opened
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

impl TournamentNotification {
    /// Derive the subscriber-facing notification for an engine update.
    pub fn from_update(update: &TournamentUpdate) -> Self {
        match update {
            TournamentUpdate::MatchResult {
                tournament_id,
                match_id,
                winner_id,
                loser_id,
                round,
            } => Self::MatchCompleted {
                tournament_id: *tournament_id,
                match_id: *match_id,
                winner_id: *winner_id,
                loser_id: *loser_id,
                round: *round,
            },
            TournamentUpdate::RoundStarted {
                tournament_id,
                round,
                pairings,
            } => Self::RoundStarted {
                tournament_id: *tournament_id,
                round: *round,
                pairings: pairings.clone(),
            },
            TournamentUpdate::TournamentCompleted {
                tournament_id,
                winner_id,
            } => Self::TournamentCompleted {
                tournament_id: *tournament_id,
                winner_id: *winner_id,
            },
        }
    }
}
