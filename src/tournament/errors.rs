//! Tournament engine error taxonomy.
//!
//! Validation errors are raised synchronously at creation time with no
//! partial mutation; state errors leave existing state intact so the caller
//! can inspect and retry; not-found errors come from mutating operations
//! only (read-only status queries return `None` instead).

use thiserror::Error;
use uuid::Uuid;

use super::models::{PlayerId, TournamentId, TournamentStatus};
use crate::coordinator::manager::CoordinatorError;

/// Tournament engine errors
#[derive(Debug, Error)]
pub enum TournamentError {
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Insufficient players: need {needed}, have {current}")]
    InsufficientPlayers { needed: usize, current: usize },

    #[error("Duplicate player {0} in roster")]
    DuplicatePlayer(PlayerId),

    #[error("Malformed pairing for round {round}: {reason}")]
    MalformedPairing { round: u32, reason: String },

    #[error("Tournament not found: {0}")]
    NotFound(TournamentId),

    #[error("Match not found: {0}")]
    MatchNotFound(Uuid),

    #[error("Tournament not in correct state: expected {expected:?}, got {actual:?}")]
    InvalidState {
        expected: TournamentStatus,
        actual: TournamentStatus,
    },

    #[error("Player {0} is not in this tournament")]
    PlayerNotInTournament(PlayerId),

    #[error(transparent)]
    Coordinator(#[from] CoordinatorError),
}

pub type TournamentResult<T> = Result<T, TournamentError>;
