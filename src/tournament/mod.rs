//! Tournament module for bracket-based cooperate/betray competitions.
//!
//! This module provides tournament management functionality including:
//! - Bracket generation for single elimination, double elimination,
//!   and round robin formats
//! - Tournament lifecycle (create, start, advance rounds, complete)
//! - Match result ingestion with duplicate-delivery protection
//! - Player elimination tracking and forfeit handling
//!
//! ## Example
//!
//! ```no_run
//! use dilemma_arena::tournament::{
//!     LobbyInfo, LobbyPlayer, TournamentEngine, TournamentFormat, TournamentSettings,
//! };
//! use uuid::Uuid;
//!
//! let mut engine = TournamentEngine::new(TournamentSettings::default());
//! let lobby = LobbyInfo {
//!     lobby_id: Uuid::new_v4(),
//!     format: TournamentFormat::SingleElimination,
//!     players: (0..4)
//!         .map(|i| LobbyPlayer {
//!             id: Uuid::new_v4(),
//!             name: format!("player-{i}"),
//!             is_host: i == 0,
//!         })
//!         .collect(),
//! };
//!
//! let tournament = engine.create_tournament(lobby)?;
//! engine.start_tournament(tournament.id)?;
//! # Ok::<(), dilemma_arena::tournament::TournamentError>(())
//! ```

pub mod bracket;
pub mod config;
pub mod engine;
pub mod errors;
pub mod models;

pub use bracket::{Bracket, MatchPairing, Round, MIN_PLAYERS};
pub use config::{ForfeitPolicy, GameConfig, TournamentSettings};
pub use engine::TournamentEngine;
pub use errors::{TournamentError, TournamentResult};
pub use models::{
    LobbyInfo, LobbyPlayer, PlayerId, PlayerStatistics, PlayerStatus, Tournament,
    TournamentFormat, TournamentId, TournamentPlayer, TournamentStatus, TournamentUpdate,
};
