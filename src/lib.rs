//! # Dilemma Arena
//!
//! A tournament engine for two-player cooperate/betray games.
//!
//! This library turns a lobby of players into a running tournament:
//! brackets are generated up front, matches are queued and dispatched
//! under a concurrency cap, results feed player statistics and round
//! progression, and a champion falls out the other end.
//!
//! ## Formats
//!
//! - **Single elimination**: lose once and you are out; byes fill the
//!   bracket to a power of two
//! - **Double elimination**: two losses to go out, with survivors paired
//!   within their loss-count group until the grand final
//! - **Round robin**: everyone plays everyone, fully precomputed via the
//!   circle method; points and head-to-head records decide the winner
//!
//! ## Core Modules
//!
//! - [`tournament`]: brackets, tournament lifecycle, and result processing
//! - [`coordinator`]: active-match registry, dispatch queue, and session seam
//! - [`stats`]: rankings, tie-breaks, and the highlight summary
//! - [`service`]: per-tournament async actors and the directory
//!
//! ## Example
//!
//! ```no_run
//! use dilemma_arena::{
//!     LobbyInfo, LobbyPlayer, TournamentEngine, TournamentFormat, TournamentSettings,
//! };
//! use uuid::Uuid;
//!
//! let mut engine = TournamentEngine::new(TournamentSettings::default());
//! let lobby = LobbyInfo {
//!     lobby_id: Uuid::new_v4(),
//!     format: TournamentFormat::RoundRobin,
//!     players: (0..4)
//!         .map(|i| LobbyPlayer {
//!             id: Uuid::new_v4(),
//!             name: format!("player-{i}"),
//!             is_host: i == 0,
//!         })
//!         .collect(),
//! };
//! let tournament = engine.create_tournament(lobby)?;
//! engine.start_tournament(tournament.id)?;
//! # Ok::<(), dilemma_arena::TournamentError>(())
//! ```

/// Match coordination between tournaments and game sessions.
pub mod coordinator;
pub use coordinator::{
    ActiveMatch, LocalSessionLauncher, MatchCoordinator, MatchId, MatchResult, MatchStatus,
    SessionLauncher,
};

/// Rankings, head-to-head records, and highlights.
pub mod stats;
pub use stats::{PlayerRanking, TournamentHighlights};

/// Brackets, tournament lifecycle, and result processing.
pub mod tournament;
pub use tournament::{
    ForfeitPolicy, GameConfig, LobbyInfo, LobbyPlayer, MatchPairing, PlayerId, Tournament,
    TournamentEngine, TournamentError, TournamentFormat, TournamentId, TournamentResult,
    TournamentSettings, TournamentStatus, TournamentUpdate,
};

/// Per-tournament async actors and the directory that spawns them.
pub mod service;
pub use service::{TournamentDirectory, TournamentHandle, TournamentNotification};
