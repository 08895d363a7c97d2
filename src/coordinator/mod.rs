//! Match coordinator module bridging tournaments and game sessions.
//!
//! This module implements:
//! - MatchCoordinator: active-match registry and lifecycle transitions
//! - MatchQueue: per-tournament FIFO with conflict-free, cap-bounded dispatch
//! - SessionLauncher: seam for starting real game sessions
//!
//! The coordinator never mutates a `Tournament`. It validates against a
//! borrowed roster and returns completed records for the tournament engine
//! to apply, which keeps every roster transition in one place.
//!
//! ## Example
//!
//! ```ignore
//! use dilemma_arena::coordinator::{LocalSessionLauncher, MatchCoordinator};
//! use std::sync::Arc;
//!
//! let mut coordinator = MatchCoordinator::new(Arc::new(LocalSessionLauncher));
//! coordinator.queue_pairings(tournament.id, pairings);
//! for pairing in coordinator.next_available_matches(&tournament, 4) {
//!     let record = coordinator.create_match(&pairing, &tournament)?;
//!     coordinator.start_match(record.id, &config).await?;
//! }
//! ```

pub mod manager;
pub mod models;
pub mod queue;
pub mod session;

pub use manager::{
    CompletedMatch, CoordinatorError, CoordinatorResult, ForfeitOutcome, MatchCoordinator,
};
pub use models::{
    ActiveMatch, DecisionCounts, MatchId, MatchResult, MatchStatistics, MatchStatus,
    PlayerSnapshot, SessionId,
};
pub use queue::{schedule_waves, MatchQueue};
pub use session::{LocalSessionLauncher, SessionError, SessionLauncher};
