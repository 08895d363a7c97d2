//! Boundary to the external game-play engine.
//!
//! The coordinator only starts a session and later collects a result keyed
//! by the session id; waiting for player decisions happens inside the
//! external engine, never here.

use async_trait::async_trait;
use uuid::Uuid;

use super::models::{PlayerSnapshot, SessionId};
use crate::tournament::config::GameConfig;

/// Error from the external game-play engine.
#[derive(Debug, thiserror::Error)]
#[error("Game session error: {0}")]
pub struct SessionError(pub String);

/// Starts game-play sessions for individual matches.
///
/// Implementations wrap whatever transport reaches the real game engine.
/// The engine reports completion asynchronously through the coordinator's
/// completion path, keyed by the [`SessionId`] returned here.
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    /// Start a session for the two players and return its handle.
    async fn start_session(
        &self,
        player1: &PlayerSnapshot,
        player2: &PlayerSnapshot,
        config: &GameConfig,
    ) -> Result<SessionId, SessionError>;
}

/// In-process launcher that mints session handles without talking to any
/// external engine. Default for tests and demos.
#[derive(Debug, Default, Clone)]
pub struct LocalSessionLauncher;

#[async_trait]
impl SessionLauncher for LocalSessionLauncher {
    async fn start_session(
        &self,
        _player1: &PlayerSnapshot,
        _player2: &PlayerSnapshot,
        _config: &GameConfig,
    ) -> Result<SessionId, SessionError> {
        Ok(Uuid::new_v4())
    }
}
