//! Tournament directory for spawning and managing tournament actors.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::actor::{TournamentActor, TournamentHandle};
use crate::coordinator::session::SessionLauncher;
use crate::tournament::config::TournamentSettings;
use crate::tournament::errors::TournamentResult;
use crate::tournament::models::{LobbyInfo, Tournament, TournamentId};

/// Tournament directory managing multiple tournament actors
pub struct TournamentDirectory {
    /// Settings applied to every tournament this directory creates
    settings: TournamentSettings,

    /// Session launcher shared by all tournaments
    launcher: Arc<dyn SessionLauncher>,

    /// Active tournament handles
    tournaments: Arc<RwLock<HashMap<TournamentId, TournamentHandle>>>,
}

impl TournamentDirectory {
    /// Create a new tournament directory
    pub fn new(settings: TournamentSettings, launcher: Arc<dyn SessionLauncher>) -> Self {
        Self {
            settings,
            launcher,
            tournaments: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a tournament from a lobby and spawn its actor.
    ///
    /// # Returns
    ///
    /// * `(Tournament, TournamentHandle)` - Initial snapshot and the
    ///   handle for driving the tournament
    pub async fn create_tournament(
        &self,
        lobby: LobbyInfo,
    ) -> TournamentResult<(Tournament, TournamentHandle)> {
        let (actor, handle, tournament) =
            TournamentActor::new(lobby, self.settings.clone(), self.launcher.clone())?;

        {
            let mut tournaments = self.tournaments.write().await;
            tournaments.insert(tournament.id, handle.clone());
        }

        tokio::spawn(async move {
            actor.run().await;
        });

        log::info!("Tournament {} registered in directory", tournament.id);
        Ok((tournament, handle))
    }

    /// Look up a tournament handle by id.
    pub async fn get(&self, id: TournamentId) -> Option<TournamentHandle> {
        self.tournaments.read().await.get(&id).cloned()
    }

    /// Ids of every registered tournament.
    pub async fn tournament_ids(&self) -> Vec<TournamentId> {
        self.tournaments.read().await.keys().copied().collect()
    }

    /// Number of registered tournaments.
    pub async fn len(&self) -> usize {
        self.tournaments.read().await.len()
    }

    /// True when no tournaments are registered.
    pub async fn is_empty(&self) -> bool {
        self.tournaments.read().await.is_empty()
    }

    /// Shut a tournament down and drop it from the directory.
    pub async fn remove(&self, id: TournamentId) -> bool {
        let handle = {
            let mut tournaments = self.tournaments.write().await;
            tournaments.remove(&id)
        };
        match handle {
            Some(handle) => {
                // Best effort; the actor may already be gone.
                if let Err(e) = handle.shutdown().await {
                    log::debug!("Tournament {} shutdown: {}", id, e);
                }
                log::info!("Tournament {} removed from directory", id);
                true
            }
            None => false,
        }
    }
}
