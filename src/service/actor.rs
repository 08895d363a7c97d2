//! Tournament actor with async message handling.
//!
//! Each tournament runs in its own Tokio task that owns the engine state
//! and coordinator for that tournament. All mutation flows through the
//! message inbox, so bracket updates, result processing, and match
//! dispatch are serialized per tournament with no locks.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use super::messages::{TournamentMessage, TournamentNotification};
use crate::coordinator::manager::MatchCoordinator;
use crate::coordinator::models::{ActiveMatch, MatchId, MatchResult};
use crate::coordinator::session::SessionLauncher;
use crate::stats;
use crate::tournament::config::TournamentSettings;
use crate::tournament::engine::TournamentEngine;
use crate::tournament::errors::{TournamentError, TournamentResult};
use crate::tournament::models::{
    LobbyInfo, PlayerId, Tournament, TournamentId, TournamentUpdate,
};

const INBOX_CAPACITY: usize = 100;

/// Tournament actor handle for sending messages
#[derive(Clone, Debug)]
pub struct TournamentHandle {
    sender: mpsc::Sender<TournamentMessage>,
    tournament_id: TournamentId,
}

impl TournamentHandle {
    /// Get tournament ID
    pub fn tournament_id(&self) -> TournamentId {
        self.tournament_id
    }

    /// Send a message to the tournament actor
    pub async fn send(&self, message: TournamentMessage) -> Result<(), String> {
        self.sender
            .send(message)
            .await
            .map_err(|_| "Tournament actor is closed".to_string())
    }

    /// Start the tournament.
    pub async fn start(&self) -> Result<TournamentResult<TournamentUpdate>, String> {
        let (tx, rx) = oneshot::channel();
        self.send(TournamentMessage::Start { response: tx }).await?;
        rx.await.map_err(|_| "Tournament actor dropped".to_string())
    }

    /// Dispatch as many queued matches as the concurrency cap allows.
    pub async fn dispatch_matches(&self) -> Result<TournamentResult<Vec<ActiveMatch>>, String> {
        let (tx, rx) = oneshot::channel();
        self.send(TournamentMessage::DispatchMatches { response: tx })
            .await?;
        rx.await.map_err(|_| "Tournament actor dropped".to_string())
    }

    /// Submit a completed match result.
    pub async fn submit_result(
        &self,
        match_id: MatchId,
        result: MatchResult,
    ) -> Result<TournamentResult<Option<TournamentUpdate>>, String> {
        let (tx, rx) = oneshot::channel();
        self.send(TournamentMessage::SubmitResult {
            match_id,
            result,
            response: tx,
        })
        .await?;
        rx.await.map_err(|_| "Tournament actor dropped".to_string())
    }

    /// Report a forfeit.
    pub async fn submit_forfeit(
        &self,
        match_id: MatchId,
        forfeiting_player: PlayerId,
    ) -> Result<TournamentResult<Option<TournamentUpdate>>, String> {
        let (tx, rx) = oneshot::channel();
        self.send(TournamentMessage::SubmitForfeit {
            match_id,
            forfeiting_player,
            response: tx,
        })
        .await?;
        rx.await.map_err(|_| "Tournament actor dropped".to_string())
    }

    /// Snapshot of the tournament state. `None` once the actor has shed it.
    pub async fn status(&self) -> Result<Option<Tournament>, String> {
        let (tx, rx) = oneshot::channel();
        self.send(TournamentMessage::GetStatus { response: tx })
            .await?;
        rx.await.map_err(|_| "Tournament actor dropped".to_string())
    }

    /// Current rankings, best first.
    pub async fn rankings(&self) -> Result<Vec<stats::models::PlayerRanking>, String> {
        let (tx, rx) = oneshot::channel();
        self.send(TournamentMessage::GetRankings { response: tx })
            .await?;
        rx.await.map_err(|_| "Tournament actor dropped".to_string())
    }

    /// Highlight summary.
    pub async fn highlights(&self) -> Result<Option<stats::models::TournamentHighlights>, String> {
        let (tx, rx) = oneshot::channel();
        self.send(TournamentMessage::GetHighlights { response: tx })
            .await?;
        rx.await.map_err(|_| "Tournament actor dropped".to_string())
    }

    /// Subscribe to notifications. Returns the subscriber id and the
    /// receiving end of the notification channel.
    pub async fn subscribe(
        &self,
        buffer: usize,
    ) -> Result<(Uuid, mpsc::Receiver<TournamentNotification>), String> {
        let subscriber_id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(buffer);
        self.send(TournamentMessage::Subscribe {
            subscriber_id,
            sender: tx,
        })
        .await?;
        Ok((subscriber_id, rx))
    }

    /// Drop a subscription.
    pub async fn unsubscribe(&self, subscriber_id: Uuid) -> Result<(), String> {
        self.send(TournamentMessage::Unsubscribe { subscriber_id })
            .await
    }

    /// Shut the actor down, waiting for it to acknowledge.
    pub async fn shutdown(&self) -> Result<(), String> {
        let (tx, rx) = oneshot::channel();
        self.send(TournamentMessage::Shutdown { response: tx })
            .await?;
        rx.await.map_err(|_| "Tournament actor dropped".to_string())
    }
}

/// Tournament actor managing a single tournament
pub struct TournamentActor {
    /// Tournament ID
    id: TournamentId,

    /// Engine state for this tournament
    engine: TournamentEngine,

    /// Match coordinator for this tournament
    coordinator: MatchCoordinator,

    /// Message inbox
    inbox: mpsc::Receiver<TournamentMessage>,

    /// Subscribers for progress notifications
    subscribers: HashMap<Uuid, mpsc::Sender<TournamentNotification>>,

    /// Set once Shutdown is received or the tournament completes
    is_closed: bool,
}

impl TournamentActor {
    /// Create a tournament from a lobby and wrap it in an actor.
    ///
    /// # Returns
    ///
    /// * `(TournamentActor, TournamentHandle, Tournament)` - Actor, handle
    ///   for sending messages, and the initial tournament snapshot
    pub fn new(
        lobby: LobbyInfo,
        settings: TournamentSettings,
        launcher: Arc<dyn SessionLauncher>,
    ) -> TournamentResult<(Self, TournamentHandle, Tournament)> {
        let (sender, inbox) = mpsc::channel(INBOX_CAPACITY);

        let mut engine = TournamentEngine::new(settings);
        let tournament = engine.create_tournament(lobby)?;
        let coordinator = MatchCoordinator::new(launcher);

        let actor = Self {
            id: tournament.id,
            engine,
            coordinator,
            inbox,
            subscribers: HashMap::new(),
            is_closed: false,
        };
        let handle = TournamentHandle {
            sender,
            tournament_id: tournament.id,
        };

        Ok((actor, handle, tournament))
    }

    /// Run the tournament actor event loop
    pub async fn run(mut self) {
        log::info!("Tournament actor {} starting", self.id);

        while let Some(message) = self.inbox.recv().await {
            self.handle_message(message).await;
            if self.is_closed {
                break;
            }
        }

        log::info!("Tournament actor {} closed", self.id);
    }

    async fn handle_message(&mut self, message: TournamentMessage) {
        match message {
            TournamentMessage::Start { response } => {
                let result = self.handle_start().await;
                let _ = response.send(result);
            }

            TournamentMessage::DispatchMatches { response } => {
                let result = self.dispatch_matches().await;
                let _ = response.send(result);
            }

            TournamentMessage::SubmitResult {
                match_id,
                result,
                response,
            } => {
                let outcome = self.handle_result(match_id, result).await;
                let _ = response.send(outcome);
            }

            TournamentMessage::SubmitForfeit {
                match_id,
                forfeiting_player,
                response,
            } => {
                let outcome = self.handle_forfeit(match_id, forfeiting_player).await;
                let _ = response.send(outcome);
            }

            TournamentMessage::GetStatus { response } => {
                let _ = response.send(self.engine.get_tournament_status(self.id));
            }

            TournamentMessage::GetRankings { response } => {
                let rankings = self
                    .engine
                    .get_tournament_status(self.id)
                    .map(|t| stats::engine::rankings(&t))
                    .unwrap_or_default();
                let _ = response.send(rankings);
            }

            TournamentMessage::GetHighlights { response } => {
                let highlights = self
                    .engine
                    .get_tournament_status(self.id)
                    .map(|t| stats::engine::highlights(&t));
                let _ = response.send(highlights);
            }

            TournamentMessage::Subscribe {
                subscriber_id,
                sender,
            } => {
                self.subscribers.insert(subscriber_id, sender);
                log::debug!(
                    "Subscriber {} joined tournament {} notifications",
                    subscriber_id,
                    self.id
                );
            }

            TournamentMessage::Unsubscribe { subscriber_id } => {
                self.subscribers.remove(&subscriber_id);
                log::debug!(
                    "Subscriber {} left tournament {} notifications",
                    subscriber_id,
                    self.id
                );
            }

            TournamentMessage::Shutdown { response } => {
                self.is_closed = true;
                let _ = response.send(());
            }
        }
    }

    /// Broadcast a notification to all subscribers
    fn notify(&mut self, notification: TournamentNotification) {
        self.subscribers.retain(|subscriber_id, sender| {
            match sender.try_send(notification.clone()) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    log::warn!(
                        "Subscriber {} channel full, dropping notification",
                        subscriber_id
                    );
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    log::debug!("Subscriber {} disconnected, removing", subscriber_id);
                    false
                }
            }
        });
    }

    async fn handle_start(&mut self) -> TournamentResult<TournamentUpdate> {
        let update = self.engine.start_tournament(self.id)?;
        self.notify(TournamentNotification::from_update(&update));
        self.dispatch_matches().await?;
        Ok(update)
    }

    /// Queue the current round's undispatched pairings and start every
    /// match the concurrency cap allows.
    async fn dispatch_matches(&mut self) -> TournamentResult<Vec<ActiveMatch>> {
        let pending = self.engine.take_next_matches(self.id)?;
        if !pending.is_empty() {
            self.coordinator.queue_pairings(self.id, pending);
        }
        let tournament = self
            .engine
            .get_tournament_status(self.id)
            .ok_or(TournamentError::NotFound(self.id))?;
        let max_concurrent = self.engine.settings().max_concurrent_matches;
        let batch = self
            .coordinator
            .next_available_matches(&tournament, max_concurrent);

        let mut started = Vec::with_capacity(batch.len());
        let game = self.engine.settings().game.clone();
        for pairing in batch {
            let record = self
                .engine
                .create_active_match(self.id, &pairing, &mut self.coordinator)?;
            let record = self.coordinator.start_match(record.id, &game).await
                .map_err(TournamentError::from)?;
            self.notify(TournamentNotification::MatchReady {
                tournament_id: self.id,
                match_id: record.id,
                round: record.round_number,
                player1: record.player1.clone(),
                player2: record.player2.clone(),
                estimated_start: record.start_time.unwrap_or_else(Utc::now),
            });
            started.push(record);
        }
        Ok(started)
    }

    async fn handle_result(
        &mut self,
        match_id: MatchId,
        result: MatchResult,
    ) -> TournamentResult<Option<TournamentUpdate>> {
        let completed = self
            .coordinator
            .complete_match(match_id, result)
            .map_err(TournamentError::from)?;
        let Some(completed) = completed else {
            // No active match. A duplicate of an applied result is fine,
            // anything else is unknown.
            if self.engine.result_applied(self.id, match_id) {
                return Ok(None);
            }
            return Err(TournamentError::MatchNotFound(match_id));
        };

        let result = completed
            .record
            .result
            .clone()
            .ok_or(TournamentError::MatchNotFound(match_id))?;
        let update = self.engine.process_match_result(&completed.record, &result)?;
        // The engine reports the strongest transition only; subscribers
        // still get the match completion when a round or the tournament
        // closed on the back of it.
        if matches!(
            update,
            Some(TournamentUpdate::RoundStarted { .. })
                | Some(TournamentUpdate::TournamentCompleted { .. })
        ) {
            self.notify(TournamentNotification::MatchCompleted {
                tournament_id: self.id,
                match_id: result.match_id,
                winner_id: result.winner_id,
                loser_id: result.loser_id,
                round: completed.record.round_number,
            });
        }
        self.after_update(update.as_ref()).await?;
        Ok(update)
    }

    async fn handle_forfeit(
        &mut self,
        match_id: MatchId,
        forfeiting_player: PlayerId,
    ) -> TournamentResult<Option<TournamentUpdate>> {
        let update =
            self.engine
                .process_forfeit(self.id, match_id, forfeiting_player, &mut self.coordinator)?;
        self.after_update(update.as_ref()).await?;
        Ok(update)
    }

    /// Publish an update and keep the tournament moving: dispatch follow-up
    /// matches, or clean up when it just completed.
    async fn after_update(&mut self, update: Option<&TournamentUpdate>) -> TournamentResult<()> {
        if let Some(update) = update {
            self.notify(TournamentNotification::from_update(update));
        }
        let completed = matches!(update, Some(TournamentUpdate::TournamentCompleted { .. }));
        if completed {
            self.coordinator.remove_tournament(self.id);
        } else {
            self.dispatch_matches().await?;
        }
        Ok(())
    }
}
