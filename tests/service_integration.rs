//! Integration tests for the tournament actor service
//!
//! These tests run tournaments through the directory and actor handles,
//! answering MatchReady notifications with simulated results the way a
//! game server would.

use std::sync::Arc;

use chrono::Utc;
use tokio::time::{timeout, Duration};
use uuid::Uuid;

use dilemma_arena::coordinator::models::{DecisionCounts, MatchStatistics, PlayerSnapshot};
use dilemma_arena::service::TournamentNotification;
use dilemma_arena::{
    LobbyInfo, LobbyPlayer, LocalSessionLauncher, MatchId, MatchResult, TournamentDirectory,
    TournamentFormat, TournamentSettings,
};

fn lobby(format: TournamentFormat, names: &[&str]) -> LobbyInfo {
    LobbyInfo {
        lobby_id: Uuid::new_v4(),
        format,
        players: names
            .iter()
            .enumerate()
            .map(|(i, name)| LobbyPlayer {
                id: Uuid::new_v4(),
                name: (*name).to_string(),
                is_host: i == 0,
            })
            .collect(),
    }
}

fn directory() -> TournamentDirectory {
    TournamentDirectory::new(TournamentSettings::default(), Arc::new(LocalSessionLauncher))
}

/// The alphabetically earlier name wins every simulated game.
fn simulate(match_id: MatchId, player1: &PlayerSnapshot, player2: &PlayerSnapshot) -> MatchResult {
    let p1_wins = player1.name <= player2.name;
    let (winner_id, loser_id) = if p1_wins {
        (player1.id, player2.id)
    } else {
        (player2.id, player1.id)
    };
    MatchResult {
        match_id,
        player1_id: player1.id,
        player2_id: player2.id,
        winner_id,
        loser_id,
        player1_score: if p1_wins { 25 } else { 13 },
        player2_score: if p1_wins { 13 } else { 25 },
        statistics: MatchStatistics {
            rounds_played: 10,
            player1_decisions: DecisionCounts {
                cooperations: 6,
                betrayals: 4,
            },
            player2_decisions: DecisionCounts {
                cooperations: 5,
                betrayals: 5,
            },
            duration_secs: 61,
        },
        forfeit: false,
        completed_at: Utc::now(),
    }
}

#[tokio::test]
async fn test_actor_runs_tournament_to_completion() {
    let directory = directory();
    let (tournament, handle) = directory
        .create_tournament(lobby(
            TournamentFormat::SingleElimination,
            &["Alice", "Bob", "Charlie", "Diana"],
        ))
        .await
        .unwrap();

    let (_sub, mut notifications) = handle.subscribe(64).await.unwrap();
    handle.start().await.unwrap().unwrap();

    let mut rounds_seen = Vec::new();
    let mut matches_completed = 0u32;
    let winner_id = loop {
        let notification = timeout(Duration::from_secs(5), notifications.recv())
            .await
            .expect("notification within deadline")
            .expect("channel open");
        match notification {
            TournamentNotification::MatchReady {
                match_id,
                player1,
                player2,
                ..
            } => {
                let result = simulate(match_id, &player1, &player2);
                handle.submit_result(match_id, result).await.unwrap().unwrap();
            }
            TournamentNotification::MatchCompleted { .. } => {
                matches_completed += 1;
            }
            TournamentNotification::RoundStarted { round, .. } => {
                rounds_seen.push(round);
            }
            TournamentNotification::TournamentCompleted { winner_id, .. } => break winner_id,
        }
    };

    assert_eq!(rounds_seen, vec![1, 2]);
    assert_eq!(matches_completed, 3);

    let snapshot = handle.status().await.unwrap().expect("state retained");
    assert!(snapshot.is_completed());
    assert_eq!(snapshot.winner, Some(winner_id));
    let champion = snapshot.player(winner_id).unwrap();
    assert_eq!(champion.name, "Alice");
    assert_eq!(tournament.id, snapshot.id);

    let rankings = handle.rankings().await.unwrap();
    assert_eq!(rankings.len(), 4);
    assert_eq!(rankings[0].player_id, winner_id);
    assert_eq!(rankings[0].rank, 1);

    let highlights = handle.highlights().await.unwrap().expect("highlights");
    assert!(highlights.mvp.is_some());
    assert!(highlights.overall_cooperation_rate > 0.0);
}

#[tokio::test]
async fn test_duplicate_submission_through_actor_is_noop() {
    let directory = directory();
    let (_, handle) = directory
        .create_tournament(lobby(TournamentFormat::RoundRobin, &["a", "b", "c", "d"]))
        .await
        .unwrap();

    let (_sub, mut notifications) = handle.subscribe(64).await.unwrap();
    handle.start().await.unwrap().unwrap();

    // Take the first dispatched match and submit its result twice.
    let (match_id, result) = loop {
        let notification = timeout(Duration::from_secs(5), notifications.recv())
            .await
            .expect("notification within deadline")
            .expect("channel open");
        if let TournamentNotification::MatchReady {
            match_id,
            player1,
            player2,
            ..
        } = notification
        {
            break (match_id, simulate(match_id, &player1, &player2));
        }
    };

    let first = handle.submit_result(match_id, result.clone()).await.unwrap();
    assert!(first.unwrap().is_some());
    let second = handle.submit_result(match_id, result).await.unwrap();
    assert!(second.unwrap().is_none());

    let snapshot = handle.status().await.unwrap().expect("state retained");
    assert_eq!(snapshot.match_history.len(), 1);

    // A result for a match that never existed is rejected.
    let bogus = simulate(
        Uuid::new_v4(),
        &PlayerSnapshot {
            id: snapshot.players[0].id,
            name: snapshot.players[0].name.clone(),
        },
        &PlayerSnapshot {
            id: snapshot.players[1].id,
            name: snapshot.players[1].name.clone(),
        },
    );
    let rejected = handle.submit_result(bogus.match_id, bogus.clone()).await.unwrap();
    assert!(rejected.is_err());
}

#[tokio::test]
async fn test_directory_tracks_and_removes_tournaments() {
    let directory = directory();
    assert!(directory.is_empty().await);

    let (t1, _h1) = directory
        .create_tournament(lobby(TournamentFormat::RoundRobin, &["a", "b", "c", "d"]))
        .await
        .unwrap();
    let (t2, _h2) = directory
        .create_tournament(lobby(
            TournamentFormat::SingleElimination,
            &["e", "f", "g", "h"],
        ))
        .await
        .unwrap();

    assert_eq!(directory.len().await, 2);
    assert!(directory.get(t1.id).await.is_some());

    assert!(directory.remove(t1.id).await);
    assert!(!directory.remove(t1.id).await);
    assert_eq!(directory.len().await, 1);
    assert!(directory.get(t1.id).await.is_none());
    assert!(directory.get(t2.id).await.is_some());
}

#[tokio::test]
async fn test_too_small_lobby_rejected() {
    let directory = directory();
    let err = directory
        .create_tournament(lobby(TournamentFormat::SingleElimination, &["a", "b"]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        dilemma_arena::TournamentError::InsufficientPlayers { needed: 4, current: 2 }
    ));
    assert!(directory.is_empty().await);
}
