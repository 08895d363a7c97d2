//! Quick Tournament Example
//!
//! Runs a 4-player single elimination tournament end to end, simulating
//! the game sessions and printing progress as notifications arrive.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use dilemma_arena::coordinator::models::{DecisionCounts, MatchStatistics, PlayerSnapshot};
use dilemma_arena::service::TournamentNotification;
use dilemma_arena::{
    LobbyInfo, LobbyPlayer, LocalSessionLauncher, MatchId, MatchResult, TournamentDirectory,
    TournamentFormat, TournamentSettings,
};

/// Simulate a finished 10-round game. Player 1 cooperates more and still
/// takes the match.
fn simulate_game(match_id: MatchId, player1: &PlayerSnapshot, player2: &PlayerSnapshot) -> MatchResult {
    MatchResult {
        match_id,
        player1_id: player1.id,
        player2_id: player2.id,
        winner_id: player1.id,
        loser_id: player2.id,
        player1_score: 24,
        player2_score: 18,
        statistics: MatchStatistics {
            rounds_played: 10,
            player1_decisions: DecisionCounts {
                cooperations: 7,
                betrayals: 3,
            },
            player2_decisions: DecisionCounts {
                cooperations: 4,
                betrayals: 6,
            },
            duration_secs: 95,
        },
        forfeit: false,
        completed_at: Utc::now(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("=== Quick Tournament Example ===\n");

    let lobby = LobbyInfo {
        lobby_id: Uuid::new_v4(),
        format: TournamentFormat::SingleElimination,
        players: ["Alice", "Bob", "Charlie", "Diana"]
            .iter()
            .enumerate()
            .map(|(i, name)| LobbyPlayer {
                id: Uuid::new_v4(),
                name: (*name).to_string(),
                is_host: i == 0,
            })
            .collect(),
    };

    let directory = TournamentDirectory::new(
        TournamentSettings::default(),
        Arc::new(LocalSessionLauncher),
    );
    let (tournament, handle) = directory
        .create_tournament(lobby)
        .await
        .map_err(|e| anyhow::anyhow!(e))?;
    println!(
        "Created tournament {} with {} players over {} rounds\n",
        tournament.id,
        tournament.players.len(),
        tournament.total_rounds
    );

    let (_subscriber_id, mut notifications) = handle
        .subscribe(32)
        .await
        .map_err(|e| anyhow::anyhow!(e))?;

    handle
        .start()
        .await
        .map_err(|e| anyhow::anyhow!(e))?
        .map_err(|e| anyhow::anyhow!(e))?;

    // Drive the tournament by answering every MatchReady with a simulated
    // game result until the champion is decided.
    while let Some(notification) = notifications.recv().await {
        match &notification {
            TournamentNotification::RoundStarted { round, pairings, .. } => {
                println!("Round {} started with {} pairing(s)", round, pairings.len());
            }
            TournamentNotification::MatchReady {
                match_id,
                round,
                player1,
                player2,
                ..
            } => {
                println!(
                    "  Match {}: {} vs {} (round {})",
                    match_id, player1.name, player2.name, round
                );
                let result = simulate_game(*match_id, player1, player2);
                handle
                    .submit_result(*match_id, result)
                    .await
                    .map_err(|e| anyhow::anyhow!(e))?
                    .map_err(|e| anyhow::anyhow!(e))?;
            }
            TournamentNotification::MatchCompleted {
                match_id, winner_id, ..
            } => {
                println!("  Match {} won by {}", match_id, winner_id);
            }
            TournamentNotification::TournamentCompleted { winner_id, .. } => {
                println!("\nTournament complete! Champion: {}", winner_id);
                // The tagged payload shape the notification transport forwards.
                println!(
                    "Outbound payload: {}",
                    serde_json::to_string_pretty(&notification)?
                );
                break;
            }
        }
    }

    println!("\nFinal standings:");
    for ranking in handle.rankings().await.map_err(|e| anyhow::anyhow!(e))? {
        println!(
            "  #{} {} - {} pts, {}/{} matches won, {:.0}% cooperation",
            ranking.rank,
            ranking.name,
            ranking.tournament_points,
            ranking.matches_won,
            ranking.matches_played,
            ranking.cooperation_rate * 100.0
        );
    }

    if let Some(highlights) = handle.highlights().await.map_err(|e| anyhow::anyhow!(e))? {
        println!("\nHighlights:");
        if let Some(id) = highlights.most_cooperative {
            println!("  Most cooperative: {}", id);
        }
        if let Some(id) = highlights.mvp {
            println!("  MVP: {}", id);
        }
        println!(
            "  Overall cooperation rate: {:.0}%",
            highlights.overall_cooperation_rate * 100.0
        );
    }

    Ok(())
}
