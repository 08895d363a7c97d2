//! Property-based tests for bracket generation and match scheduling
//!
//! These tests verify structural guarantees across a wide range of roster
//! sizes and outcome sequences: match counts per format, conflict-free
//! scheduling waves, and idempotent result application.

use std::collections::HashSet;

use chrono::Utc;
use proptest::prelude::*;
use uuid::Uuid;

use dilemma_arena::coordinator::models::{
    ActiveMatch, MatchStatistics, MatchStatus, PlayerSnapshot,
};
use dilemma_arena::coordinator::schedule_waves;
use dilemma_arena::tournament::bracket;
use dilemma_arena::{
    LobbyInfo, LobbyPlayer, MatchPairing, MatchResult, PlayerId, Tournament, TournamentEngine,
    TournamentFormat, TournamentSettings,
};

fn lobby(format: TournamentFormat, n: usize) -> LobbyInfo {
    LobbyInfo {
        lobby_id: Uuid::new_v4(),
        format,
        players: (0..n)
            .map(|i| LobbyPlayer {
                id: Uuid::new_v4(),
                name: format!("p{i:02}"),
                is_host: i == 0,
            })
            .collect(),
    }
}

/// Build the match record and result for a pairing without going through
/// a game session, picking the winner from one bit of the seed.
fn fabricate(
    tournament: &Tournament,
    pairing: &MatchPairing,
    seed: u64,
    flip: u32,
) -> (ActiveMatch, MatchResult) {
    let snapshot = |id: PlayerId| PlayerSnapshot {
        id,
        name: tournament.player(id).map(|p| p.name.clone()).unwrap_or_default(),
    };
    let record = ActiveMatch {
        id: Uuid::new_v4(),
        tournament_id: tournament.id,
        round_number: pairing.round_number,
        bracket_position: pairing.bracket_position,
        player1: snapshot(pairing.player1_id),
        player2: snapshot(pairing.player2_id),
        status: MatchStatus::Completed,
        game_session_id: None,
        start_time: None,
        end_time: None,
        result: None,
    };
    let p1_wins = (seed >> (flip % 64)) & 1 == 0;
    let (winner_id, loser_id) = if p1_wins {
        (pairing.player1_id, pairing.player2_id)
    } else {
        (pairing.player2_id, pairing.player1_id)
    };
    let result = MatchResult {
        match_id: record.id,
        player1_id: pairing.player1_id,
        player2_id: pairing.player2_id,
        winner_id,
        loser_id,
        player1_score: if p1_wins { 21 } else { 15 },
        player2_score: if p1_wins { 15 } else { 21 },
        statistics: MatchStatistics::default(),
        forfeit: false,
        completed_at: Utc::now(),
    };
    (record, result)
}

/// Play a tournament to completion with seed-driven outcomes, returning
/// the final state and the number of matches played.
fn play_out(format: TournamentFormat, n: usize, seed: u64) -> Tournament {
    let mut engine = TournamentEngine::new(TournamentSettings::default());
    let t = engine.create_tournament(lobby(format, n)).expect("create");
    engine.start_tournament(t.id).expect("start");

    let mut flip = 0u32;
    for _ in 0..512 {
        let snapshot = engine.get_tournament_status(t.id).expect("exists");
        if snapshot.is_completed() {
            return snapshot;
        }
        let pending = engine.get_next_matches(t.id).expect("pending");
        assert!(!pending.is_empty(), "in-progress tournament has no matches");
        for pairing in &pending {
            let snapshot = engine.get_tournament_status(t.id).expect("exists");
            let (record, result) = fabricate(&snapshot, pairing, seed, flip);
            flip += 1;
            engine
                .process_match_result(&record, &result)
                .expect("process");
        }
    }
    panic!("tournament did not complete");
}

proptest! {
    /// Single elimination plays exactly n - 1 matches and leaves exactly
    /// one player standing, whatever the outcomes.
    #[test]
    fn single_elimination_match_count(n in 4usize..=24, seed in any::<u64>()) {
        let done = play_out(TournamentFormat::SingleElimination, n, seed);
        prop_assert!(done.is_completed());
        prop_assert_eq!(done.match_history.len(), n - 1);
        prop_assert_eq!(done.remaining_players().len(), 1);
        prop_assert_eq!(done.winner, Some(done.remaining_players()[0].id));
    }

    /// Double elimination eliminates everyone but the champion with
    /// exactly two losses each.
    #[test]
    fn double_elimination_loss_counts(n in 4usize..=16, seed in any::<u64>()) {
        let done = play_out(TournamentFormat::DoubleElimination, n, seed);
        prop_assert!(done.is_completed());
        let winner = done.winner.expect("winner");
        for player in &done.players {
            if player.id == winner {
                prop_assert!(player.statistics.matches_lost < 2);
            } else {
                prop_assert!(player.is_eliminated);
                prop_assert_eq!(player.statistics.matches_lost, 2);
            }
        }
        // Every match after the first n was an elimination or a first
        // loss; total play is bounded by 2n - 1.
        prop_assert!(done.match_history.len() >= n - 1);
        prop_assert!(done.match_history.len() <= 2 * n - 1);
    }

    /// A round robin bracket contains every unordered pair exactly once,
    /// and no player appears twice within a round.
    #[test]
    fn round_robin_covers_all_pairs(n in 4usize..=16) {
        let players: Vec<PlayerId> = (0..n).map(|_| Uuid::new_v4()).collect();
        let bracket = bracket::generate(&players, TournamentFormat::RoundRobin).expect("generate");

        let mut seen: HashSet<(PlayerId, PlayerId)> = HashSet::new();
        for round in &bracket.rounds {
            let mut in_round: HashSet<PlayerId> = HashSet::new();
            for pairing in &round.pairings {
                prop_assert_ne!(pairing.player1_id, pairing.player2_id);
                prop_assert!(in_round.insert(pairing.player1_id));
                prop_assert!(in_round.insert(pairing.player2_id));
                let key = if pairing.player1_id < pairing.player2_id {
                    (pairing.player1_id, pairing.player2_id)
                } else {
                    (pairing.player2_id, pairing.player1_id)
                };
                prop_assert!(seen.insert(key), "pair scheduled twice");
            }
        }
        prop_assert_eq!(seen.len(), n * (n - 1) / 2);
    }

    /// Round robin completion: everyone plays n - 1 matches and the
    /// champion holds the point maximum.
    #[test]
    fn round_robin_everyone_plays_everyone(n in 4usize..=10, seed in any::<u64>()) {
        let done = play_out(TournamentFormat::RoundRobin, n, seed);
        prop_assert!(done.is_completed());
        prop_assert_eq!(done.match_history.len(), n * (n - 1) / 2);
        for player in &done.players {
            prop_assert!(!player.is_eliminated);
            prop_assert_eq!(player.statistics.matches_played as usize, n - 1);
        }
        let winner = done.winner.expect("winner");
        let top = done.players.iter().map(|p| p.statistics.tournament_points).max().unwrap();
        prop_assert_eq!(done.player(winner).unwrap().statistics.tournament_points, top);
    }

    /// Scheduling waves preserve every pairing, never exceed the cap, and
    /// never put one player in two matches of the same wave.
    #[test]
    fn schedule_waves_are_conflict_free(
        n_pairs in 1usize..=20,
        max_concurrent in 1usize..=6,
    ) {
        let pairings: Vec<MatchPairing> = (0..n_pairs)
            .map(|i| MatchPairing {
                player1_id: Uuid::new_v4(),
                player2_id: Uuid::new_v4(),
                round_number: 1,
                bracket_position: i as u32,
            })
            .collect();

        let waves = schedule_waves(&pairings, max_concurrent);
        let mut seen_positions = Vec::new();
        for wave in &waves {
            prop_assert!(wave.len() <= max_concurrent);
            let mut players: HashSet<PlayerId> = HashSet::new();
            for pairing in wave {
                prop_assert!(players.insert(pairing.player1_id));
                prop_assert!(players.insert(pairing.player2_id));
                seen_positions.push(pairing.bracket_position);
            }
        }
        seen_positions.sort_unstable();
        let expected: Vec<u32> = (0..n_pairs as u32).collect();
        prop_assert_eq!(seen_positions, expected);
    }

    /// Applying the same result twice never changes state.
    #[test]
    fn duplicate_result_application_is_noop(seed in any::<u64>()) {
        let mut engine = TournamentEngine::new(TournamentSettings::default());
        let t = engine
            .create_tournament(lobby(TournamentFormat::RoundRobin, 5))
            .expect("create");
        engine.start_tournament(t.id).expect("start");

        let pairing = engine.get_next_matches(t.id).expect("pending")[0].clone();
        let snapshot = engine.get_tournament_status(t.id).expect("exists");
        let (record, result) = fabricate(&snapshot, &pairing, seed, 0);

        engine.process_match_result(&record, &result).expect("first");
        let before = engine.get_tournament_status(t.id).expect("exists");
        let second = engine.process_match_result(&record, &result).expect("second");
        prop_assert!(second.is_none());
        let after = engine.get_tournament_status(t.id).expect("exists");

        prop_assert_eq!(before.match_history.len(), after.match_history.len());
        for (b, a) in before.players.iter().zip(after.players.iter()) {
            prop_assert_eq!(b.statistics.matches_played, a.statistics.matches_played);
            prop_assert_eq!(b.statistics.tournament_points, a.statistics.tournament_points);
            prop_assert_eq!(b.statistics.total_points, a.statistics.total_points);
        }
    }
}
