//! Pure statistics aggregation over a tournament and its result history.
//!
//! `apply_result` is the single mutation entry point the tournament engine
//! delegates to; everything else derives from already-recorded state.

use std::cmp::Ordering;

use super::models::{PlayerRanking, TournamentHighlights};
use crate::coordinator::models::MatchResult;
use crate::tournament::models::{PlayerId, Tournament, TournamentPlayer};

/// Ranking points awarded for a match win.
pub const POINTS_PER_WIN: u32 = 3;

/// Fold one completed result into both players' statistics and their
/// mutual head-to-head records. The caller guarantees the result has not
/// been applied before.
pub fn apply_result(tournament: &mut Tournament, result: &MatchResult) {
    for id in [result.player1_id, result.player2_id] {
        let Some(opponent) = result.opponent_of(id) else {
            continue;
        };
        let won = result.winner_id == id;
        let scored = result.score_for(id).unwrap_or(0);
        let conceded = result.score_for(opponent).unwrap_or(0);
        let decisions = result.decisions_for(id).unwrap_or_default();

        let Some(player) = tournament.player_mut(id) else {
            continue;
        };
        let stats = &mut player.statistics;
        stats.matches_played += 1;
        if won {
            stats.matches_won += 1;
            stats.tournament_points += POINTS_PER_WIN;
        } else {
            stats.matches_lost += 1;
        }
        stats.total_points += scored;
        stats.total_cooperations += decisions.cooperations;
        stats.total_betrayals += decisions.betrayals;
        stats.refresh_rates();

        let record = stats.head_to_head.entry(opponent).or_default();
        record.matches_played += 1;
        if won {
            record.wins += 1;
        } else {
            record.losses += 1;
        }
        record.points_scored += scored;
        record.points_conceded += conceded;
    }
}

/// Ranking comparator: tournament points desc, matches won desc,
/// cooperation rate desc, then player id for full determinism.
fn ranking_order(a: &TournamentPlayer, b: &TournamentPlayer) -> Ordering {
    b.statistics
        .tournament_points
        .cmp(&a.statistics.tournament_points)
        .then_with(|| b.statistics.matches_won.cmp(&a.statistics.matches_won))
        .then_with(|| {
            b.statistics
                .cooperation_rate
                .partial_cmp(&a.statistics.cooperation_rate)
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| a.id.cmp(&b.id))
}

/// Current ranking table, best first.
pub fn rankings(tournament: &Tournament) -> Vec<PlayerRanking> {
    let mut players: Vec<&TournamentPlayer> = tournament.players.iter().collect();
    players.sort_by(|a, b| ranking_order(a, b));
    players
        .into_iter()
        .enumerate()
        .map(|(i, p)| PlayerRanking {
            player_id: p.id,
            name: p.name.clone(),
            rank: i as u32 + 1,
            tournament_points: p.statistics.tournament_points,
            matches_won: p.statistics.matches_won,
            matches_played: p.statistics.matches_played,
            win_rate: p.statistics.win_rate(),
            cooperation_rate: p.statistics.cooperation_rate,
            average_match_score: p.statistics.average_match_score,
        })
        .collect()
}

/// Write current ranks back onto the roster.
pub fn assign_ranks(tournament: &mut Tournament) {
    let table = rankings(tournament);
    for row in table {
        if let Some(player) = tournament.player_mut(row.player_id) {
            player.current_rank = Some(row.rank);
        }
    }
}

/// Round-robin champion: highest tournament points, tie-break by wins in
/// the mutual matches among the tied players, then by cooperation rate.
pub fn round_robin_winner(tournament: &Tournament) -> Option<PlayerId> {
    let top_points = tournament
        .players
        .iter()
        .map(|p| p.statistics.tournament_points)
        .max()?;
    let candidates: Vec<&TournamentPlayer> = tournament
        .players
        .iter()
        .filter(|p| p.statistics.tournament_points == top_points)
        .collect();

    let mutual_wins = |player: &TournamentPlayer| -> u32 {
        candidates
            .iter()
            .filter(|other| other.id != player.id)
            .map(|other| {
                player
                    .statistics
                    .head_to_head
                    .get(&other.id)
                    .map_or(0, |r| r.wins)
            })
            .sum()
    };

    candidates
        .iter()
        .max_by(|a, b| {
            mutual_wins(a)
                .cmp(&mutual_wins(b))
                .then_with(|| {
                    a.statistics
                        .cooperation_rate
                        .partial_cmp(&b.statistics.cooperation_rate)
                        .unwrap_or(Ordering::Equal)
                })
                .then_with(|| b.id.cmp(&a.id))
        })
        .map(|p| p.id)
}

/// Players with at least one completed match.
fn active_players(tournament: &Tournament) -> impl Iterator<Item = &TournamentPlayer> {
    tournament
        .players
        .iter()
        .filter(|p| p.statistics.matches_played > 0)
}

/// Player with the highest cooperation rate; ties go to whoever played
/// more matches.
pub fn most_cooperative(tournament: &Tournament) -> Option<PlayerId> {
    active_players(tournament)
        .max_by(|a, b| {
            a.statistics
                .cooperation_rate
                .partial_cmp(&b.statistics.cooperation_rate)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.statistics.matches_played.cmp(&b.statistics.matches_played))
                .then_with(|| b.id.cmp(&a.id))
        })
        .map(|p| p.id)
}

/// Player with the highest betrayal rate; ties go to whoever played more
/// matches.
pub fn most_competitive(tournament: &Tournament) -> Option<PlayerId> {
    active_players(tournament)
        .max_by(|a, b| {
            a.statistics
                .betrayal_rate
                .partial_cmp(&b.statistics.betrayal_rate)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.statistics.matches_played.cmp(&b.statistics.matches_played))
                .then_with(|| b.id.cmp(&a.id))
        })
        .map(|p| p.id)
}

/// Completed match with the highest combined score.
pub fn highest_scoring_match(tournament: &Tournament) -> Option<&MatchResult> {
    tournament
        .match_history
        .iter()
        .max_by_key(|r| r.total_score())
}

/// Weighted most-valuable-player score.
fn mvp_score(player: &TournamentPlayer) -> f64 {
    let stats = &player.statistics;
    stats.win_rate() * 40.0
        + stats.average_match_score * 2.0
        + f64::from(stats.tournament_points) * 5.0
        + f64::from(stats.matches_played)
}

/// Most valuable player by weighted score.
pub fn mvp(tournament: &Tournament) -> Option<PlayerId> {
    active_players(tournament)
        .max_by(|a, b| {
            mvp_score(a)
                .partial_cmp(&mvp_score(b))
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.id.cmp(&a.id))
        })
        .map(|p| p.id)
}

/// Mean cooperation and betrayal rates across players with at least one
/// completed match.
pub fn overall_rates(tournament: &Tournament) -> (f64, f64) {
    let mut count = 0u32;
    let mut cooperation = 0.0;
    let mut betrayal = 0.0;
    for player in active_players(tournament) {
        count += 1;
        cooperation += player.statistics.cooperation_rate;
        betrayal += player.statistics.betrayal_rate;
    }
    if count == 0 {
        (0.0, 0.0)
    } else {
        (cooperation / f64::from(count), betrayal / f64::from(count))
    }
}

/// All tournament-level highlights in one pass.
pub fn highlights(tournament: &Tournament) -> TournamentHighlights {
    let (overall_cooperation_rate, overall_betrayal_rate) = overall_rates(tournament);
    TournamentHighlights {
        most_cooperative: most_cooperative(tournament),
        most_competitive: most_competitive(tournament),
        highest_scoring_match: highest_scoring_match(tournament).map(|r| r.match_id),
        mvp: mvp(tournament),
        overall_cooperation_rate,
        overall_betrayal_rate,
    }
}
