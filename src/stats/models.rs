//! Statistics output models.

use serde::{Deserialize, Serialize};

use crate::coordinator::models::MatchId;
use crate::tournament::models::PlayerId;

/// One row of a tournament ranking table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRanking {
    /// Player ID
    pub player_id: PlayerId,
    /// Display name
    pub name: String,
    /// 1-indexed rank
    pub rank: u32,
    /// Ranking points
    pub tournament_points: u32,
    /// Matches won
    pub matches_won: u32,
    /// Matches played
    pub matches_played: u32,
    /// Win rate as a fraction
    pub win_rate: f64,
    /// Cooperation rate as a fraction
    pub cooperation_rate: f64,
    /// Average in-match score
    pub average_match_score: f64,
}

/// Tournament-level highlights derived from the complete result history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentHighlights {
    /// Highest cooperation rate (ties go to more matches played)
    pub most_cooperative: Option<PlayerId>,
    /// Highest betrayal rate (ties go to more matches played)
    pub most_competitive: Option<PlayerId>,
    /// Match with the highest combined score
    pub highest_scoring_match: Option<MatchId>,
    /// Weighted most-valuable-player pick
    pub mvp: Option<PlayerId>,
    /// Mean cooperation rate across players with at least one match
    pub overall_cooperation_rate: f64,
    /// Mean betrayal rate across players with at least one match
    pub overall_betrayal_rate: f64,
}
