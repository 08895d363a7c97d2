//! Statistics module for rankings, head-to-head records, and highlights.
//!
//! Pure functions over tournament state: result application, ranking
//! order, round robin tie-breaks, and the post-tournament highlight
//! summary (most cooperative, most competitive, highest scoring match,
//! and MVP).

pub mod engine;
pub mod models;

pub use engine::{
    apply_result, assign_ranks, highlights, mvp, overall_rates, rankings, round_robin_winner,
    POINTS_PER_WIN,
};
pub use models::{PlayerRanking, TournamentHighlights};
