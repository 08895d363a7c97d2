//! Tournament configuration models.

use serde::{Deserialize, Serialize};

/// Policy applied when a match's external game session disconnects mid-play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForfeitPolicy {
    /// The disconnected player takes a zero-score loss, the opponent a
    /// zero-score win. Counts toward elimination thresholds.
    AwardWin,
    /// The match is discarded and the pairing re-queued. No statistics
    /// change. There is no automatic retry of the session itself.
    VoidAndRequeue,
}

impl std::fmt::Display for ForfeitPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ForfeitPolicy::AwardWin => write!(f, "award_win"),
            ForfeitPolicy::VoidAndRequeue => write!(f, "void_and_requeue"),
        }
    }
}

/// Per-match configuration handed through to the external game-play engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Rounds of cooperate/betray decisions per match
    pub rounds_per_match: u32,
    /// Seconds a player gets for each decision
    pub decision_timeout_secs: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rounds_per_match: 10,
            decision_timeout_secs: 30,
        }
    }
}

/// Tournament settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentSettings {
    /// Maximum matches a tournament may run simultaneously (default: 4)
    pub max_concurrent_matches: usize,

    /// What happens when a game session disconnects mid-play
    pub forfeit_policy: ForfeitPolicy,

    /// Configuration for each individual match
    pub game: GameConfig,
}

impl Default for TournamentSettings {
    fn default() -> Self {
        Self {
            max_concurrent_matches: 4,
            forfeit_policy: ForfeitPolicy::AwardWin,
            game: GameConfig::default(),
        }
    }
}

impl TournamentSettings {
    /// Validate settings
    pub fn validate(&self) -> Result<(), String> {
        if self.max_concurrent_matches == 0 {
            return Err("Max concurrent matches must be at least 1".to_string());
        }

        if self.game.rounds_per_match == 0 {
            return Err("Matches must have at least one round".to_string());
        }

        if self.game.decision_timeout_secs == 0 {
            return Err("Decision timeout must be at least 1 second".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = TournamentSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.max_concurrent_matches, 4);
        assert_eq!(settings.forfeit_policy, ForfeitPolicy::AwardWin);
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let settings = TournamentSettings {
            max_concurrent_matches: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_zero_rounds_rejected() {
        let mut settings = TournamentSettings::default();
        settings.game.rounds_per_match = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_forfeit_policy_display() {
        assert_eq!(ForfeitPolicy::AwardWin.to_string(), "award_win");
        assert_eq!(ForfeitPolicy::VoidAndRequeue.to_string(), "void_and_requeue");
    }
}
