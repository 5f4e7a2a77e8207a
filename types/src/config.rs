use crate::constants::{
    DEFAULT_BET_MILLIS, DEFAULT_PREROLL_MAX_MILLIS, DEFAULT_PREROLL_MIN_MILLIS,
    DEFAULT_ROLL_MILLIS, DEFAULT_SETTLEMENT_TAG, MIN_BET,
};
use crate::Chips;
use serde::{Deserialize, Serialize};

/// Tunable round settings.
///
/// Production uses the defaults; tests and the simulator shrink the
/// windows to milliseconds so rounds complete quickly.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoundConfig {
    /// Length of the bet phase.
    pub bet_millis: u64,
    /// Lower bound of the randomized pre-roll window.
    pub preroll_min_millis: u64,
    /// Upper bound of the randomized pre-roll window.
    pub preroll_max_millis: u64,
    /// Dice animation delay before the settlement call is made.
    pub roll_millis: u64,
    /// Minimum stake per placement.
    pub min_bet: Chips,
    /// Game identifier attached to settlement deltas.
    pub settlement_tag: String,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            bet_millis: DEFAULT_BET_MILLIS,
            preroll_min_millis: DEFAULT_PREROLL_MIN_MILLIS,
            preroll_max_millis: DEFAULT_PREROLL_MAX_MILLIS,
            roll_millis: DEFAULT_ROLL_MILLIS,
            min_bet: MIN_BET,
            settlement_tag: DEFAULT_SETTLEMENT_TAG.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RoundConfig::default();
        assert_eq!(config.bet_millis, 15_000);
        assert_eq!(config.preroll_min_millis, 2_000);
        assert_eq!(config.preroll_max_millis, 3_000);
        assert_eq!(config.min_bet, Chips::from_cents(10));
        assert_eq!(config.settlement_tag, "dice_game");
    }

    #[test]
    fn test_serde_round_trip() {
        let config = RoundConfig::default();
        let json = serde_json::to_string(&config).expect("serialize");
        let back: RoundConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.bet_millis, config.bet_millis);
        assert_eq!(back.min_bet, config.min_bet);
    }
}
