use crate::Chips;

/// Minimum stake per placement.
pub const MIN_BET: Chips = Chips::from_cents(10);

/// Smallest multiplier the lottery can assign to a cell.
pub const MULT_MIN: u16 = 2;

/// Largest multiplier the lottery can assign to a cell.
pub const MULT_MAX: u16 = 300;

/// Fewest cells decorated when the lottery activates.
pub const LOTTERY_MIN_PICKS: usize = 3;

/// Most cells decorated when the lottery activates.
pub const LOTTERY_MAX_PICKS: usize = 6;

/// Probability that an off-cooldown lottery phase skips activation.
pub const LOTTERY_SKIP_PROB: f32 = 0.5;

/// Rolled sums retained for the on-screen history strip.
pub const HISTORY_DEPTH: usize = 18;

/// Default bet-phase window.
pub const DEFAULT_BET_MILLIS: u64 = 15_000;

/// Default pre-roll window bounds (actual duration is drawn uniformly).
pub const DEFAULT_PREROLL_MIN_MILLIS: u64 = 2_000;
pub const DEFAULT_PREROLL_MAX_MILLIS: u64 = 3_000;

/// Default dice animation delay before settlement is submitted.
pub const DEFAULT_ROLL_MILLIS: u64 = 2_000;

/// Game identifier attached to every settlement delta.
pub const DEFAULT_SETTLEMENT_TAG: &str = "dice_game";
