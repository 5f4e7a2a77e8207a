//! Shared domain types for the updown dice table.
//!
//! Everything the round engine and local backend agree on lives here:
//! the phase machine vocabulary, the fourteen bet cells and their payout
//! odds, the fixed-point chip currency, and the tunable round settings.

pub mod constants;

mod bet;
mod chips;
mod config;
mod phase;

pub use bet::{BetKey, RangeKey, SumKey};
pub use chips::Chips;
pub use config::RoundConfig;
pub use phase::{Phase, RoundOutcome};
