//! Round engine for the updown dice table.
//!
//! A single session owns one round at a time: the bet ledger accumulates
//! wagers during the bet phase, the multiplier lottery decorates the
//! board at pre-roll, the outcome selector picks the dice sum at roll
//! time, and the settlement engine reconciles the net result against the
//! externally-owned balance. The [`driver::RoundDriver`] wires those
//! pieces to timers and a command mailbox on a single task.

pub mod driver;
pub mod ledger;
pub mod lottery;
pub mod rng;
pub mod selector;
pub mod session;
pub mod settle;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

pub use driver::{
    BalanceService, Command, DriverError, Mailbox, RoundDriver, RoundEvent, SessionView, Shutdown,
};
pub use session::Session;
pub use settle::{Settlement, SettlementError};

use thiserror::Error;
use updown_types::Chips;

/// Player-action rejections. None of these mutate the ledger or advance
/// the phase; they are reported synchronously to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("balance not loaded yet")]
    BalanceNotReady,
    #[error("round in progress")]
    RoundInProgress,
    #[error("session stalled; reload to recover")]
    SessionStalled,
    #[error("session closed")]
    SessionClosed,
    #[error("stake {stake} below minimum {min}")]
    BelowMinimum { stake: Chips, min: Chips },
    #[error("insufficient balance")]
    InsufficientBalance,
    #[error("only one range bet allowed at a time")]
    RangeConflict,
    #[error("no last bet to repeat")]
    NoLastBet,
    #[error("no bets placed")]
    NoBetsPlaced,
}

/// Result type for player actions.
pub type Result<T> = std::result::Result<T, Error>;
