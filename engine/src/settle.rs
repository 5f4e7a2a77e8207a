//! Settlement arithmetic.
//!
//! A matching range bet and a matching exact-sum bet both pay in the
//! same round. Wagers were already debited from the balance at
//! placement time, so the signed `net` submitted to the balance
//! collaborator is `win - exposure`, exact in cents.

use crate::ledger::BetLedger;
use crate::lottery::MultiplierSet;
use thiserror::Error;
use updown_types::{BetKey, Chips, RoundOutcome};

/// Failure applying a settlement delta at the balance collaborator.
/// Terminal for the round: no retry, no ledger reset, no phase advance.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettlementError {
    #[error("settlement rejected: {0}")]
    Rejected(String),
    #[error("transport error: {0}")]
    Transport(String),
}

/// Outcome of the round's payout computation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settlement {
    /// Gross amount returned to the player (stake plus winnings).
    pub win: Chips,
    /// Signed delta submitted to the balance collaborator.
    pub net: Chips,
    /// Exposure staked this round, debited at placement time.
    pub total_bet: Chips,
}

/// Total the house pays out if the round lands on `sum`: every covering
/// staked cell returns `stake * (odds + 1) * multiplier`.
pub fn potential_payout(ledger: &BetLedger, multipliers: &MultiplierSet, sum: u8) -> Chips {
    let mut payout = Chips::ZERO;
    for key in BetKey::ALL {
        if !key.covers(sum) {
            continue;
        }
        let stake = ledger.stake(key);
        if !stake.is_positive() {
            continue;
        }
        let multiplier = multipliers.get(&key).copied().unwrap_or(1) as u32;
        payout += stake.saturating_mul((key.odds() + 1) * multiplier);
    }
    payout
}

/// Compute the round's win and signed net for the chosen outcome.
pub fn settle(ledger: &BetLedger, multipliers: &MultiplierSet, outcome: RoundOutcome) -> Settlement {
    let total_bet = ledger.exposure();
    let win = potential_payout(ledger, multipliers, outcome.sum());
    Settlement {
        win,
        net: win - total_bet,
        total_bet,
    }
}
