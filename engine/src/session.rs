//! Single-player round session.
//!
//! One `Session` owns the entire mutable state of the game loop: the
//! phase, the wager ledger, the lottery cooldown, the active multiplier
//! set, and a mirror of the externally-owned balance. Every mutation
//! happens through a method call on this object; the async driver in
//! [`crate::driver`] feeds it timer and command events in sequence, so
//! no interior locking is needed.

use crate::ledger::BetLedger;
use crate::lottery::{Lottery, MultiplierSet};
use crate::rng::RoundRng;
use crate::selector;
use crate::settle::{self, Settlement, SettlementError};
use crate::{Error, Result};
use std::collections::VecDeque;
use tracing::{debug, info, warn};
use updown_types::constants::HISTORY_DEPTH;
use updown_types::{BetKey, Chips, Phase, RoundConfig, RoundOutcome};

pub struct Session {
    config: RoundConfig,
    phase: Phase,
    ledger: BetLedger,
    lottery: Lottery,
    multipliers: MultiplierSet,
    /// Mirror of the collaborator-owned balance; `None` until the
    /// initial read succeeds, which blocks all player actions.
    balance: Option<Chips>,
    /// Most recent rolled sums, newest first.
    history: VecDeque<u8>,
    round: u64,
    /// Set when a settlement call fails; the round stays unresolved and
    /// every further action is rejected until the session is reloaded.
    stalled: bool,
}

impl Session {
    pub fn new(config: RoundConfig) -> Self {
        Self {
            config,
            phase: Phase::Bet,
            ledger: BetLedger::new(),
            lottery: Lottery::new(),
            multipliers: MultiplierSet::new(),
            balance: None,
            history: VecDeque::with_capacity(HISTORY_DEPTH),
            round: 0,
            stalled: false,
        }
    }

    pub fn config(&self) -> &RoundConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn balance(&self) -> Option<Chips> {
        self.balance
    }

    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn is_stalled(&self) -> bool {
        self.stalled
    }

    pub fn multipliers(&self) -> &MultiplierSet {
        &self.multipliers
    }

    pub fn ledger(&self) -> &BetLedger {
        &self.ledger
    }

    pub fn exposure(&self) -> Chips {
        self.ledger.exposure()
    }

    /// Rolled sums, newest first, capped at the history depth.
    pub fn history(&self) -> impl Iterator<Item = u8> + '_ {
        self.history.iter().copied()
    }

    /// Adopt the balance from the initial collaborator read. Player
    /// actions are rejected with [`Error::BalanceNotReady`] until then.
    pub fn set_balance(&mut self, balance: Chips) {
        info!(%balance, "balance loaded");
        self.balance = Some(balance);
    }

    /// Common gate for the four player operations: session healthy,
    /// balance loaded, and the bet window open.
    fn ensure_actionable(&self) -> Result<Chips> {
        if self.stalled {
            return Err(Error::SessionStalled);
        }
        let balance = self.balance.ok_or(Error::BalanceNotReady)?;
        if self.phase != Phase::Bet {
            return Err(Error::RoundInProgress);
        }
        Ok(balance)
    }

    /// Place a wager on one cell, debiting the mirrored balance.
    pub fn place_bet(&mut self, key: BetKey, amount: Chips) -> Result<()> {
        let balance = self.ensure_actionable()?;
        if amount < self.config.min_bet {
            return Err(Error::BelowMinimum {
                stake: amount,
                min: self.config.min_bet,
            });
        }
        if amount > balance {
            return Err(Error::InsufficientBalance);
        }
        if let BetKey::Range(range) = key {
            if self.ledger.conflicting_range(range) {
                return Err(Error::RangeConflict);
            }
        }

        self.balance = Some(balance - amount);
        self.ledger.credit(key, amount);
        debug!(%key, %amount, "bet placed");
        Ok(())
    }

    /// Re-apply the most recent successful placement. Insufficient
    /// balance reports the same error as a fresh placement.
    pub fn repeat_last_bet(&mut self) -> Result<()> {
        let balance = self.ensure_actionable()?;
        let (key, amount) = self.ledger.last_bet().ok_or(Error::NoLastBet)?;
        if amount > balance {
            return Err(Error::InsufficientBalance);
        }

        self.balance = Some(balance - amount);
        self.ledger.credit(key, amount);
        debug!(%key, %amount, "bet repeated");
        Ok(())
    }

    /// Double every nonzero stake. The debit equals the current total
    /// exposure, so doubling costs exactly what is already on the board.
    pub fn double_all_bets(&mut self) -> Result<()> {
        let balance = self.ensure_actionable()?;
        let exposure = self.ledger.exposure();
        if exposure.is_zero() {
            return Err(Error::NoBetsPlaced);
        }
        if exposure > balance {
            return Err(Error::InsufficientBalance);
        }

        self.balance = Some(balance - exposure);
        self.ledger.double_all();
        debug!(%exposure, "bets doubled");
        Ok(())
    }

    /// Refund the full exposure and zero the ledger.
    pub fn clear_all_bets(&mut self) -> Result<()> {
        let balance = self.ensure_actionable()?;
        let refund = self.ledger.exposure();
        self.balance = Some(balance + refund);
        self.ledger.reset();
        debug!(%refund, "bets cleared");
        Ok(())
    }

    /// Close the bet window and run the multiplier lottery exactly once.
    pub fn begin_preroll(&mut self, rng: &mut RoundRng) -> &MultiplierSet {
        debug_assert_eq!(self.phase, Phase::Bet);
        self.phase = Phase::PreRoll;
        self.multipliers = self.lottery.draw(rng);
        if !self.multipliers.is_empty() {
            debug!(cells = self.multipliers.len(), "multipliers active");
        }
        &self.multipliers
    }

    /// Enter the roll phase and select the round outcome immediately.
    pub fn begin_roll(&mut self, rng: &mut RoundRng) -> RoundOutcome {
        debug_assert_eq!(self.phase, Phase::PreRoll);
        self.phase = Phase::Rolling;
        let outcome = selector::select_outcome(&self.ledger, &self.multipliers, rng);
        self.history.push_front(outcome.sum());
        self.history.truncate(HISTORY_DEPTH);
        debug!(%outcome, "outcome selected");
        outcome
    }

    /// Compute the round's win and signed net for the chosen outcome.
    pub fn settlement(&self, outcome: RoundOutcome) -> Settlement {
        settle::settle(&self.ledger, &self.multipliers, outcome)
    }

    /// Apply the collaborator's settlement response.
    ///
    /// On success the returned balance is adopted as ground truth, the
    /// ledger and multipliers are discarded, and the next bet window
    /// opens. On failure the round is left unresolved: no ledger reset,
    /// no phase advance, no retry. Only a session reload recovers.
    pub fn apply_settlement(&mut self, result: std::result::Result<Chips, SettlementError>) {
        debug_assert_eq!(self.phase, Phase::Rolling);
        match result {
            Ok(balance) => {
                self.balance = Some(balance);
                self.ledger.reset();
                self.multipliers.clear();
                self.phase = Phase::Bet;
                self.round += 1;
                info!(round = self.round, %balance, "round settled");
            }
            Err(err) => {
                self.stalled = true;
                warn!(%err, "settlement failed; session stalled");
            }
        }
    }
}
