//! In-memory wager ledger for the current round.
//!
//! Two disjoint bet families: the three range cells (mutually exclusive
//! at stake time) and the eleven exact-sum cells (freely combinable).
//! Validation against balance, phase, and minimum stake lives in
//! [`crate::session::Session`]; the ledger owns stakes and the
//! "last bet" recall used by the repeat operation.

use updown_types::{BetKey, Chips, RangeKey};

/// Stakes for the round in progress, all zero at round start.
#[derive(Clone, Debug, Default)]
pub struct BetLedger {
    range: [Chips; 3],
    sums: [Chips; 11],
    last_bet: Option<(BetKey, Chips)>,
}

impl BetLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current stake on one cell.
    pub fn stake(&self, key: BetKey) -> Chips {
        match key {
            BetKey::Range(r) => self.range[r.index()],
            BetKey::Sum(s) => self.sums[s.index()],
        }
    }

    /// Total currency staked across every cell.
    pub fn exposure(&self) -> Chips {
        BetKey::ALL.iter().map(|&key| self.stake(key)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.exposure().is_zero()
    }

    /// Whether a different range cell already carries a positive stake.
    pub fn conflicting_range(&self, key: RangeKey) -> bool {
        RangeKey::ALL
            .iter()
            .any(|r| *r != key && self.range[r.index()].is_positive())
    }

    /// Add to a cell's stake and remember the placement for repeat.
    pub fn credit(&mut self, key: BetKey, amount: Chips) {
        match key {
            BetKey::Range(r) => self.range[r.index()] += amount,
            BetKey::Sum(s) => self.sums[s.index()] += amount,
        }
        self.last_bet = Some((key, amount));
    }

    /// The most recent successful placement, if any.
    pub fn last_bet(&self) -> Option<(BetKey, Chips)> {
        self.last_bet
    }

    /// Double every nonzero stake in place.
    pub fn double_all(&mut self) {
        for stake in self.range.iter_mut().chain(self.sums.iter_mut()) {
            *stake = stake.double();
        }
    }

    /// Zero every cell and clear the repeat recall.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
