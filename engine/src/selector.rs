//! Exposure-weighted outcome selection.
//!
//! The round's dice sum is drawn by roulette selection over weights
//! inversely related to the payout the house would owe on each sum,
//! scaled by per-tier win-chance targets and a penalty for outcomes
//! whose payout dwarfs the round's exposure. When nobody is wagering
//! the targets are uniform and every sum weighs the same.

use crate::ledger::BetLedger;
use crate::lottery::MultiplierSet;
use crate::rng::RoundRng;
use crate::settle::potential_payout;
use updown_types::{BetKey, RoundOutcome};

/// Retained share of the base weight regardless of tier target.
const TIER_FLOOR: f64 = 0.2;

/// Minimum selection weight; every sum stays reachable.
const WEIGHT_FLOOR: f64 = 0.0001;

/// Payout-to-exposure ratio beyond which the penalty applies.
const OUTSIZED_RATIO: i64 = 5;

/// Weight scale for outcomes with outsized payout ratios.
const OUTSIZED_PENALTY: f64 = 0.15;

/// Multiplier magnitude tiers used for win-chance targeting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tier {
    Normal,
    Small,
    Medium,
    Big,
}

impl Tier {
    fn classify(multiplier: u16) -> Tier {
        match multiplier {
            0..=1 => Tier::Normal,
            2..=9 => Tier::Small,
            10..=25 => Tier::Medium,
            _ => Tier::Big,
        }
    }

    /// Win-chance target in percent. Uniform when the board is idle so
    /// spectating rounds are not adversarially biased.
    fn target(self, betting: bool) -> f64 {
        if !betting {
            return 80.0;
        }
        match self {
            Tier::Normal => 70.0,
            Tier::Small => 60.0,
            Tier::Medium => 30.0,
            Tier::Big => 15.0,
        }
    }
}

/// Highest multiplier applicable to `sum` among staked covering cells.
fn applied_multiplier(ledger: &BetLedger, multipliers: &MultiplierSet, sum: u8) -> u16 {
    let mut applied = 1;
    for key in BetKey::ALL {
        if !key.covers(sum) || !ledger.stake(key).is_positive() {
            continue;
        }
        applied = applied.max(multipliers.get(&key).copied().unwrap_or(1));
    }
    applied
}

/// Selection weights for sums 2..=12 (index 0 is sum 2).
fn selection_weights(ledger: &BetLedger, multipliers: &MultiplierSet) -> [f64; 11] {
    let exposure = ledger.exposure();
    let betting = exposure.is_positive();

    let mut weights = [0.0; 11];
    for (i, slot) in weights.iter_mut().enumerate() {
        let sum = (i + 2) as u8;
        let payout = potential_payout(ledger, multipliers, sum);
        let tier = Tier::classify(applied_multiplier(ledger, multipliers, sum));

        let mut weight = 1.0 / (1.0 + payout.to_f64());
        weight *= TIER_FLOOR + (1.0 - TIER_FLOOR) * tier.target(betting) / 100.0;
        if betting && payout.cents() > exposure.cents().saturating_mul(OUTSIZED_RATIO) {
            weight *= OUTSIZED_PENALTY;
        }
        *slot = weight.max(WEIGHT_FLOOR);
    }
    weights
}

/// Roulette-select the round's dice sum.
fn select_sum(ledger: &BetLedger, multipliers: &MultiplierSet, rng: &mut RoundRng) -> u8 {
    let weights = selection_weights(ledger, multipliers);
    let total: f64 = weights.iter().sum();

    let r = rng.next_f64() * total;
    let mut cumulative = 0.0;
    for (i, weight) in weights.iter().enumerate() {
        cumulative += weight;
        if r <= cumulative {
            return (i + 2) as u8;
        }
    }
    // Defensive terminal: unreachable with exact accumulation.
    7
}

/// Pick the round outcome: a weighted sum, then a uniformly random dice
/// pair realizing it.
pub fn select_outcome(
    ledger: &BetLedger,
    multipliers: &MultiplierSet,
    rng: &mut RoundRng,
) -> RoundOutcome {
    let sum = select_sum(ledger, multipliers, rng);
    let pairs: Vec<RoundOutcome> = (1..=6u8)
        .filter_map(|a| sum.checked_sub(a).and_then(|b| RoundOutcome::new(a, b)))
        .collect();
    *rng.pick(&pairs)
}
