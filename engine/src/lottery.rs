//! Multiplier lottery, run exactly once per pre-roll phase.
//!
//! The lottery keeps a cooldown counter across rounds: while it is
//! nonzero the phase is quiet and the counter decrements. Off cooldown,
//! half of all phases skip activation and re-arm the cooldown; the rest
//! decorate 3-6 distinct cells with a magnitude drawn from a three-tier
//! distribution (55% 2-9x, 30% 10-25x, 15% 30-300x).

use crate::rng::RoundRng;
use std::collections::BTreeMap;
use updown_types::constants::{LOTTERY_MAX_PICKS, LOTTERY_MIN_PICKS, LOTTERY_SKIP_PROB};
use updown_types::BetKey;

/// Active multipliers for the current round, keyed by bet cell.
/// Cells absent from the map pay at base odds (multiplier 1).
pub type MultiplierSet = BTreeMap<BetKey, u16>;

/// Lottery state carried across rounds.
#[derive(Debug, Default)]
pub struct Lottery {
    cooldown: u8,
}

impl Lottery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remaining quiet phases before the lottery may activate again.
    pub fn cooldown(&self) -> u8 {
        self.cooldown
    }

    /// Draw the multiplier set for this pre-roll phase. An empty set
    /// means no multipliers are active for the round.
    pub fn draw(&mut self, rng: &mut RoundRng) -> MultiplierSet {
        if self.cooldown > 0 {
            self.cooldown -= 1;
            return MultiplierSet::new();
        }
        if rng.next_f32() < LOTTERY_SKIP_PROB {
            self.cooldown = 1 + rng.next_bounded(2) as u8;
            return MultiplierSet::new();
        }

        let picks = LOTTERY_MIN_PICKS
            + rng.next_bounded((LOTTERY_MAX_PICKS - LOTTERY_MIN_PICKS + 1) as u32) as usize;

        // Partial Fisher-Yates over the 14-key universe: the first
        // `picks` slots end up holding a uniform sample without
        // replacement.
        let mut keys = BetKey::ALL;
        for i in 0..picks {
            let j = i + rng.next_bounded((keys.len() - i) as u32) as usize;
            keys.swap(i, j);
        }

        let mut set = MultiplierSet::new();
        for &key in &keys[..picks] {
            set.insert(key, draw_magnitude(rng));
        }
        set
    }
}

/// Draw one multiplier magnitude: 55% small (2-9), 30% medium (10-25),
/// 15% big (30-300).
fn draw_magnitude(rng: &mut RoundRng) -> u16 {
    let roll = rng.next_f32();
    if roll < 0.55 {
        2 + rng.next_bounded(8) as u16
    } else if roll < 0.85 {
        10 + rng.next_bounded(16) as u16
    } else {
        30 + rng.next_bounded(271) as u16
    }
}
