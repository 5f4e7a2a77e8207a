use std::fmt;

/// Round phases. The only legal cycle is Bet -> PreRoll -> Rolling -> Bet.
///
/// Bet accepts player actions for a fixed window; PreRoll runs the
/// multiplier lottery exactly once at entry; Rolling selects the outcome
/// at entry and ends when settlement completes, not on a timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Bet,
    PreRoll,
    Rolling,
}

impl Phase {
    /// The next phase in the round cycle.
    pub fn next(self) -> Phase {
        match self {
            Phase::Bet => Phase::PreRoll,
            Phase::PreRoll => Phase::Rolling,
            Phase::Rolling => Phase::Bet,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Bet => "bet",
            Phase::PreRoll => "preroll",
            Phase::Rolling => "rolling",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The dice pair chosen for a round. Immutable once constructed; the
/// stored sum always equals the sum of the pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundOutcome {
    dice: (u8, u8),
    sum: u8,
}

impl RoundOutcome {
    /// Build an outcome from two die faces, rejecting values outside 1..=6.
    pub fn new(first: u8, second: u8) -> Option<Self> {
        if !(1..=6).contains(&first) || !(1..=6).contains(&second) {
            return None;
        }
        Some(RoundOutcome {
            dice: (first, second),
            sum: first + second,
        })
    }

    pub fn dice(&self) -> (u8, u8) {
        self.dice
    }

    pub fn sum(&self) -> u8 {
        self.sum
    }
}

impl fmt::Display for RoundOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}={}", self.dice.0, self.dice.1, self.sum)
    }
}
