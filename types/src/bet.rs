use std::fmt;

/// The three mutually-exclusive range cells.
///
/// At most one of the three may hold a positive stake at any time; the
/// ledger enforces that invariant at placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RangeKey {
    /// Dice sum 2-6.
    Down,
    /// Dice sum exactly 7.
    Seven,
    /// Dice sum 8-12.
    Up,
}

impl RangeKey {
    pub const ALL: [RangeKey; 3] = [RangeKey::Down, RangeKey::Seven, RangeKey::Up];

    /// Whether a dice sum falls inside this range.
    pub fn covers(&self, sum: u8) -> bool {
        match self {
            RangeKey::Down => (2..=6).contains(&sum),
            RangeKey::Seven => sum == 7,
            RangeKey::Up => (8..=12).contains(&sum),
        }
    }

    /// Fixed payout odds. A win returns `stake * (odds + 1)`.
    pub fn odds(&self) -> u32 {
        match self {
            RangeKey::Down => 1,
            RangeKey::Seven => 4,
            RangeKey::Up => 1,
        }
    }

    /// Dense index for array-backed storage.
    pub fn index(&self) -> usize {
        match self {
            RangeKey::Down => 0,
            RangeKey::Seven => 1,
            RangeKey::Up => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RangeKey::Down => "down",
            RangeKey::Seven => "seven",
            RangeKey::Up => "up",
        }
    }
}

/// An exact dice sum cell, validated to 2..=12.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SumKey(u8);

impl SumKey {
    /// Create a sum cell, rejecting values outside 2..=12.
    pub fn new(sum: u8) -> Option<Self> {
        if (2..=12).contains(&sum) {
            Some(SumKey(sum))
        } else {
            None
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// Symmetric payout odds around seven.
    pub fn odds(&self) -> u32 {
        match self.0 {
            2 | 12 => 26,
            3 | 11 => 12,
            4 | 10 => 8,
            5 | 9 => 6,
            6 | 8 => 5,
            7 => 4,
            _ => unreachable!("SumKey is validated at construction"),
        }
    }

    /// Dense index for array-backed storage (sum 2 maps to 0).
    pub fn index(&self) -> usize {
        (self.0 - 2) as usize
    }
}

/// Any one of the fourteen bet cells on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BetKey {
    Range(RangeKey),
    Sum(SumKey),
}

impl BetKey {
    /// The full 14-key universe in board order: 3 range cells, then the
    /// 11 sum cells from 2 to 12.
    pub const ALL: [BetKey; 14] = [
        BetKey::Range(RangeKey::Down),
        BetKey::Range(RangeKey::Seven),
        BetKey::Range(RangeKey::Up),
        BetKey::Sum(SumKey(2)),
        BetKey::Sum(SumKey(3)),
        BetKey::Sum(SumKey(4)),
        BetKey::Sum(SumKey(5)),
        BetKey::Sum(SumKey(6)),
        BetKey::Sum(SumKey(7)),
        BetKey::Sum(SumKey(8)),
        BetKey::Sum(SumKey(9)),
        BetKey::Sum(SumKey(10)),
        BetKey::Sum(SumKey(11)),
        BetKey::Sum(SumKey(12)),
    ];

    /// Whether this cell pays on the given dice sum.
    pub fn covers(&self, sum: u8) -> bool {
        match self {
            BetKey::Range(r) => r.covers(sum),
            BetKey::Sum(s) => s.value() == sum,
        }
    }

    pub fn odds(&self) -> u32 {
        match self {
            BetKey::Range(r) => r.odds(),
            BetKey::Sum(s) => s.odds(),
        }
    }
}

impl fmt::Display for BetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BetKey::Range(r) => f.write_str(r.as_str()),
            BetKey::Sum(s) => write!(f, "{}", s.value()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_coverage() {
        for sum in 2..=6 {
            assert!(RangeKey::Down.covers(sum));
            assert!(!RangeKey::Seven.covers(sum));
            assert!(!RangeKey::Up.covers(sum));
        }
        assert!(RangeKey::Seven.covers(7));
        for sum in 8..=12 {
            assert!(RangeKey::Up.covers(sum));
            assert!(!RangeKey::Down.covers(sum));
            assert!(!RangeKey::Seven.covers(sum));
        }
    }

    #[test]
    fn test_sum_key_validation() {
        assert!(SumKey::new(1).is_none());
        assert!(SumKey::new(13).is_none());
        for sum in 2..=12 {
            assert_eq!(SumKey::new(sum).map(|k| k.value()), Some(sum));
        }
    }

    #[test]
    fn test_odds_table() {
        let expected = [
            (2, 26),
            (3, 12),
            (4, 8),
            (5, 6),
            (6, 5),
            (7, 4),
            (8, 5),
            (9, 6),
            (10, 8),
            (11, 12),
            (12, 26),
        ];
        for (sum, odds) in expected {
            let key = SumKey::new(sum).expect("valid sum");
            assert_eq!(key.odds(), odds);
        }
        assert_eq!(RangeKey::Down.odds(), 1);
        assert_eq!(RangeKey::Seven.odds(), 4);
        assert_eq!(RangeKey::Up.odds(), 1);
    }

    #[test]
    fn test_universe() {
        assert_eq!(BetKey::ALL.len(), 14);

        // Every sum is covered by exactly one range cell and one sum
        // cell.
        for sum in 2..=12u8 {
            let covering = BetKey::ALL.iter().filter(|k| k.covers(sum)).count();
            assert_eq!(covering, 2);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(BetKey::Range(RangeKey::Down).to_string(), "down");
        assert_eq!(BetKey::Range(RangeKey::Seven).to_string(), "seven");
        let twelve = SumKey::new(12).expect("valid sum");
        assert_eq!(BetKey::Sum(twelve).to_string(), "12");
    }
}
