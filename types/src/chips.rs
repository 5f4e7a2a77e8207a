use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Cents per whole chip unit.
const SCALE: i64 = 100;

/// Fixed-point chip amount with exactly 2 decimal places of precision.
///
/// Stored as signed cents so settlement deltas (which may be negative)
/// and stakes share one representation. All stake/payout arithmetic is
/// exact; floating point only appears in the outcome selector, which
/// converts one way via [`Chips::to_f64`].
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Chips(i64);

impl Chips {
    pub const ZERO: Chips = Chips(0);

    /// Create from raw cents.
    pub const fn from_cents(cents: i64) -> Self {
        Chips(cents)
    }

    /// Create from whole chip units.
    pub const fn from_whole(units: i64) -> Self {
        Chips(units * SCALE)
    }

    /// Raw cents.
    pub const fn cents(self) -> i64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Lossy conversion for weighting math only.
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / SCALE as f64
    }

    /// Multiply by an integer factor (odds, multipliers), saturating at
    /// the representable bounds rather than wrapping.
    pub const fn saturating_mul(self, factor: u32) -> Self {
        Chips(self.0.saturating_mul(factor as i64))
    }

    pub const fn double(self) -> Self {
        self.saturating_mul(2)
    }
}

impl Add for Chips {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Chips(self.0 + other.0)
    }
}

impl AddAssign for Chips {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Chips {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Chips(self.0 - other.0)
    }
}

impl SubAssign for Chips {
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Chips {
    type Output = Self;
    fn neg(self) -> Self {
        Chips(-self.0)
    }
}

impl Sum for Chips {
    fn sum<I: Iterator<Item = Chips>>(iter: I) -> Self {
        iter.fold(Chips::ZERO, |acc, c| acc + c)
    }
}

impl fmt::Display for Chips {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / SCALE as u64, abs % SCALE as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction() {
        assert_eq!(Chips::from_whole(5).cents(), 500);
        assert_eq!(Chips::from_cents(10).cents(), 10);
        assert_eq!(Chips::from_whole(-3).cents(), -300);
        assert!(Chips::ZERO.is_zero());
    }

    #[test]
    fn test_arithmetic() {
        let a = Chips::from_whole(10);
        let b = Chips::from_cents(50);

        assert_eq!((a + b).cents(), 1050);
        assert_eq!((a - b).cents(), 950);
        assert_eq!((-b).cents(), -50);
        assert_eq!(b.double().cents(), 100);
        assert_eq!(b.saturating_mul(27).cents(), 1350);
    }

    #[test]
    fn test_saturating_mul_does_not_wrap() {
        let huge = Chips::from_cents(i64::MAX);
        assert_eq!(huge.saturating_mul(2).cents(), i64::MAX);
    }

    #[test]
    fn test_sum() {
        let total: Chips = [Chips::from_cents(10), Chips::from_cents(25)]
            .into_iter()
            .sum();
        assert_eq!(total.cents(), 35);
    }

    #[test]
    fn test_display() {
        assert_eq!(Chips::from_cents(1050).to_string(), "10.50");
        assert_eq!(Chips::from_cents(5).to_string(), "0.05");
        assert_eq!(Chips::from_cents(-150).to_string(), "-1.50");
        assert_eq!(Chips::ZERO.to_string(), "0.00");
    }

    #[test]
    fn test_to_f64() {
        assert_eq!(Chips::from_cents(150).to_f64(), 1.5);
        assert_eq!(Chips::from_cents(-25).to_f64(), -0.25);
    }
}
