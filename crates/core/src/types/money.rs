//! Vietnamese đồng amounts.
//!
//! The backend prices everything in whole đồng (the currency has no minor
//! unit in practice), so amounts are integers rather than decimals.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};

use serde::{Deserialize, Serialize};

/// An amount of Vietnamese đồng.
///
/// Displays the way `Intl.NumberFormat("vi-VN", { currency: "VND" })` does:
/// dot-grouped thousands followed by a non-breaking space and `₫`.
///
/// ```
/// use nongsan_core::Vnd;
///
/// assert_eq!(Vnd::new(1_234_000).to_string(), "1.234.000\u{a0}₫");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Vnd(i64);

impl Vnd {
    /// Zero đồng.
    pub const ZERO: Self = Self(0);

    /// Create a new amount.
    #[must_use]
    pub const fn new(amount: i64) -> Self {
        Self(amount)
    }

    /// Get the raw amount.
    #[must_use]
    pub const fn amount(self) -> i64 {
        self.0
    }

    /// Multiply by an item quantity, saturating on overflow.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(i64::from(quantity)))
    }
}

impl fmt::Display for Vnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }
        if self.0 < 0 {
            write!(f, "-{grouped}\u{a0}₫")
        } else {
            write!(f, "{grouped}\u{a0}₫")
        }
    }
}

impl Add for Vnd {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Mul<u32> for Vnd {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self::Output {
        self.times(rhs)
    }
}

impl Sum for Vnd {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<i64> for Vnd {
    fn from(amount: i64) -> Self {
        Self(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Vnd::new(0).to_string(), "0\u{a0}₫");
        assert_eq!(Vnd::new(999).to_string(), "999\u{a0}₫");
        assert_eq!(Vnd::new(1_000).to_string(), "1.000\u{a0}₫");
        assert_eq!(Vnd::new(25_500_000).to_string(), "25.500.000\u{a0}₫");
        assert_eq!(Vnd::new(-45_000).to_string(), "-45.000\u{a0}₫");
    }

    #[test]
    fn test_sum_and_multiply() {
        let total: Vnd = [Vnd::new(10_000) * 3, Vnd::new(2_500).times(2)]
            .into_iter()
            .sum();
        assert_eq!(total, Vnd::new(35_000));
    }
}
