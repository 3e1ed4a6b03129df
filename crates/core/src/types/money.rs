//! Money in minor currency units.
//!
//! All amounts are integer céntimos (1/100 colón). There is no floating point
//! anywhere in the money path; totals are exact integer sums.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use serde::{Deserialize, Serialize};

/// An amount of Costa Rican colones expressed in céntimos.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Centimos(u64);

impl Centimos {
    /// Zero céntimos.
    pub const ZERO: Self = Self(0);

    /// Create an amount from a raw céntimo count.
    #[must_use]
    pub const fn new(centimos: u64) -> Self {
        Self(centimos)
    }

    /// Create an amount from whole colones.
    #[must_use]
    pub const fn from_colones(colones: u64) -> Self {
        Self(colones.saturating_mul(100))
    }

    /// Get the raw céntimo count.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Multiply by a quantity, saturating at `u64::MAX`.
    #[must_use]
    pub const fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(quantity as u64))
    }

    /// Format for display as whole colones, e.g. `₡12 500`.
    ///
    /// Céntimos are rounded half-up to the nearest colón, matching how the
    /// storefront has always shown prices.
    #[must_use]
    pub fn display_crc(self) -> String {
        let colones = self.0 / 100 + u64::from(self.0 % 100 >= 50);
        format!("₡{}", group_thousands(colones))
    }
}

impl fmt::Display for Centimos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_crc())
    }
}

impl Add for Centimos {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Centimos {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<u64> for Centimos {
    fn from(centimos: u64) -> Self {
        Self(centimos)
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Centimos::new(0).display_crc(), "₡0");
        assert_eq!(Centimos::new(50_000).display_crc(), "₡500");
        assert_eq!(Centimos::new(1_250_000).display_crc(), "₡12 500");
        assert_eq!(Centimos::new(123_456_700).display_crc(), "₡1 234 567");
    }

    #[test]
    fn test_display_rounds_half_up() {
        assert_eq!(Centimos::new(149).display_crc(), "₡1");
        assert_eq!(Centimos::new(150).display_crc(), "₡2");
    }

    #[test]
    fn test_times_and_sum() {
        let total: Centimos = [Centimos::new(500).times(2), Centimos::new(250)]
            .into_iter()
            .sum();
        assert_eq!(total, Centimos::new(1250));
    }

    #[test]
    fn test_times_saturates() {
        assert_eq!(Centimos::new(u64::MAX).times(2).get(), u64::MAX);
    }

    #[test]
    fn test_from_colones() {
        assert_eq!(Centimos::from_colones(12), Centimos::new(1200));
    }
}
