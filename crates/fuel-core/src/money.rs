//! # Money Module
//!
//! Provides the `Money` type for prices, sale totals and income.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Liters are fractional (12.5 L), prices are not.                        │
//! │                                                                         │
//! │  57.47 per liter × 500 L in floating point accumulates error in the    │
//! │  income counter over thousands of sales.                               │
//! │                                                                         │
//! │  OUR SOLUTION: integer minor units (kopecks)                            │
//! │    5747 × 500 = 2_873_500 minor units = 28735.00                        │
//! │    Fractional liters round ONCE, at the sale, to the nearest unit.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use fuel_core::money::Money;
//!
//! let price = Money::from_major_minor(57, 47);
//! let total = price.for_liters(500.0);
//! assert_eq!(total.minor_units(), 2_873_500);
//! assert_eq!(total.to_string(), "28735.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// ## Example
    /// ```rust
    /// use fuel_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(58, 30).minor_units(), 5830);
    /// assert_eq!(Money::from_major_minor(-5, 50).minor_units(), -550);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor_units(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Returns the value as a float, for display and reporting only.
    #[inline]
    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Prices a fractional volume at this per-liter price.
    ///
    /// The product is rounded half away from zero to the nearest minor unit.
    ///
    /// ## Example
    /// ```rust
    /// use fuel_core::money::Money;
    ///
    /// let price = Money::from_major_minor(52, 0);
    /// assert_eq!(price.for_liters(12.5).minor_units(), 65_000);
    /// assert_eq!(Money::from_minor(5747).for_liters(0.333).minor_units(), 1914);
    /// ```
    pub fn for_liters(&self, liters: f64) -> Money {
        Money((self.0 as f64 * liters).round() as i64)
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Parses a decimal amount such as `57.47`, `52` or `58.3`.
///
/// At most two fractional digits are accepted.
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "price".to_string(),
            reason: reason.to_string(),
        };

        if s.is_empty() {
            return Err(ValidationError::Required {
                field: "price".to_string(),
            });
        }

        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let (major_str, minor_str) = match digits.split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (digits, ""),
        };

        if major_str.is_empty() || !major_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("expected a decimal number"));
        }
        if minor_str.len() > 2 || !minor_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("at most two decimal places"));
        }

        let major: i64 = major_str
            .parse()
            .map_err(|_| invalid("amount is too large"))?;
        let minor: i64 = match minor_str.len() {
            0 => 0,
            1 => minor_str.parse::<i64>().map_err(|_| invalid("bad fraction"))? * 10,
            _ => minor_str.parse().map_err(|_| invalid("bad fraction"))?,
        };

        let value = major
            .checked_mul(100)
            .and_then(|v| v.checked_add(minor))
            .ok_or_else(|| invalid("amount is too large"))?;

        Ok(Money(if negative { -value } else { value }))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows the amount with two decimals and no currency symbol.
///
/// The currency symbol comes from the station configuration.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_liters_scenario() {
        let price = Money::from_major_minor(57, 47);
        let total = price.for_liters(500.0);
        assert_eq!(total, Money::from_major_minor(28735, 0));
        assert_eq!(total.to_string(), "28735.00");
    }

    #[test]
    fn test_for_liters_rounds_half_away_from_zero() {
        // 100 × 0.125 = 12.5 → 13
        assert_eq!(Money::from_minor(100).for_liters(0.125).minor_units(), 13);
        assert_eq!(Money::zero().for_liters(40.0), Money::zero());
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_minor(5830).to_string(), "58.30");
        assert_eq!(Money::from_minor(-550).to_string(), "-5.50");
        assert_eq!(Money::from_minor(7).to_string(), "0.07");
    }

    #[test]
    fn test_parse() {
        assert_eq!("57.47".parse::<Money>().unwrap().minor_units(), 5747);
        assert_eq!("58.3".parse::<Money>().unwrap().minor_units(), 5830);
        assert_eq!("52".parse::<Money>().unwrap().minor_units(), 5200);
        assert_eq!(" 64.50 ".parse::<Money>().unwrap().minor_units(), 6450);

        assert!("".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!("1.234".parse::<Money>().is_err());
        assert!(".50".parse::<Money>().is_err());
    }

    #[test]
    fn test_sum() {
        let total: Money = [Money::from_minor(100), Money::from_minor(250)]
            .into_iter()
            .sum();
        assert_eq!(total.minor_units(), 350);
    }
}
