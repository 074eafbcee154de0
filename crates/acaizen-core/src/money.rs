//! # Money Module
//!
//! Provides the `Money` type for handling monetary values (Brazilian Real)
//! safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    15.90 * 2 + 2.00 * 2 = 35.800000000000004  ❌ WRONG!                 │
//! │                                                                         │
//! │  A cash sale compared with `received >= total` can then reject          │
//! │  an exact payment of R$35,80.                                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Centavos                                         │
//! │    1590 * 2 + 200 * 2 = 3580   (exact, always)                          │
//! │    Two-decimal formatting happens only at presentation time             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use acaizen_core::money::Money;
//!
//! let price = Money::from_cents(1590);        // R$15,90
//! let addon = Money::parse_decimal("2.00").unwrap();
//!
//! let line = (price + addon) * 2;
//! assert_eq!(line.to_brl(), "R$35,80");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in centavos.
///
/// ## Design Decisions
/// - **i64 (signed)**: change and stock-style deltas can go through zero
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Serialized as a plain integer**: the UI and backups see cents
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.price_cents ──┬──► CartItem.total ──► Cart.total_amount        │
/// │  Addon.price_cents ────┘                           │                    │
/// │                                                    ▼                    │
/// │                     Sale.total_cents, Sale.change_cents                 │
/// │                                                    │                    │
/// │                                                    ▼                    │
/// │                     Receipt lines "R$35,80", report totals              │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from centavos.
    ///
    /// ## Example
    /// ```rust
    /// use acaizen_core::money::Money;
    ///
    /// let price = Money::from_cents(1590); // R$15,90
    /// assert_eq!(price.cents(), 1590);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in centavos.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole reais portion.
    #[inline]
    pub const fn reais(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the centavos portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity.
    ///
    /// ## User Workflow
    /// ```text
    /// Açaí 300ml R$15,90 + Granola R$2,00
    /// Quantity: 2
    ///      │
    ///      ▼
    /// multiply_quantity(2) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Line Total: R$35,80
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Formats the value the way receipts and reports show it: `R$35,80`.
    ///
    /// Always two decimal places, comma as decimal separator, no thousands
    /// grouping.
    ///
    /// ## Example
    /// ```rust
    /// use acaizen_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(420).to_brl(), "R$4,20");
    /// assert_eq!(Money::from_cents(123456).to_brl(), "R$1234,56");
    /// ```
    pub fn to_brl(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}R${},{:02}", sign, self.reais().abs(), self.cents_part())
    }

    /// Formats the value as a plain decimal with a dot separator (`35.80`).
    ///
    /// Used by CSV exports, where spreadsheets expect a dot.
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.reais().abs(), self.cents_part())
    }

    /// Parses a decimal amount typed by a user or read from a CSV file.
    ///
    /// Accepts either `.` or `,` as the decimal separator, at most two
    /// decimal places and an optional `R$` prefix. The value is converted
    /// exactly, without going through floating point.
    ///
    /// ## Example
    /// ```rust
    /// use acaizen_core::money::Money;
    ///
    /// assert_eq!(Money::parse_decimal("15.90").unwrap().cents(), 1590);
    /// assert_eq!(Money::parse_decimal("15,9").unwrap().cents(), 1590);
    /// assert_eq!(Money::parse_decimal("R$ 40").unwrap().cents(), 4000);
    /// assert!(Money::parse_decimal("abc").is_err());
    /// ```
    pub fn parse_decimal(input: &str) -> Result<Money, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: format!("'{}': {}", input, reason),
        };

        let mut text = input.trim();
        if let Some(rest) = text.strip_prefix("R$") {
            text = rest.trim_start();
        }

        let (negative, text) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };

        if text.is_empty() {
            return Err(invalid("empty value"));
        }

        let (whole, fraction) = match text.find(['.', ',']) {
            Some(pos) => (&text[..pos], &text[pos + 1..]),
            None => (text, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid("no digits"));
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("not a number"));
        }
        if fraction.len() > 2 {
            return Err(invalid("more than two decimal places"));
        }

        let reais: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid("value too large"))?
        };
        let centavos: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid("not a number"))? * 10,
            _ => fraction.parse().map_err(|_| invalid("not a number"))?,
        };

        let cents = reais
            .checked_mul(100)
            .and_then(|c| c.checked_add(centavos))
            .ok_or_else(|| invalid("value too large"))?;

        Ok(Money(if negative { -cents } else { cents }))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display uses the pt-BR receipt format.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_brl())
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

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by i64 (quantities are i64 throughout).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
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
    fn test_from_cents() {
        let money = Money::from_cents(1590);
        assert_eq!(money.cents(), 1590);
        assert_eq!(money.reais(), 15);
        assert_eq!(money.cents_part(), 90);
    }

    #[test]
    fn test_brl_format() {
        assert_eq!(Money::from_cents(3580).to_brl(), "R$35,80");
        assert_eq!(Money::from_cents(420).to_brl(), "R$4,20");
        assert_eq!(Money::from_cents(5).to_brl(), "R$0,05");
        assert_eq!(Money::zero().to_brl(), "R$0,00");
        assert_eq!(Money::from_cents(-550).to_brl(), "-R$5,50");
        assert_eq!(format!("{}", Money::from_cents(1000)), "R$10,00");
    }

    #[test]
    fn test_decimal_string() {
        assert_eq!(Money::from_cents(1590).to_decimal_string(), "15.90");
        assert_eq!(Money::from_cents(7).to_decimal_string(), "0.07");
    }

    #[test]
    fn test_parse_decimal_separators() {
        assert_eq!(Money::parse_decimal("15.90").unwrap().cents(), 1590);
        assert_eq!(Money::parse_decimal("15,90").unwrap().cents(), 1590);
        assert_eq!(Money::parse_decimal("15.9").unwrap().cents(), 1590);
        assert_eq!(Money::parse_decimal("15").unwrap().cents(), 1500);
        assert_eq!(Money::parse_decimal(" 2,00 ").unwrap().cents(), 200);
        assert_eq!(Money::parse_decimal(",50").unwrap().cents(), 50);
        assert_eq!(Money::parse_decimal("R$ 40,00").unwrap().cents(), 4000);
        assert_eq!(Money::parse_decimal("-1.5").unwrap().cents(), -150);
    }

    #[test]
    fn test_parse_decimal_rejects_garbage() {
        assert!(Money::parse_decimal("").is_err());
        assert!(Money::parse_decimal("abc").is_err());
        assert!(Money::parse_decimal("1.234").is_err());
        assert!(Money::parse_decimal("1.2.3").is_err());
        assert!(Money::parse_decimal(".").is_err());
    }

    #[test]
    fn test_arithmetic_is_exact() {
        let price = Money::from_cents(1590);
        let granola = Money::from_cents(200);
        let line = (price + granola) * 2;
        assert_eq!(line.cents(), 3580);

        let received = Money::from_cents(4000);
        assert_eq!((received - line).cents(), 420);
    }

    #[test]
    fn test_sum() {
        let total: Money = [1590, 200, 500].iter().map(|c| Money::from_cents(*c)).sum();
        assert_eq!(total.cents(), 2290);
    }
}
