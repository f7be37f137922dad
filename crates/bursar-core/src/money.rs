//! # Money — Exact Fixed-Point Monetary Amounts
//!
//! All monetary quantities in the fee engine are exact decimals with 2
//! fraction digits. Floats are rejected at the type level: there is no
//! constructor from `f64`, and serialization is a decimal string
//! (`"15000.00"`), never a JSON number, so no consumer can smuggle binary
//! representation error back in.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

use crate::error::FeeRuleError;

/// An exact monetary amount with 2 fraction digits.
///
/// The inner decimal is always rescaled to exactly 2 fraction digits at
/// construction. Arithmetic between `Money` values stays at scale 2.
/// On the wire this is always a decimal string with exactly two fraction
/// digits (`"15000.00"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Money(Decimal);

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Money::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl Money {
    /// Zero amount.
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Construct from a decimal, rejecting more than 2 fraction digits.
    pub fn new(value: Decimal) -> Result<Self, FeeRuleError> {
        if value.scale() > 2 {
            return Err(FeeRuleError::InvalidAmount(format!(
                "amount {value} has more than 2 fraction digits"
            )));
        }
        let mut v = value;
        v.rescale(2);
        Ok(Self(v))
    }

    /// Construct an amount that must be strictly positive.
    pub fn positive(value: Decimal) -> Result<Self, FeeRuleError> {
        let m = Self::new(value)?;
        if !m.is_positive() {
            return Err(FeeRuleError::InvalidAmount(format!(
                "amount must be greater than zero, got {m}"
            )));
        }
        Ok(m)
    }

    /// The inner decimal (scale 2).
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Whether this amount is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Whether this amount is strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Saturating subtraction: never goes below zero.
    ///
    /// Used when recomputing `final_amount` from the active discount sum;
    /// the cap check keeps the true result non-negative, this is the
    /// belt for the arithmetic itself.
    pub fn saturating_sub(&self, other: Money) -> Money {
        let d = self.0 - other.0;
        if d < Decimal::ZERO {
            Money(Decimal::new(0, 2))
        } else {
            Money(d)
        }
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Scale is fixed at 2, so Display always prints two fraction digits.
        let mut v = self.0;
        v.rescale(2);
        write!(f, "{v}")
    }
}

impl FromStr for Money {
    type Err = FeeRuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let d = Decimal::from_str(s)
            .map_err(|e| FeeRuleError::InvalidAmount(format!("unparseable amount {s:?}: {e}")))?;
        Money::new(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rescales_to_two_fraction_digits() {
        let m = Money::new(dec!(15000)).unwrap();
        assert_eq!(m.to_string(), "15000.00");
        let m = Money::new(dec!(99.9)).unwrap();
        assert_eq!(m.to_string(), "99.90");
    }

    #[test]
    fn test_rejects_excess_scale() {
        assert!(Money::new(dec!(10.001)).is_err());
    }

    #[test]
    fn test_positive_rejects_zero_and_negative() {
        assert!(Money::positive(dec!(0)).is_err());
        assert!(Money::positive(dec!(-5)).is_err());
        assert!(Money::positive(dec!(0.01)).is_ok());
    }

    #[test]
    fn test_arithmetic_stays_exact() {
        let a = Money::from_str("0.10").unwrap();
        let b = Money::from_str("0.20").unwrap();
        assert_eq!((a + b).to_string(), "0.30");
        assert_eq!((b - a).to_string(), "0.10");
    }

    #[test]
    fn test_saturating_sub_floors_at_zero() {
        let a = Money::new(dec!(100)).unwrap();
        let b = Money::new(dec!(250)).unwrap();
        assert_eq!(a.saturating_sub(b), Money::ZERO);
        assert_eq!(b.saturating_sub(a).to_string(), "150.00");
    }

    #[test]
    fn test_serializes_as_decimal_string() {
        let m = Money::from_str("123.45").unwrap();
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, "\"123.45\"");
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn test_sum_over_iterator() {
        let total: Money = [dec!(10.50), dec!(4.25), dec!(0.25)]
            .into_iter()
            .map(|d| Money::new(d).unwrap())
            .sum();
        assert_eq!(total.to_string(), "15.00");
    }
}
