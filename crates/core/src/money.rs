use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

use super::amount::{AmountFormat, AmountParseError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::from(cents) / Decimal::from(100))
    }

    pub fn from_decimal(decimal: Decimal) -> Self {
        Money(decimal.round_dp(2))
    }

    /// Parse an amount as written in a bank message, e.g. `"$50.000"`.
    pub fn parse(raw: &str, format: &AmountFormat) -> Result<Self, AmountParseError> {
        format.parse_amount(raw).map(Money::from_decimal)
    }

    pub fn amount(self) -> Decimal {
        self.0
    }

    pub fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }
}

impl From<Decimal> for Money {
    fn from(decimal: Decimal) -> Self {
        Money::from_decimal(decimal)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Money(self.0 - rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_cents_keeps_two_decimals() {
        assert_eq!(Money::from_cents(5_000_000).to_string(), "$50000.00");
        assert_eq!(Money::from_cents(1).amount(), Decimal::new(1, 2));
    }

    #[test]
    fn from_decimal_rounds_to_cents() {
        let m = Money::from_decimal(Decimal::new(123_456, 3));
        assert_eq!(m.amount(), Decimal::new(12_346, 2));
    }

    #[test]
    fn parses_colombian_amounts() {
        let format = AmountFormat::default();
        assert_eq!(Money::parse("$50.000", &format).unwrap(), Money::from_cents(5_000_000));
        assert!(Money::parse("$", &format).is_err());
    }

    #[test]
    fn positivity() {
        assert!(Money::from_cents(10).is_positive());
        assert!(!Money::zero().is_positive());
        assert!(Money::zero().is_zero());
    }

    #[test]
    fn arithmetic() {
        let a = Money::from_cents(750);
        let b = Money::from_cents(250);
        assert_eq!(a + b, Money::from_cents(1000));
        assert_eq!(a - b, Money::from_cents(500));
    }
}
