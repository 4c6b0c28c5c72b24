//! Unit price using decimal arithmetic.
//!
//! The backend stores prices in a decimal column and serialises them as
//! strings (`"19.99"`), so prices never pass through binary floating point.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is not a decimal number.
    #[error("price must be a decimal number, got {0:?}")]
    Invalid(String),
    /// The input is below zero.
    #[error("price cannot be negative")]
    Negative,
}

/// A unit price in the store's currency.
///
/// Values received from the server are trusted as-is; [`Price::parse`]
/// validates values typed in by an operator.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Wrap an already-validated decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Parse a price from operator input such as `"19.99"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a decimal or is negative.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let amount =
            Decimal::from_str(s.trim()).map_err(|_| PriceError::Invalid(s.to_owned()))?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount))
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Form-field representation (plain decimal, no currency symbol).
    #[must_use]
    pub fn to_form_value(&self) -> String {
        self.0.normalize().to_string()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let price = Price::parse("19.99").unwrap();
        assert_eq!(price.amount(), Decimal::new(1999, 2));
        assert_eq!(Price::parse(" 5 ").unwrap().amount(), Decimal::new(5, 0));
        assert!(Price::parse("0").is_ok());
    }

    #[test]
    fn test_parse_rejects_garbage_and_negative() {
        assert!(matches!(Price::parse("abc"), Err(PriceError::Invalid(_))));
        assert!(matches!(Price::parse("-1.00"), Err(PriceError::Negative)));
    }

    #[test]
    fn test_display_uses_two_places() {
        assert_eq!(Price::parse("3.5").unwrap().to_string(), "$3.50");
    }

    #[test]
    fn test_form_value_is_plain_decimal() {
        assert_eq!(Price::parse("12.50").unwrap().to_form_value(), "12.5");
    }

    #[test]
    fn test_deserializes_from_decimal_string() {
        let price: Price = serde_json::from_str("\"24.00\"").unwrap();
        assert_eq!(price.amount(), Decimal::new(2400, 2));
    }
}
