//! Type-safe price representation using decimal arithmetic.
//!
//! A [`Price`] is always strictly positive and carries at most
//! [`MAX_PRICE_SCALE`] digits after the decimal point. Trailing zeros do not
//! count towards the scale, so `1.50000` is accepted and stored as `1.5`.
//!
//! Prices serialize as JSON numbers. There is no `Deserialize` impl; untrusted
//! input goes through [`Price::new`] or [`Price::parse`].

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

/// Maximum number of fractional digits a price may carry.
pub const MAX_PRICE_SCALE: u32 = 4;

/// Reasons a decimal value is not a valid price.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("price must be a number")]
    NotANumber,
    #[error("price is out of range")]
    OutOfRange,
    #[error("price must be a positive number")]
    NotPositive,
    #[error("price must not have more than {MAX_PRICE_SCALE} decimal places (got {0})")]
    TooManyDecimalPlaces(u32),
}

/// A validated, strictly positive product price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// Validate a decimal amount as a price.
    ///
    /// # Errors
    ///
    /// Returns the first rule reported by [`Price::violations`].
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        match Self::violations(amount).into_iter().next() {
            Some(err) => Err(err),
            None => Ok(Self(amount.normalize())),
        }
    }

    /// Parse a price from its textual form.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::NotANumber` if the text is not numeric, otherwise
    /// the same errors as [`Price::new`].
    pub fn parse(text: &str) -> Result<Self, PriceError> {
        Self::new(Self::parse_amount(text)?)
    }

    /// Parse a decimal amount without applying the price rules.
    ///
    /// Accepts plain decimals (`"1.50"`) and scientific notation (`"1.5e2"`).
    ///
    /// # Errors
    ///
    /// Returns `PriceError::NotANumber` if the text is not numeric, and
    /// `PriceError::OutOfRange` if it is a finite number that a decimal cannot
    /// hold (such as `1e30`).
    pub fn parse_amount(text: &str) -> Result<Decimal, PriceError> {
        let text = text.trim();
        Decimal::from_str(text)
            .or_else(|_| Decimal::from_scientific(text))
            .map_err(|_| {
                if text.parse::<f64>().is_ok_and(f64::is_finite) {
                    PriceError::OutOfRange
                } else {
                    PriceError::NotANumber
                }
            })
    }

    /// Every price rule `amount` violates, in rule order.
    ///
    /// An empty vector means `amount` is a valid price.
    #[must_use]
    pub fn violations(amount: Decimal) -> Vec<PriceError> {
        let mut errors = Vec::new();
        if amount <= Decimal::ZERO {
            errors.push(PriceError::NotPositive);
        }
        let scale = amount.normalize().scale();
        if scale > MAX_PRICE_SCALE {
            errors.push(PriceError::TooManyDecimalPlaces(scale));
        }
        errors
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_price_accepts_positive_amounts() {
        let price = Price::parse("1.50").unwrap();
        assert_eq!(price.amount(), Decimal::new(15, 1));
        assert_eq!(price.to_string(), "1.5");
    }

    #[test]
    fn test_price_rejects_zero_and_negative() {
        assert_eq!(Price::parse("0"), Err(PriceError::NotPositive));
        assert_eq!(Price::parse("-3.2"), Err(PriceError::NotPositive));
    }

    #[test]
    fn test_price_scale_limit() {
        assert!(Price::parse("9.9999").is_ok());
        assert_eq!(
            Price::parse("9.99999"),
            Err(PriceError::TooManyDecimalPlaces(5))
        );
    }

    #[test]
    fn test_price_trailing_zeros_do_not_count() {
        let price = Price::parse("2.500000").unwrap();
        assert_eq!(price.amount().scale(), 1);
    }

    #[test]
    fn test_price_scientific_notation() {
        assert_eq!(Price::parse("1.5e2").unwrap().amount(), Decimal::new(150, 0));
    }

    #[test]
    fn test_price_rejects_garbage() {
        assert_eq!(Price::parse("abc"), Err(PriceError::NotANumber));
        assert_eq!(Price::parse(""), Err(PriceError::NotANumber));
    }

    #[test]
    fn test_price_overflowing_number_is_out_of_range() {
        assert_eq!(Price::parse("1e30"), Err(PriceError::OutOfRange));
        assert_eq!(Price::parse_amount("-1e30"), Err(PriceError::OutOfRange));
        assert_eq!(Price::parse("inf"), Err(PriceError::NotANumber));
        assert_eq!(Price::parse("NaN"), Err(PriceError::NotANumber));
    }

    #[test]
    fn test_price_reports_every_violation() {
        let amount = Price::parse_amount("-0.12345").unwrap();
        assert_eq!(
            Price::violations(amount),
            vec![
                PriceError::NotPositive,
                PriceError::TooManyDecimalPlaces(5)
            ]
        );
    }

    #[test]
    fn test_price_serializes_as_number() {
        let price = Price::parse("1.50").unwrap();
        assert_eq!(serde_json::to_value(price).unwrap(), serde_json::json!(1.5));
    }
}
