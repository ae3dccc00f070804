//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are stored and computed as [`rust_decimal::Decimal`] in the
//! currency's standard unit (dollars, not cents). The payment provider
//! wants minor units, so [`Price::minor_units`] converts by scaling and
//! rounding up, matching how the checkout total is charged.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors constructing a [`Price`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// Prices must be strictly positive.
    #[error("price must be greater than zero")]
    NotPositive,
    /// The amount does not fit in minor units.
    #[error("price too large")]
    Overflow,
}

/// A positive amount of money in a single currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    amount: Decimal,
    /// ISO 4217 currency code.
    currency: CurrencyCode,
}

impl Price {
    /// Create a new price.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::NotPositive`] when the amount is zero or
    /// negative.
    pub fn new(amount: Decimal, currency: CurrencyCode) -> Result<Self, PriceError> {
        if amount <= Decimal::ZERO {
            return Err(PriceError::NotPositive);
        }
        Ok(Self { amount, currency })
    }

    /// The amount in the currency's standard unit.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }

    /// The currency of this price.
    #[must_use]
    pub const fn currency(&self) -> CurrencyCode {
        self.currency
    }

    /// The amount in minor units (cents), rounded up.
    ///
    /// Rounding up rather than to-nearest means a fractional-cent price is
    /// never undercharged.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Overflow`] when the scaled amount exceeds `i64`.
    pub fn minor_units(&self) -> Result<i64, PriceError> {
        (self.amount * Decimal::from(100))
            .ceil()
            .to_i64()
            .ok_or(PriceError::Overflow)
    }

    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        format!("{}{:.2}", self.currency.symbol(), self.amount)
    }
}

/// ISO 4217 currency codes supported by the shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// The display symbol for this currency.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "\u{20ac}",
            Self::GBP => "\u{a3}",
        }
    }

    /// The lowercase ISO code the payment provider expects.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::USD => "usd",
            Self::EUR => "eur",
            Self::GBP => "gbp",
            Self::CAD => "cad",
            Self::AUD => "aud",
        }
    }

    /// Parse a currency code, case-insensitively.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "usd" => Some(Self::USD),
            "eur" => Some(Self::EUR),
            "gbp" => Some(Self::GBP),
            "cad" => Some(Self::CAD),
            "aud" => Some(Self::AUD),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd(cents: i64) -> Price {
        Price::new(Decimal::new(cents, 2), CurrencyCode::USD).expect("positive")
    }

    #[test]
    fn rejects_non_positive_amounts() {
        assert_eq!(
            Price::new(Decimal::ZERO, CurrencyCode::USD),
            Err(PriceError::NotPositive)
        );
        assert_eq!(
            Price::new(Decimal::new(-100, 2), CurrencyCode::USD),
            Err(PriceError::NotPositive)
        );
    }

    #[test]
    fn converts_to_minor_units() {
        assert_eq!(usd(1999).minor_units(), Ok(1999));
        assert_eq!(usd(100).minor_units(), Ok(100));
    }

    #[test]
    fn minor_units_round_up() {
        // 10.005 dollars -> 1001 cents, never 1000
        let price = Price::new(Decimal::new(10_005, 3), CurrencyCode::USD).expect("positive");
        assert_eq!(price.minor_units(), Ok(1001));
    }

    #[test]
    fn formats_for_display() {
        assert_eq!(usd(1999).display(), "$19.99");
        assert_eq!(usd(500).display(), "$5.00");
    }

    #[test]
    fn parses_currency_codes() {
        assert_eq!(CurrencyCode::parse("USD"), Some(CurrencyCode::USD));
        assert_eq!(CurrencyCode::parse("eur"), Some(CurrencyCode::EUR));
        assert_eq!(CurrencyCode::parse("yen"), None);
    }
}
