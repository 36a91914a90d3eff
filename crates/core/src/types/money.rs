//! Decimal price values as they are stored and shown.
//!
//! A [`Money`] keeps the exact text it was parsed from (so `"80.00"` stays
//! `"80.00"`) alongside the parsed [`Decimal`]. There is no "empty" money:
//! an unset price is `Option<Money>::None`, which keeps "unset" and `"0"`
//! apart everywhere in the crate.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Money`] value.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// The input string is empty.
    #[error("price cannot be empty")]
    Empty,
    /// The input is not a decimal number.
    #[error("price is not a decimal number: {0:?}")]
    Invalid(String),
    /// The input is a negative number.
    #[error("price cannot be negative: {0}")]
    Negative(String),
}

/// A non-negative decimal price.
///
/// ## Examples
///
/// ```
/// use role_pricing_core::Money;
///
/// let price = Money::parse("80.00").unwrap();
/// assert_eq!(price.as_str(), "80.00");
///
/// // Zero is a real price, not an absent one.
/// assert!(Money::parse("0").unwrap().is_zero());
///
/// assert!(Money::parse("").is_err());
/// assert!(Money::parse("-1").is_err());
/// assert!(Money::parse("abc").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Money {
    text: String,
    amount: Decimal,
}

impl Money {
    /// Parse a `Money` from its decimal text.
    ///
    /// Surrounding whitespace is ignored; the remaining text is kept verbatim.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, not a plain decimal number, or
    /// negative.
    pub fn parse(s: &str) -> Result<Self, MoneyError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(MoneyError::Empty);
        }

        if trimmed.strip_prefix('-').is_some_and(is_plain_decimal) {
            return Err(MoneyError::Negative(trimmed.to_owned()));
        }
        if !is_plain_decimal(trimmed) {
            return Err(MoneyError::Invalid(trimmed.to_owned()));
        }

        let amount =
            Decimal::from_str(trimmed).map_err(|_| MoneyError::Invalid(trimmed.to_owned()))?;

        Ok(Self {
            text: trimmed.to_owned(),
            amount,
        })
    }

    /// Read a value from the override store.
    ///
    /// The empty string is the store's "unset" sentinel and yields `None`.
    /// Anything that does not parse is also treated as unset so that a bad
    /// row can never break price display or checkout.
    #[must_use]
    pub fn from_stored(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            return None;
        }

        match Self::parse(raw) {
            Ok(money) => Some(money),
            Err(e) => {
                tracing::warn!(raw = %raw, error = %e, "Ignoring malformed stored price");
                None
            }
        }
    }

    /// Normalize a price typed into an admin form.
    ///
    /// Empty input means "clear this price" and yields `Ok(None)`. A single
    /// decimal comma is accepted in place of a decimal point.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a non-negative decimal number.
    pub fn from_input(input: &str) -> Result<Option<Self>, MoneyError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        let normalized = if !trimmed.contains('.') && trimmed.matches(',').count() == 1 {
            trimmed.replace(',', ".")
        } else {
            trimmed.to_owned()
        };

        Self::parse(&normalized).map(Some)
    }

    /// Returns the price text exactly as stored.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns the parsed decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }

    /// Returns true if the price is zero (free).
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Consumes the `Money` and returns its text.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.text
    }
}

/// Digits, optionally followed by a `.` and more digits.
fn is_plain_decimal(s: &str) -> bool {
    let (whole, fraction) = s.split_once('.').unwrap_or((s, "0"));
    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    all_digits(whole) && all_digits(fraction)
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Money {
    type Error = MoneyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Money> for String {
    fn from(money: Money) -> Self {
        money.text
    }
}

impl AsRef<str> for Money {
    fn as_ref(&self) -> &str {
        &self.text
    }
}
