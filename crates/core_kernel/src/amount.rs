//! Exact decimal amounts for credit balances
//!
//! Balances and deltas are carried as [`Amount`], a thin wrapper over
//! `rust_decimal::Decimal`. Amounts cross every boundary (storage, dispatch,
//! HTTP) as canonical decimal strings and never as binary floating point, so
//! equality and ordering are unambiguous wherever a value is read back.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur when parsing or combining amounts
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Invalid amount: '{0}' is not a decimal number")]
    Malformed(String),

    #[error("Invalid amount: {0} must be greater than zero")]
    NotPositive(String),

    #[error("Invalid amount: {0} must not be negative")]
    Negative(String),

    #[error("Invalid amount: result cannot be represented exactly")]
    Overflow,
}

/// An exact, base-10 credit amount
///
/// Values are kept normalized (no trailing fractional zeros, no negative
/// zero) so the `Display` output is the canonical persisted form:
/// `"100.50"` is stored as `"100.5"`, `"-0"` as `"0"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Amount(Decimal);

impl Amount {
    /// The zero amount
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Wraps a decimal, normalizing it to canonical form
    pub fn new(value: Decimal) -> Self {
        Self(value.normalize())
    }

    /// Parses a plain decimal literal (`[+-]digits[.digits]`)
    ///
    /// Exponents, digit separators, surrounding whitespace and values that
    /// would need rounding to fit are rejected.
    ///
    /// # Errors
    ///
    /// Returns `AmountError::Malformed` if the input is not a decimal literal
    pub fn parse(input: &str) -> Result<Self, AmountError> {
        if !is_decimal_literal(input) {
            return Err(AmountError::Malformed(input.to_string()));
        }
        Decimal::from_str_exact(input)
            .map(Self::new)
            .map_err(|_| AmountError::Malformed(input.to_string()))
    }

    /// Parses an amount that must be strictly greater than zero
    pub fn parse_positive(input: &str) -> Result<Self, AmountError> {
        Self::parse(input)?.require_positive()
    }

    /// Parses an amount that must be zero or greater
    pub fn parse_non_negative(input: &str) -> Result<Self, AmountError> {
        Self::parse(input)?.require_non_negative()
    }

    /// Returns the underlying decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is strictly positive
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Returns true if the amount is strictly negative
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    pub fn require_positive(self) -> Result<Self, AmountError> {
        if self.is_positive() {
            Ok(self)
        } else {
            Err(AmountError::NotPositive(self.to_string()))
        }
    }

    pub fn require_non_negative(self) -> Result<Self, AmountError> {
        if self.is_negative() {
            Err(AmountError::Negative(self.to_string()))
        } else {
            Ok(self)
        }
    }

    /// Exact addition
    ///
    /// `Decimal` drops fractional digits instead of failing when a result no
    /// longer fits its 96-bit mantissa, so a result with a reduced scale is
    /// rejected.
    pub fn checked_add(self, other: Amount) -> Result<Amount, AmountError> {
        let sum = self.0.checked_add(other.0).ok_or(AmountError::Overflow)?;
        self.exact(other, sum)
    }

    /// Exact subtraction, with the same scale check as `checked_add`
    pub fn checked_sub(self, other: Amount) -> Result<Amount, AmountError> {
        let difference = self.0.checked_sub(other.0).ok_or(AmountError::Overflow)?;
        self.exact(other, difference)
    }

    fn exact(self, other: Amount, result: Decimal) -> Result<Amount, AmountError> {
        if result.scale() < self.0.scale().max(other.0.scale()) {
            return Err(AmountError::Overflow);
        }
        Ok(Self::new(result))
    }
}

/// Accepts `[+-]?[0-9]+(\.[0-9]+)?`
fn is_decimal_literal(input: &str) -> bool {
    let unsigned = input
        .strip_prefix('-')
        .or_else(|| input.strip_prefix('+'))
        .unwrap_or(input);

    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (unsigned, None),
    };

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    all_digits(whole) && fraction.map_or(true, all_digits)
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Self::new(value)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Amount::parse(&raw).map_err(serde::de::Error::custom)
    }
}
