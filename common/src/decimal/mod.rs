//! Fixed-point utilities for token amounts and feed prices
//!
//! Ledger values are plain unsigned integers scaled by a power of ten: token
//! balances and positions carry 18 fractional digits, feed prices carry 8.
//! `rust_decimal` is only used at the edges, to parse and display
//! human-readable amounts.

use std::str::FromStr;

use num_bigint::BigUint;
use num_traits::ToPrimitive;
pub use rust_decimal::Decimal;
pub use rust_decimal_macros::dec;

use crate::error::{Error, Result};

/// Token balance or position quantity, 18 fractional digits
pub type Amount = u128;

/// Feed price, 8 fractional digits
pub type Price = u128;

/// Fractional digits of token amounts and positions
pub const TOKEN_DECIMALS: u32 = 18;

/// Fractional digits of feed prices
pub const PRICE_DECIMALS: u32 = 8;

/// One whole token in base units
pub const ONE_TOKEN: Amount = 1_000_000_000_000_000_000;

/// Computes `a * b / denominator`, truncating toward zero.
///
/// The product is widened past 128 bits so that large quantities multiplied
/// by large prices are not truncated before the division.
pub fn mul_div(a: u128, b: u128, denominator: u128) -> Result<u128> {
    if denominator == 0 {
        return Err(Error::ArithmeticOverflow(format!(
            "Division by zero in {} * {} / 0", a, b
        )));
    }

    if let Some(product) = a.checked_mul(b) {
        return Ok(product / denominator);
    }

    let quotient = BigUint::from(a) * BigUint::from(b) / BigUint::from(denominator);
    quotient.to_u128().ok_or_else(|| {
        Error::ArithmeticOverflow(format!("{} * {} / {} exceeds 128 bits", a, b, denominator))
    })
}

/// Converts a decimal value into base units with `decimals` fractional digits.
///
/// Values with more fractional digits than `decimals` are rejected rather
/// than rounded.
pub fn from_decimal(value: Decimal, decimals: u32) -> Result<u128> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(Error::ValidationError(format!("Amount must not be negative: {}", value)));
    }

    let value = value.normalize();
    let scale = value.scale();
    if scale > decimals {
        return Err(Error::DecimalError(format!(
            "{} has more than {} fractional digits", value, decimals
        )));
    }

    let mantissa = u128::try_from(value.mantissa().abs())
        .map_err(|e| Error::DecimalError(format!("Invalid mantissa for {}: {}", value, e)))?;
    let factor = 10u128.checked_pow(decimals - scale).ok_or_else(|| {
        Error::ArithmeticOverflow(format!("10^{} exceeds 128 bits", decimals - scale))
    })?;

    mantissa.checked_mul(factor).ok_or_else(|| {
        Error::ArithmeticOverflow(format!("{} scaled by 10^{} exceeds 128 bits", value, decimals))
    })
}

/// Converts base units back into a normalized decimal value
pub fn to_decimal(amount: u128, decimals: u32) -> Result<Decimal> {
    let amount = i128::try_from(amount)
        .map_err(|e| Error::DecimalError(format!("{} does not fit a decimal: {}", amount, e)))?;
    Ok(Decimal::try_from_i128_with_scale(amount, decimals)?.normalize())
}

/// Parses a human-readable amount such as `"0.018"` into base units
pub fn parse_units(value: &str, decimals: u32) -> Result<u128> {
    let parsed = Decimal::from_str(value.trim())
        .map_err(|e| Error::DecimalError(format!("Invalid amount '{}': {}", value, e)))?;
    from_decimal(parsed, decimals)
}

/// Formats base units as a human-readable amount without trailing zeros
pub fn format_units(amount: u128, decimals: u32) -> String {
    // Past 38 digits every u128 is a pure fraction
    let (whole, fraction) = match 10u128.checked_pow(decimals) {
        Some(unit) => (amount / unit, amount % unit),
        None => (0, amount),
    };

    if fraction == 0 {
        return whole.to_string();
    }

    let digits = format!("{:0width$}", fraction, width = decimals as usize);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}

/// Token helpers for the 18-digit scale
pub mod token {
    use super::*;

    /// Parse a token amount, e.g. `"6.018"`
    pub fn parse(value: &str) -> Result<Amount> {
        parse_units(value, TOKEN_DECIMALS)
    }

    /// Convert a decimal token amount into base units
    pub fn from_decimal(value: Decimal) -> Result<Amount> {
        super::from_decimal(value, TOKEN_DECIMALS)
    }

    /// Format a token amount for display
    pub fn format(amount: Amount) -> String {
        format_units(amount, TOKEN_DECIMALS)
    }
}

/// Price helpers for the 8-digit scale
pub mod price {
    use super::*;

    /// Parse a feed price, e.g. `"600"`
    pub fn parse(value: &str) -> Result<Price> {
        parse_units(value, PRICE_DECIMALS)
    }

    /// Convert a decimal price into feed units
    pub fn from_decimal(value: Decimal) -> Result<Price> {
        super::from_decimal(value, PRICE_DECIMALS)
    }

    /// Format a feed price for display
    pub fn format(price: Price) -> String {
        format_units(price, PRICE_DECIMALS)
    }
}

/// Serde adapter for base-unit amounts as decimal strings, e.g.
/// `"6018000000000000000"`. Internally tagged enums cannot buffer `u128`.
pub mod base_units {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(amount: &u128, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(amount)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<u128, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse::<u128>()
            .map_err(|e| de::Error::custom(format!("invalid base-unit amount '{}': {}", raw, e)))
    }
}
