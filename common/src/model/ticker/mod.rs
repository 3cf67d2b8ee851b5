//! Asset tickers

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Longest accepted ticker
pub const MAX_TICKER_LENGTH: usize = 16;

/// Asset ticker such as `BTC` or `VRT`.
///
/// Tickers are ASCII alphanumeric and normalized to uppercase, so `btc` and
/// `BTC` name the same asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    /// Validate and normalize a ticker
    pub fn new(symbol: &str) -> Result<Self> {
        let symbol = symbol.trim();

        if symbol.is_empty() {
            return Err(Error::ValidationError("Ticker must not be empty".to_string()));
        }

        if symbol.len() > MAX_TICKER_LENGTH {
            return Err(Error::ValidationError(format!(
                "Ticker '{}' is longer than {} characters", symbol, MAX_TICKER_LENGTH
            )));
        }

        if !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::ValidationError(format!(
                "Ticker '{}' must be ASCII alphanumeric", symbol
            )));
        }

        Ok(Self(symbol.to_ascii_uppercase()))
    }

    /// The ticker as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Ticker {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ticker::new(s)
    }
}

impl TryFrom<String> for Ticker {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Ticker::new(&value)
    }
}

impl From<Ticker> for String {
    fn from(ticker: Ticker) -> Self {
        ticker.0
    }
}

impl Borrow<str> for Ticker {
    fn borrow(&self) -> &str {
        &self.0
    }
}
