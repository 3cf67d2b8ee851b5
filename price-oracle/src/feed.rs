//! Price feed sources

use common::decimal::{price, Decimal, Price};
use common::error::{Error, Result};
use rand::Rng;

/// A read-only source of the current price of one asset.
///
/// Prices carry 8 fractional digits. Implementations are queried on every
/// read; nothing is cached by the registry.
pub trait PriceFeed: Send + Sync {
    /// Current price quoted by the feed
    fn latest_price(&self) -> Result<Price>;

    /// Human-readable name of the feed
    fn description(&self) -> String {
        "unnamed feed".to_string()
    }
}

/// Feed that always quotes the same price
#[derive(Debug, Clone)]
pub struct FixedPriceFeed {
    price: Price,
    description: String,
}

impl FixedPriceFeed {
    /// Create a feed quoting `value` in feed units
    pub fn new(value: Price) -> Self {
        Self {
            price: value,
            description: format!("fixed {}", price::format(value)),
        }
    }

    /// Create a feed from a decimal price such as `dec!(600)`
    pub fn from_decimal(value: Decimal) -> Result<Self> {
        Ok(Self::new(price::from_decimal(value)?))
    }

    /// Override the feed description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl PriceFeed for FixedPriceFeed {
    fn latest_price(&self) -> Result<Price> {
        Ok(self.price)
    }

    fn description(&self) -> String {
        self.description.clone()
    }
}

/// Feed that quotes a uniformly random price within an inclusive range on
/// every read
#[derive(Debug, Clone)]
pub struct RandomPriceFeed {
    min: Price,
    max: Price,
}

impl RandomPriceFeed {
    /// Create a feed quoting prices in `min..=max`
    pub fn new(min: Price, max: Price) -> Result<Self> {
        if min == 0 || min > max {
            return Err(Error::ValidationError(format!(
                "Invalid random price range {}..={}", min, max
            )));
        }

        Ok(Self { min, max })
    }
}

impl PriceFeed for RandomPriceFeed {
    fn latest_price(&self) -> Result<Price> {
        Ok(rand::thread_rng().gen_range(self.min..=self.max))
    }

    fn description(&self) -> String {
        format!("random {}..={}", price::format(self.min), price::format(self.max))
    }
}
