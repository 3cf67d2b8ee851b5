//! Ticker to price feed registry

use std::collections::HashMap;
use std::sync::Arc;

use common::decimal::Price;
use common::error::{Error, Result};
use common::model::{Address, Ticker};
use tracing::{debug, info, warn};

use crate::feed::PriceFeed;

/// Registry holding at most one live feed per ticker.
///
/// Registration is restricted to a single owner address. Reads always go to
/// the registered feed.
pub struct PriceOracleRegistry {
    /// Privileged owner
    owner: Address,
    /// Feeds by ticker
    feeds: HashMap<Ticker, Arc<dyn PriceFeed>>,
}

impl PriceOracleRegistry {
    /// Create an empty registry owned by `owner`
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            feeds: HashMap::new(),
        }
    }

    /// Current owner
    pub fn owner(&self) -> Address {
        self.owner
    }

    fn ensure_owner(&self, caller: &Address) -> Result<()> {
        if *caller != self.owner {
            warn!("Rejected privileged call from {}", caller);
            return Err(Error::Unauthorized(format!("{} is not the owner", caller)));
        }
        Ok(())
    }

    /// Register or replace the feed for `ticker`, returning the replaced feed
    pub fn add_or_update_price_feed(
        &mut self,
        caller: &Address,
        ticker: Ticker,
        feed: Arc<dyn PriceFeed>,
    ) -> Result<Option<Arc<dyn PriceFeed>>> {
        self.ensure_owner(caller)?;

        info!("Registering price feed for {}: {}", ticker, feed.description());
        Ok(self.feeds.insert(ticker, feed))
    }

    /// Hand the owner role to another address, returning the previous owner
    pub fn transfer_ownership(&mut self, caller: &Address, new_owner: Address) -> Result<Address> {
        self.ensure_owner(caller)?;

        info!("Transferring registry ownership from {} to {}", self.owner, new_owner);
        Ok(std::mem::replace(&mut self.owner, new_owner))
    }

    /// Read the current price for `ticker` from its feed
    pub fn price_of(&self, ticker: &Ticker) -> Result<Price> {
        let feed = self.feed(ticker)?;
        let price = feed.latest_price()?;

        if price == 0 {
            return Err(Error::InvalidPrice(format!(
                "Feed '{}' for {} quoted zero", feed.description(), ticker
            )));
        }

        debug!("Price of {} is {}", ticker, price);
        Ok(price)
    }

    /// Description of the feed registered for `ticker`
    pub fn feed_description(&self, ticker: &Ticker) -> Result<String> {
        Ok(self.feed(ticker)?.description())
    }

    /// Whether a feed is registered for `ticker`
    pub fn is_registered(&self, ticker: &Ticker) -> bool {
        self.feeds.contains_key(ticker)
    }

    /// Registered tickers in alphabetical order
    pub fn tickers(&self) -> Vec<Ticker> {
        let mut tickers: Vec<Ticker> = self.feeds.keys().cloned().collect();
        tickers.sort();
        tickers
    }

    fn feed(&self, ticker: &Ticker) -> Result<&Arc<dyn PriceFeed>> {
        self.feeds
            .get(ticker)
            .ok_or_else(|| Error::UnknownTicker(format!("No price feed registered for {}", ticker)))
    }
}
