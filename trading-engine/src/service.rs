//! Serialized access to a shared trading engine

use std::sync::Arc;

use common::decimal::{token, Amount, Price};
use common::error::Result;
use common::model::{AccountSummary, Address, LedgerEvent, Ticker};
use price_oracle::PriceFeed;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::VirtualsConfig;
use crate::engine::{Quote, TradingEngine};

/// Async front end for a [`TradingEngine`].
///
/// Every call, read or write, runs under one lock over the whole engine, so
/// operations apply in a strict total order and a trade's price reads happen
/// in the same critical section as its ledger updates.
#[derive(Clone)]
pub struct VirtualsService {
    engine: Arc<Mutex<TradingEngine>>,
}

fn log_rejection<T>(operation: &str, caller: &Address, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        warn!("{} by {} rejected: {}", operation, caller, e);
    }
    result
}

impl VirtualsService {
    /// Wrap an engine
    pub fn new(engine: TradingEngine) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
        }
    }

    /// Create a service with a new engine built from configuration
    pub fn with_config(config: &VirtualsConfig) -> Result<Self> {
        info!(
            "Starting Virtuals ledger: supply {} VRT, owner {}, fee reserve {}",
            token::format(config.initial_supply), config.owner, config.contract_address
        );
        Ok(Self::new(TradingEngine::with_config(config)?))
    }

    /// Register or replace the feed for `ticker`
    pub async fn add_or_update_price_feed(
        &self,
        caller: &Address,
        ticker: &str,
        feed: Arc<dyn PriceFeed>,
    ) -> Result<()> {
        let ticker = Ticker::new(ticker)?;
        let mut engine = self.engine.lock().await;
        let result = engine.add_or_update_price_feed(caller, ticker, feed);
        log_rejection("Price feed update", caller, result)
    }

    /// Hand the owner role to `new_owner`
    pub async fn transfer_ownership(&self, caller: &Address, new_owner: Address) -> Result<()> {
        let mut engine = self.engine.lock().await;
        log_rejection("Ownership transfer", caller, engine.transfer_ownership(caller, new_owner))
    }

    /// Move VRT from the caller to `to`
    pub async fn transfer(&self, caller: &Address, to: &Address, amount: Amount) -> Result<()> {
        info!("Transferring {} VRT from {} to {}", token::format(amount), caller, to);
        let mut engine = self.engine.lock().await;
        log_rejection("Transfer", caller, engine.transfer(caller, to, amount))
    }

    /// Allow `spender` to move up to `amount` of the caller's VRT
    pub async fn approve(&self, caller: &Address, spender: &Address, amount: Amount) {
        let mut engine = self.engine.lock().await;
        engine.approve(caller, spender, amount);
    }

    /// Move VRT from `from` to `to` against the caller's allowance
    pub async fn transfer_from(
        &self,
        caller: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<()> {
        let mut engine = self.engine.lock().await;
        log_rejection("Delegated transfer", caller, engine.transfer_from(caller, from, to, amount))
    }

    /// Buy `asset_quantity` of `ticker`
    pub async fn buy(
        &self,
        caller: &Address,
        ticker: &str,
        asset_quantity: Amount,
    ) -> Result<Quote> {
        let ticker = Ticker::new(ticker)?;
        let mut engine = self.engine.lock().await;
        log_rejection("Buy", caller, engine.buy(caller, &ticker, asset_quantity))
    }

    /// Sell `asset_quantity` of `ticker`
    pub async fn sell(
        &self,
        caller: &Address,
        ticker: &str,
        asset_quantity: Amount,
    ) -> Result<Quote> {
        let ticker = Ticker::new(ticker)?;
        let mut engine = self.engine.lock().await;
        log_rejection("Sell", caller, engine.sell(caller, &ticker, asset_quantity))
    }

    /// Price a trade without executing it
    pub async fn quote(&self, ticker: &str, asset_quantity: Amount) -> Result<Quote> {
        let ticker = Ticker::new(ticker)?;
        self.engine.lock().await.quote(&ticker, asset_quantity)
    }

    /// Current feed price of `ticker`
    pub async fn price_of(&self, ticker: &str) -> Result<Price> {
        let ticker = Ticker::new(ticker)?;
        self.engine.lock().await.price_of(&ticker)
    }

    /// VRT balance of `account`
    pub async fn balance_of(&self, account: &Address) -> Amount {
        self.engine.lock().await.balance_of(account)
    }

    /// Position of `account` in `ticker`
    pub async fn position_of(&self, account: &Address, ticker: &str) -> Result<Amount> {
        let ticker = Ticker::new(ticker)?;
        Ok(self.engine.lock().await.position_of(account, &ticker))
    }

    /// Balance and positions of `account`
    pub async fn account(&self, account: &Address) -> AccountSummary {
        self.engine.lock().await.account(account)
    }

    /// Tokens in existence
    pub async fn total_supply(&self) -> Amount {
        self.engine.lock().await.total_supply()
    }

    /// Fees collected so far
    pub async fn fee_reserve(&self) -> Amount {
        self.engine.lock().await.fee_reserve()
    }

    /// Committed events from `sequence` on
    pub async fn events_since(&self, sequence: u64) -> Vec<LedgerEvent> {
        self.engine.lock().await.events_since(sequence).to_vec()
    }

    /// Run a read-only closure against a consistent view of the engine
    pub async fn inspect<R>(&self, f: impl FnOnce(&TradingEngine) -> R) -> R {
        let engine = self.engine.lock().await;
        f(&engine)
    }
}
