//! Buy/sell engine composing the oracle registry with the ledgers

use std::collections::BTreeMap;
use std::sync::Arc;

use common::decimal::{mul_div, token, Amount, Price, TOKEN_DECIMALS};
use common::error::{Error, ErrorExt, Result};
use common::model::{AccountSummary, Address, EventKind, LedgerEvent, Ticker};
use ledger_service::Ledger;
use price_oracle::{PriceFeed, PriceOracleRegistry};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::VirtualsConfig;

/// Token name
pub const NAME: &str = "Virtuals";

/// Token symbol
pub const SYMBOL: &str = "VRT";

/// Fractional digits of VRT amounts
pub const DECIMALS: u32 = TOKEN_DECIMALS;

/// Ticker whose feed prices VRT itself
pub const BASE_TICKER: &str = SYMBOL;

/// Fee rate numerator (0.3%)
pub const FEE_NUMERATOR: u128 = 3;

/// Fee rate denominator
pub const FEE_DENOMINATOR: u128 = 1000;

/// Trading fee on a converted token amount, truncated toward zero
pub fn fee_for(amount: Amount) -> Result<Amount> {
    mul_div(amount, FEE_NUMERATOR, FEE_DENOMINATOR)
}

/// Pricing of one trade at the prices read when it was quoted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quote {
    /// Position quantity bought or sold
    pub asset_quantity: Amount,
    /// Feed price of the asset
    pub asset_price: Price,
    /// Feed price of VRT
    pub base_price: Price,
    /// VRT equivalent of the position quantity
    pub token_amount: Amount,
    /// Fee charged on `token_amount`
    pub fee: Amount,
}

/// Buy/sell engine over the VRT ledger.
///
/// Every operation takes `&mut self` or `&self`, so callers that share an
/// engine must serialize access to it; see [`crate::VirtualsService`].
pub struct TradingEngine {
    /// Engine's own account, which accumulates fees
    address: Address,
    /// Ticker of the VRT feed
    base_ticker: Ticker,
    /// Price feeds
    oracle: PriceOracleRegistry,
    /// Balances, positions and events
    ledger: Ledger,
}

fn fee_error(error: Error) -> Error {
    match error {
        Error::InsufficientBalance(msg) => Error::InsufficientFeeBalance(msg),
        other => other,
    }
}

fn burn_error(error: Error) -> Error {
    match error {
        Error::InsufficientBalance(msg) => Error::BurnExceedsBalance(msg),
        other => other,
    }
}

impl TradingEngine {
    /// Create an engine whose owner holds the whole initial supply
    pub fn new(owner: Address, address: Address, initial_supply: Amount) -> Result<Self> {
        Ok(Self {
            address,
            base_ticker: Ticker::new(BASE_TICKER)?,
            oracle: PriceOracleRegistry::new(owner),
            ledger: Ledger::with_genesis(owner, initial_supply)?,
        })
    }

    /// Create an engine from configuration
    pub fn with_config(config: &VirtualsConfig) -> Result<Self> {
        let mut engine = Self::new(config.owner, config.contract_address, config.initial_supply)?;
        engine.ledger.set_event_logging(config.event_logging);
        Ok(engine)
    }

    /// Token name
    pub fn name(&self) -> &'static str {
        NAME
    }

    /// Token symbol
    pub fn symbol(&self) -> &'static str {
        SYMBOL
    }

    /// Fractional digits of VRT amounts
    pub fn decimals(&self) -> u32 {
        DECIMALS
    }

    /// Privileged owner
    pub fn owner(&self) -> Address {
        self.oracle.owner()
    }

    /// Engine's own account
    pub fn address(&self) -> Address {
        self.address
    }

    /// Tokens in existence
    pub fn total_supply(&self) -> Amount {
        self.ledger.balances().total_supply()
    }

    /// VRT balance of `account`
    pub fn balance_of(&self, account: &Address) -> Amount {
        self.ledger.balances().balance_of(account)
    }

    /// Fees collected so far
    pub fn fee_reserve(&self) -> Amount {
        self.balance_of(&self.address)
    }

    /// Remaining amount `spender` may move on behalf of `owner`
    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.ledger.balances().allowance(owner, spender)
    }

    /// Position of `account` in `ticker`
    pub fn position_of(&self, account: &Address, ticker: &Ticker) -> Amount {
        self.ledger.positions().position_of(account, ticker)
    }

    /// Balance and non-zero positions of `account`
    pub fn account(&self, account: &Address) -> AccountSummary {
        let positions: BTreeMap<Ticker, Amount> = self
            .ledger
            .positions()
            .positions_of(account)
            .into_iter()
            .filter(|(_, quantity)| *quantity > 0)
            .collect();

        AccountSummary {
            address: *account,
            balance: self.balance_of(account),
            positions,
        }
    }

    /// Current feed price of `ticker`
    pub fn price_of(&self, ticker: &Ticker) -> Result<Price> {
        self.oracle.price_of(ticker)
    }

    /// Tickers with a registered feed
    pub fn tickers(&self) -> Vec<Ticker> {
        self.oracle.tickers()
    }

    /// Committed events, oldest first
    pub fn events(&self) -> &[LedgerEvent] {
        self.ledger.events()
    }

    /// Committed events from `sequence` on
    pub fn events_since(&self, sequence: u64) -> &[LedgerEvent] {
        self.ledger.events_since(sequence)
    }

    /// Register or replace the feed for `ticker`; owner only
    pub fn add_or_update_price_feed(
        &mut self,
        caller: &Address,
        ticker: Ticker,
        feed: Arc<dyn PriceFeed>,
    ) -> Result<()> {
        let description = feed.description();
        self.oracle.add_or_update_price_feed(caller, ticker.clone(), feed)?;

        let mut tx = self.ledger.begin();
        tx.emit(EventKind::PriceFeedUpdated { ticker, description });
        tx.commit();
        Ok(())
    }

    /// Hand the owner role to `new_owner`; owner only
    pub fn transfer_ownership(&mut self, caller: &Address, new_owner: Address) -> Result<()> {
        let previous_owner = self.oracle.transfer_ownership(caller, new_owner)?;

        let mut tx = self.ledger.begin();
        tx.emit(EventKind::OwnershipTransferred { previous_owner, new_owner });
        tx.commit();
        Ok(())
    }

    /// Move VRT from the caller to `to`
    pub fn transfer(&mut self, caller: &Address, to: &Address, amount: Amount) -> Result<()> {
        let mut tx = self.ledger.begin();
        tx.transfer(caller, to, amount)?;
        tx.commit();
        Ok(())
    }

    /// Allow `spender` to move up to `amount` of the caller's VRT
    pub fn approve(&mut self, caller: &Address, spender: &Address, amount: Amount) {
        let mut tx = self.ledger.begin();
        tx.approve(caller, spender, amount);
        tx.commit();
    }

    /// Move VRT from `from` to `to` against the caller's allowance
    pub fn transfer_from(
        &mut self,
        caller: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<()> {
        let mut tx = self.ledger.begin();
        tx.transfer_from(caller, from, to, amount)?;
        tx.commit();
        Ok(())
    }

    /// Price `asset_quantity` of `ticker` in VRT at current feed prices
    pub fn quote(&self, ticker: &Ticker, asset_quantity: Amount) -> Result<Quote> {
        if asset_quantity == 0 {
            return Err(Error::ValidationError("Asset quantity must be positive".to_string()));
        }

        if *ticker == self.base_ticker {
            return Err(Error::ValidationError(format!(
                "{} is the base token and cannot be held as a position", ticker
            )));
        }

        let asset_price = self.oracle.price_of(ticker)?;
        let base_price = self.oracle.price_of(&self.base_ticker)?;

        let token_amount = mul_div(asset_quantity, asset_price, base_price)?;
        let fee = fee_for(token_amount)?;

        debug!(
            "Quote {} {}: {} VRT plus {} fee",
            token::format(asset_quantity), ticker, token::format(token_amount), token::format(fee)
        );

        Ok(Quote {
            asset_quantity,
            asset_price,
            base_price,
            token_amount,
            fee,
        })
    }

    /// VRT cost and fee of buying `asset_quantity` of `ticker`
    pub fn quote_buy(&self, ticker: &Ticker, asset_quantity: Amount) -> Result<Quote> {
        self.quote(ticker, asset_quantity)
    }

    /// VRT proceeds and fee of selling `asset_quantity` of `ticker`
    pub fn quote_sell(&self, ticker: &Ticker, asset_quantity: Amount) -> Result<Quote> {
        self.quote(ticker, asset_quantity)
    }

    /// Burn the VRT cost of `asset_quantity` of `ticker` from the caller,
    /// collect the fee, and open the position.
    ///
    /// Fails with `BurnExceedsBalance` when the caller cannot cover the cost
    /// and with `InsufficientFeeBalance` when the cost is covered but the fee
    /// is not. Nothing changes on failure.
    pub fn buy(
        &mut self,
        caller: &Address,
        ticker: &Ticker,
        asset_quantity: Amount,
    ) -> Result<Quote> {
        let context = || format!("Buy {} {}", token::format(asset_quantity), ticker);
        let quote = self.quote(ticker, asset_quantity).with_context(context)?;
        let fee_reserve = self.address;

        let mut tx = self.ledger.begin();
        tx.burn(caller, quote.token_amount)
            .map_err(burn_error)
            .with_context(context)?;
        tx.transfer(caller, &fee_reserve, quote.fee)
            .map_err(fee_error)
            .with_context(context)?;
        tx.increase_position(caller, ticker, asset_quantity)
            .with_context(context)?;
        tx.emit(EventKind::Bought {
            account: *caller,
            ticker: ticker.clone(),
            asset_quantity,
            token_cost: quote.token_amount,
            fee: quote.fee,
        });
        tx.commit();

        info!(
            "{} bought {} {} for {} VRT (fee {})",
            caller, token::format(asset_quantity), ticker,
            token::format(quote.token_amount), token::format(quote.fee)
        );
        Ok(quote)
    }

    /// Close `asset_quantity` of the caller's `ticker` position, collect the
    /// fee, and credit the VRT value.
    ///
    /// The fee must be covered by the balance held before the proceeds are
    /// credited. Nothing changes on failure.
    pub fn sell(
        &mut self,
        caller: &Address,
        ticker: &Ticker,
        asset_quantity: Amount,
    ) -> Result<Quote> {
        let held = self.position_of(caller, ticker);
        if asset_quantity > held {
            return Err(Error::InsufficientPosition(format!(
                "{} holds {} {}, cannot sell {}",
                caller, token::format(held), ticker, token::format(asset_quantity)
            )));
        }

        let context = || format!("Sell {} {}", token::format(asset_quantity), ticker);
        let quote = self.quote(ticker, asset_quantity).with_context(context)?;
        let fee_reserve = self.address;

        let mut tx = self.ledger.begin();
        let balance = tx.balance_of(caller);
        if balance < quote.fee {
            return Err(Error::InsufficientFeeBalance(format!(
                "{} holds {} VRT, fee is {}",
                caller, token::format(balance), token::format(quote.fee)
            )));
        }

        tx.decrease_position(caller, ticker, asset_quantity)
            .with_context(context)?;
        tx.transfer(caller, &fee_reserve, quote.fee)
            .map_err(fee_error)
            .with_context(context)?;
        tx.credit_for(caller, quote.token_amount)
            .with_context(context)?;
        tx.emit(EventKind::Sold {
            account: *caller,
            ticker: ticker.clone(),
            asset_quantity,
            token_value: quote.token_amount,
            fee: quote.fee,
        });
        tx.commit();

        info!(
            "{} sold {} {} for {} VRT (fee {})",
            caller, token::format(asset_quantity), ticker,
            token::format(quote.token_amount), token::format(quote.fee)
        );
        Ok(quote)
    }
}
