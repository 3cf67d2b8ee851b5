//! Synthetic positions per account and ticker

use std::collections::{BTreeMap, HashMap};

use common::decimal::{token, Amount};
use common::error::{Error, Result};
use common::model::{Address, Ticker};

/// Position quantities keyed by account, then ticker.
///
/// Positions only change through buys and sells; there is no way to move a
/// position between accounts.
#[derive(Debug, Default, Clone)]
pub struct PositionLedger {
    positions: HashMap<Address, BTreeMap<Ticker, Amount>>,
}

impl PositionLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Quantity of `ticker` held by `account`
    pub fn position_of(&self, account: &Address, ticker: &Ticker) -> Amount {
        self.positions
            .get(account)
            .and_then(|held| held.get(ticker))
            .copied()
            .unwrap_or(0)
    }

    /// Every position entry of `account`, zeroed ones included
    pub fn positions_of(&self, account: &Address) -> BTreeMap<Ticker, Amount> {
        self.positions.get(account).cloned().unwrap_or_default()
    }

    /// Sum of all accounts' positions in `ticker`
    pub fn open_interest(&self, ticker: &Ticker) -> Amount {
        self.positions
            .values()
            .filter_map(|held| held.get(ticker))
            .sum()
    }

    pub(crate) fn increase(
        &mut self,
        account: &Address,
        ticker: &Ticker,
        quantity: Amount,
    ) -> Result<()> {
        let held = self.position_of(account, ticker);
        let updated = held.checked_add(quantity).ok_or_else(|| {
            Error::ArithmeticOverflow(format!("{} position of {} overflows", ticker, account))
        })?;

        self.set(*account, ticker.clone(), updated);
        Ok(())
    }

    pub(crate) fn decrease(
        &mut self,
        account: &Address,
        ticker: &Ticker,
        quantity: Amount,
    ) -> Result<()> {
        let held = self.position_of(account, ticker);
        if quantity > held {
            return Err(Error::InsufficientPosition(format!(
                "{} holds {} {}, cannot remove {}",
                account, token::format(held), ticker, token::format(quantity)
            )));
        }

        self.set(*account, ticker.clone(), held - quantity);
        Ok(())
    }

    pub(crate) fn set(&mut self, account: Address, ticker: Ticker, quantity: Amount) {
        self.positions.entry(account).or_default().insert(ticker, quantity);
    }
}
