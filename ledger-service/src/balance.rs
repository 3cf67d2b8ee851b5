//! Transferable VRT balances

use std::collections::HashMap;

use common::decimal::{token, Amount};
use common::error::{Error, Result};
use common::model::Address;

/// Balance ledger for the base token.
///
/// The sum of all balances always equals `total_supply`. Mutators are
/// crate-private; callers go through [`crate::LedgerTransaction`].
#[derive(Debug, Default, Clone)]
pub struct FungibleBalance {
    /// Balances by account
    balances: HashMap<Address, Amount>,
    /// Allowances by (owner, spender)
    allowances: HashMap<(Address, Address), Amount>,
    /// Tokens in existence
    total_supply: Amount,
}

impl FungibleBalance {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance of an account, zero if it was never touched
    pub fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Remaining amount `spender` may move on behalf of `owner`
    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances.get(&(*owner, *spender)).copied().unwrap_or(0)
    }

    /// Tokens in existence
    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// All accounts that have ever held a balance
    pub fn holders(&self) -> impl Iterator<Item = (&Address, &Amount)> {
        self.balances.iter()
    }

    pub(crate) fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<()> {
        let available = self.balance_of(from);
        if amount > available {
            return Err(Error::InsufficientBalance(format!(
                "{} holds {} VRT, cannot transfer {}",
                from, token::format(available), token::format(amount)
            )));
        }

        self.balances.insert(*from, available - amount);
        // Bounded by total supply
        *self.balances.entry(*to).or_insert(0) += amount;
        Ok(())
    }

    pub(crate) fn burn(&mut self, from: &Address, amount: Amount) -> Result<()> {
        let available = self.balance_of(from);
        if amount > available {
            return Err(Error::InsufficientBalance(format!(
                "{} holds {} VRT, cannot burn {}",
                from, token::format(available), token::format(amount)
            )));
        }

        self.balances.insert(*from, available - amount);
        self.total_supply -= amount;
        Ok(())
    }

    pub(crate) fn credit_for(&mut self, to: &Address, amount: Amount) -> Result<()> {
        let total_supply = self.total_supply.checked_add(amount).ok_or_else(|| {
            Error::ArithmeticOverflow(format!(
                "Crediting {} VRT overflows total supply",
                token::format(amount)
            ))
        })?;

        self.total_supply = total_supply;
        *self.balances.entry(*to).or_insert(0) += amount;
        Ok(())
    }

    pub(crate) fn approve(&mut self, owner: &Address, spender: &Address, amount: Amount) {
        self.allowances.insert((*owner, *spender), amount);
    }

    pub(crate) fn spend_allowance(
        &mut self,
        owner: &Address,
        spender: &Address,
        amount: Amount,
    ) -> Result<()> {
        let allowed = self.allowance(owner, spender);
        if amount > allowed {
            return Err(Error::InsufficientAllowance(format!(
                "{} may move {} VRT for {}, requested {}",
                spender, token::format(allowed), owner, token::format(amount)
            )));
        }

        self.allowances.insert((*owner, *spender), allowed - amount);
        Ok(())
    }

    pub(crate) fn restore_balance(&mut self, account: Address, previous: Amount) {
        self.balances.insert(account, previous);
    }

    pub(crate) fn restore_allowance(&mut self, owner: Address, spender: Address, previous: Amount) {
        self.allowances.insert((owner, spender), previous);
    }

    pub(crate) fn restore_supply(&mut self, previous: Amount) {
        self.total_supply = previous;
    }
}
