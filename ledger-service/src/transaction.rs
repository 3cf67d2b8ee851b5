//! Ledger state and all-or-nothing transactions over it
//!
//! A [`LedgerTransaction`] records the previous value of every balance,
//! allowance, supply figure and position it modifies. Committing keeps the
//! changes and publishes the staged events; dropping the transaction without
//! committing replays the journal in reverse and discards the events.

use common::decimal::{token, Amount};
use common::error::Result;
use common::model::{Address, EventKind, LedgerEvent, Ticker};
use tracing::{debug, info, warn};

use crate::balance::FungibleBalance;
use crate::position::PositionLedger;

/// Combined balance and position state with its event log
#[derive(Debug, Default)]
pub struct Ledger {
    balances: FungibleBalance,
    positions: PositionLedger,
    events: Vec<LedgerEvent>,
    event_logging: bool,
}

impl Ledger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ledger whose whole initial supply is held by `holder`
    pub fn with_genesis(holder: Address, supply: Amount) -> Result<Self> {
        let mut ledger = Self::new();

        let mut tx = ledger.begin();
        tx.credit_for(&holder, supply)?;
        tx.commit();

        info!("Minted genesis supply of {} VRT to {}", token::format(supply), holder);
        Ok(ledger)
    }

    /// Log every committed event at info level
    pub fn set_event_logging(&mut self, enabled: bool) {
        self.event_logging = enabled;
    }

    /// Token balances
    pub fn balances(&self) -> &FungibleBalance {
        &self.balances
    }

    /// Synthetic positions
    pub fn positions(&self) -> &PositionLedger {
        &self.positions
    }

    /// Committed events, oldest first
    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    /// Committed events with a sequence number of at least `sequence`
    pub fn events_since(&self, sequence: u64) -> &[LedgerEvent] {
        let start = self.events.partition_point(|event| event.sequence < sequence);
        &self.events[start..]
    }

    /// Start a transaction
    pub fn begin(&mut self) -> LedgerTransaction<'_> {
        LedgerTransaction {
            ledger: self,
            journal: Vec::new(),
            staged: Vec::new(),
            committed: false,
        }
    }
}

/// Prior value of one piece of state touched by a transaction
#[derive(Debug)]
enum UndoEntry {
    Balance { account: Address, previous: Amount },
    Allowance { owner: Address, spender: Address, previous: Amount },
    Supply { previous: Amount },
    Position { account: Address, ticker: Ticker, previous: Amount },
}

/// All-or-nothing unit of work over a [`Ledger`].
///
/// Reads through the transaction observe its own uncommitted writes.
pub struct LedgerTransaction<'a> {
    ledger: &'a mut Ledger,
    journal: Vec<UndoEntry>,
    staged: Vec<EventKind>,
    committed: bool,
}

impl<'a> LedgerTransaction<'a> {
    /// Current balance of `account`
    pub fn balance_of(&self, account: &Address) -> Amount {
        self.ledger.balances.balance_of(account)
    }

    /// Current position of `account` in `ticker`
    pub fn position_of(&self, account: &Address, ticker: &Ticker) -> Amount {
        self.ledger.positions.position_of(account, ticker)
    }

    fn save_balance(&mut self, account: &Address) {
        let previous = self.ledger.balances.balance_of(account);
        self.journal.push(UndoEntry::Balance { account: *account, previous });
    }

    fn save_supply(&mut self) {
        let previous = self.ledger.balances.total_supply();
        self.journal.push(UndoEntry::Supply { previous });
    }

    fn save_position(&mut self, account: &Address, ticker: &Ticker) {
        let previous = self.ledger.positions.position_of(account, ticker);
        self.journal.push(UndoEntry::Position {
            account: *account,
            ticker: ticker.clone(),
            previous,
        });
    }

    /// Move tokens between accounts
    pub fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<()> {
        self.save_balance(from);
        self.save_balance(to);
        self.ledger.balances.transfer(from, to, amount)?;

        debug!("Transfer {} VRT from {} to {}", token::format(amount), from, to);
        self.staged.push(EventKind::Transfer { from: *from, to: *to, amount });
        Ok(())
    }

    /// Destroy tokens held by `from`
    pub fn burn(&mut self, from: &Address, amount: Amount) -> Result<()> {
        self.save_balance(from);
        self.save_supply();
        self.ledger.balances.burn(from, amount)?;

        debug!("Burn {} VRT from {}", token::format(amount), from);
        self.staged.push(EventKind::Burn { account: *from, amount });
        Ok(())
    }

    /// Create tokens for `to`
    pub fn credit_for(&mut self, to: &Address, amount: Amount) -> Result<()> {
        self.save_balance(to);
        self.save_supply();
        self.ledger.balances.credit_for(to, amount)?;

        debug!("Credit {} VRT to {}", token::format(amount), to);
        self.staged.push(EventKind::Credit { account: *to, amount });
        Ok(())
    }

    /// Set the amount `spender` may move on behalf of `owner`
    pub fn approve(&mut self, owner: &Address, spender: &Address, amount: Amount) {
        let previous = self.ledger.balances.allowance(owner, spender);
        self.journal.push(UndoEntry::Allowance { owner: *owner, spender: *spender, previous });
        self.ledger.balances.approve(owner, spender, amount);

        self.staged.push(EventKind::Approval { owner: *owner, spender: *spender, amount });
    }

    /// Move tokens from `from` to `to` using the allowance granted to `spender`
    pub fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<()> {
        let previous = self.ledger.balances.allowance(from, spender);
        self.journal.push(UndoEntry::Allowance { owner: *from, spender: *spender, previous });
        self.ledger.balances.spend_allowance(from, spender, amount)?;

        self.transfer(from, to, amount)
    }

    /// Grow the position of `account` in `ticker`
    pub fn increase_position(
        &mut self,
        account: &Address,
        ticker: &Ticker,
        quantity: Amount,
    ) -> Result<()> {
        self.save_position(account, ticker);
        self.ledger.positions.increase(account, ticker, quantity)?;

        self.staged.push(EventKind::PositionIncreased {
            account: *account,
            ticker: ticker.clone(),
            quantity,
        });
        Ok(())
    }

    /// Shrink the position of `account` in `ticker`
    pub fn decrease_position(
        &mut self,
        account: &Address,
        ticker: &Ticker,
        quantity: Amount,
    ) -> Result<()> {
        self.save_position(account, ticker);
        self.ledger.positions.decrease(account, ticker, quantity)?;

        self.staged.push(EventKind::PositionDecreased {
            account: *account,
            ticker: ticker.clone(),
            quantity,
        });
        Ok(())
    }

    /// Stage an event that is published only if the transaction commits
    pub fn emit(&mut self, kind: EventKind) {
        self.staged.push(kind);
    }

    /// Keep every change and publish the staged events
    pub fn commit(mut self) -> Vec<LedgerEvent> {
        self.journal.clear();
        self.committed = true;

        let ledger = &mut *self.ledger;
        let mut published = Vec::with_capacity(self.staged.len());
        for kind in self.staged.drain(..) {
            let event = LedgerEvent::new(ledger.events.len() as u64, kind);
            if ledger.event_logging {
                info!("Event #{}: {:?}", event.sequence, event.kind);
            }
            ledger.events.push(event.clone());
            published.push(event);
        }

        published
    }

    /// Discard every change made through this transaction
    pub fn rollback(self) {
        // Undo happens in Drop
    }

    fn undo(&mut self) {
        if !self.journal.is_empty() {
            warn!("Rolling back {} ledger changes", self.journal.len());
        }

        while let Some(entry) = self.journal.pop() {
            match entry {
                UndoEntry::Balance { account, previous } => {
                    self.ledger.balances.restore_balance(account, previous)
                }
                UndoEntry::Allowance { owner, spender, previous } => {
                    self.ledger.balances.restore_allowance(owner, spender, previous)
                }
                UndoEntry::Supply { previous } => self.ledger.balances.restore_supply(previous),
                UndoEntry::Position { account, ticker, previous } => {
                    self.ledger.positions.set(account, ticker, previous)
                }
            }
        }

        self.staged.clear();
    }
}

impl Drop for LedgerTransaction<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.undo();
        }
    }
}
