//! Ledger service for VRT balances and synthetic positions
//!
//! All mutations go through a [`LedgerTransaction`], which journals the
//! previous value of everything it touches and restores it unless the
//! transaction is committed.

pub mod balance;
pub mod position;
pub mod transaction;

pub use balance::FungibleBalance;
pub use position::PositionLedger;
pub use transaction::{Ledger, LedgerTransaction};
