//! Domain models for the Virtuals ledger

pub mod account;
pub mod event;
pub mod ticker;

pub use account::{AccountSummary, Address};
pub use event::{EventKind, LedgerEvent};
pub use ticker::Ticker;
