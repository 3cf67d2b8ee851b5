//! Common types and utilities for the Virtuals ledger
//!
//! This library contains shared types, utilities, and abstractions used across
//! the oracle, ledger and trading crates. It provides a unified approach to
//! error handling, fixed-point arithmetic, and domain models.

pub mod error;
pub mod model;
pub mod decimal;

/// Re-export important types
pub use error::{Error, Result, ErrorExt};
pub use decimal::*;
pub use model::{AccountSummary, Address, EventKind, LedgerEvent, Ticker};
