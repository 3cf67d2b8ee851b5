//! Trading engine for the Virtuals token
//!
//! Converts VRT balances into synthetic positions priced by the oracle
//! registry and back, charging a 0.3% fee on each leg.

pub mod config;
pub mod engine;
pub mod service;

pub use config::VirtualsConfig;
pub use engine::{fee_for, Quote, TradingEngine, BASE_TICKER, DECIMALS, NAME, SYMBOL};
pub use service::VirtualsService;
