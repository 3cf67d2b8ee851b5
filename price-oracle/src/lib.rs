//! Price feeds and the owner-gated registry that maps tickers to them

pub mod feed;
pub mod registry;

pub use feed::{FixedPriceFeed, PriceFeed, RandomPriceFeed};
pub use registry::PriceOracleRegistry;
