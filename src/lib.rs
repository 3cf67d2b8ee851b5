// This is a metapackage for cross-crate tests
// Re-export crates as modules

pub use common;
pub use ledger_service;
pub use price_oracle;
pub use trading_engine;
