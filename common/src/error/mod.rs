//! Error types for the Virtuals ledger
//!
//! This module provides a unified error handling system for every crate in
//! the workspace. Each variant is an operation-fatal rejection: the attempted
//! mutation is discarded and the caller is expected to inspect the reason and
//! resubmit with corrected parameters.

use std::fmt::Display;
use thiserror::Error;

/// Virtuals ledger error type
#[derive(Debug, Error)]
pub enum Error {
    /// Caller is not the privileged owner
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// No price feed registered for a ticker
    #[error("Unknown ticker: {0}")]
    UnknownTicker(String),

    /// Token balance too low for a transfer or burn
    #[error("Insufficient balance: {0}")]
    InsufficientBalance(String),

    /// Token balance too low to burn the cost of a buy
    #[error("Burn amount exceeds balance: {0}")]
    BurnExceedsBalance(String),

    /// Principal is affordable but the trading fee is not
    #[error("Not enough balance to pay fee: {0}")]
    InsufficientFeeBalance(String),

    /// Selling more of an asset than is held
    #[error("Not enough assets to sell: {0}")]
    InsufficientPosition(String),

    /// Spender allowance too low for a delegated transfer
    #[error("Insufficient allowance: {0}")]
    InsufficientAllowance(String),

    /// A price feed quoted a price that cannot be used
    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    /// Fixed-point arithmetic left the representable range
    #[error("Arithmetic overflow: {0}")]
    ArithmeticOverflow(String),

    /// Generic validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Decimal conversion error
    #[error("Decimal conversion error: {0}")]
    DecimalError(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait to add context to error results
pub trait ErrorExt<T> {
    /// Add context information to an error, keeping its variant
    fn with_context<C, F>(self, context_fn: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Display;
}

impl<T> ErrorExt<T> for Result<T> {
    fn with_context<C, F>(self, context_fn: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Display,
    {
        self.map_err(|e| {
            let context = context_fn().to_string();
            let wrap = |msg: String| format!("{}: {}", context, msg);
            match e {
                Error::Unauthorized(msg) => Error::Unauthorized(wrap(msg)),
                Error::UnknownTicker(msg) => Error::UnknownTicker(wrap(msg)),
                Error::InsufficientBalance(msg) => Error::InsufficientBalance(wrap(msg)),
                Error::BurnExceedsBalance(msg) => Error::BurnExceedsBalance(wrap(msg)),
                Error::InsufficientFeeBalance(msg) => Error::InsufficientFeeBalance(wrap(msg)),
                Error::InsufficientPosition(msg) => Error::InsufficientPosition(wrap(msg)),
                Error::InsufficientAllowance(msg) => Error::InsufficientAllowance(wrap(msg)),
                Error::InvalidPrice(msg) => Error::InvalidPrice(wrap(msg)),
                Error::ArithmeticOverflow(msg) => Error::ArithmeticOverflow(wrap(msg)),
                Error::ValidationError(msg) => Error::ValidationError(wrap(msg)),
                Error::ConfigurationError(msg) => Error::ConfigurationError(wrap(msg)),
                Error::Internal(msg) => Error::Internal(wrap(msg)),
                Error::Serialization(e) => Error::Serialization(e),
                Error::DecimalError(msg) => Error::DecimalError(wrap(msg)),
            }
        })
    }
}

/// From rust_decimal::Error
impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::DecimalError(err.to_string())
    }
}
