//! Configuration for the Virtuals engine

use std::env;

use common::decimal::{token, Amount, ONE_TOKEN};
use common::error::{Error, Result};
use common::model::Address;

/// Default genesis supply in whole tokens
pub const DEFAULT_INITIAL_SUPPLY: Amount = 1_000_000 * ONE_TOKEN;

/// Configuration for the Virtuals engine
#[derive(Debug, Clone)]
pub struct VirtualsConfig {
    /// Genesis supply, minted to the owner
    pub initial_supply: Amount,
    /// Privileged owner allowed to manage price feeds
    pub owner: Address,
    /// Engine's own account, which accumulates fees
    pub contract_address: Address,
    /// Log every committed ledger event
    pub event_logging: bool,
}

impl Default for VirtualsConfig {
    fn default() -> Self {
        Self {
            initial_supply: DEFAULT_INITIAL_SUPPLY,
            owner: Address::random(),
            contract_address: Address::random(),
            event_logging: false,
        }
    }
}

fn env_var<T>(key: &str, parse: impl FnOnce(&str) -> Result<T>) -> Result<Option<T>> {
    match env::var(key) {
        Ok(value) => parse(&value)
            .map(Some)
            .map_err(|e| Error::ConfigurationError(format!("{} is invalid: {}", key, e))),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(Error::ConfigurationError(format!("{} is unreadable: {}", key, e))),
    }
}

impl VirtualsConfig {
    /// Create a new configuration from environment variables, falling back
    /// to defaults for anything unset
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            initial_supply: env_var("VRT_INITIAL_SUPPLY", token::parse)?
                .unwrap_or(defaults.initial_supply),
            owner: env_var("VRT_OWNER", |v| v.parse())?.unwrap_or(defaults.owner),
            contract_address: env_var("VRT_CONTRACT_ADDRESS", |v| v.parse())?
                .unwrap_or(defaults.contract_address),
            event_logging: env_var("VRT_EVENT_LOGGING", |v| Ok(v == "true" || v == "1"))?
                .unwrap_or(defaults.event_logging),
        })
    }

    /// Create a new configuration with custom values
    pub fn new(
        initial_supply: Amount,
        owner: Address,
        contract_address: Address,
        event_logging: bool,
    ) -> Self {
        Self {
            initial_supply,
            owner,
            contract_address,
            event_logging,
        }
    }

    /// Apply command line values over this configuration. Unset values keep
    /// what the environment provided; `event_logging` can only be switched on.
    pub fn with_overrides(
        mut self,
        initial_supply: Option<Amount>,
        owner: Option<Address>,
        contract_address: Option<Address>,
        event_logging: bool,
    ) -> Self {
        if let Some(initial_supply) = initial_supply {
            self.initial_supply = initial_supply;
        }
        if let Some(owner) = owner {
            self.owner = owner;
        }
        if let Some(contract_address) = contract_address {
            self.contract_address = contract_address;
        }
        self.event_logging |= event_logging;
        self
    }
}
