//! Ledger events emitted by committed state changes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{base_units, Amount};
use crate::model::account::Address;
use crate::model::ticker::Ticker;

/// What happened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// Tokens moved between accounts
    Transfer {
        from: Address,
        to: Address,
        #[serde(with = "base_units")]
        amount: Amount,
    },
    /// A spender allowance was set
    Approval {
        owner: Address,
        spender: Address,
        #[serde(with = "base_units")]
        amount: Amount,
    },
    /// Tokens were destroyed
    Burn {
        account: Address,
        #[serde(with = "base_units")]
        amount: Amount,
    },
    /// Tokens were created, at genesis or by sell settlement
    Credit {
        account: Address,
        #[serde(with = "base_units")]
        amount: Amount,
    },
    /// A position grew
    PositionIncreased {
        account: Address,
        ticker: Ticker,
        #[serde(with = "base_units")]
        quantity: Amount,
    },
    /// A position shrank
    PositionDecreased {
        account: Address,
        ticker: Ticker,
        #[serde(with = "base_units")]
        quantity: Amount,
    },
    /// A price feed was registered or replaced
    PriceFeedUpdated { ticker: Ticker, description: String },
    /// The privileged owner changed
    OwnershipTransferred { previous_owner: Address, new_owner: Address },
    /// A buy settled
    Bought {
        account: Address,
        ticker: Ticker,
        #[serde(with = "base_units")]
        asset_quantity: Amount,
        #[serde(with = "base_units")]
        token_cost: Amount,
        #[serde(with = "base_units")]
        fee: Amount,
    },
    /// A sell settled
    Sold {
        account: Address,
        ticker: Ticker,
        #[serde(with = "base_units")]
        asset_quantity: Amount,
        #[serde(with = "base_units")]
        token_value: Amount,
        #[serde(with = "base_units")]
        fee: Amount,
    },
}

/// Event record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEvent {
    /// Unique event ID
    pub id: Uuid,
    /// Position in the ledger's event log, starting at 0
    pub sequence: u64,
    /// Event payload
    pub kind: EventKind,
    /// Commit timestamp
    pub created_at: DateTime<Utc>,
}

impl LedgerEvent {
    /// Create a new event record
    pub fn new(sequence: u64, kind: EventKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            sequence,
            kind,
            created_at: Utc::now(),
        }
    }
}
