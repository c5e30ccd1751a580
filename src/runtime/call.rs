//! Calls and receipts exchanged with the host

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ledger::{Address, Amount, LedgerEvent};

/// A ledger entry point invoked on behalf of a sender
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Call {
    /// Deploy the ledger, minting the initial supply to the sender
    Create {
        name: String,
        symbol: String,
        initial_supply: Amount,
        decimals: u8,
    },
    Transfer {
        to: Address,
        amount: Amount,
    },
    TransferFrom {
        from: Address,
        to: Address,
        amount: Amount,
    },
    Approve {
        spender: Address,
        amount: Amount,
    },
}

impl Call {
    /// Entry point name as exposed to callers
    pub fn name(&self) -> &'static str {
        match self {
            Call::Create { .. } => "create",
            Call::Transfer { .. } => "transfer",
            Call::TransferFrom { .. } => "transferFrom",
            Call::Approve { .. } => "approve",
        }
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Call::Create {
                name,
                symbol,
                initial_supply,
                decimals,
            } => write!(
                f,
                "create({}, {}, {}, {})",
                name, symbol, initial_supply, decimals
            ),
            Call::Transfer { to, amount } => write!(f, "transfer({}, {})", to, amount),
            Call::TransferFrom { from, to, amount } => {
                write!(f, "transferFrom({}, {}, {})", from, to, amount)
            }
            Call::Approve { spender, amount } => write!(f, "approve({}, {})", spender, amount),
        }
    }
}

/// Record of a committed call
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Receipt {
    /// Sequence number of the call, starting at 0 for deployment
    pub id: u64,
    pub sender: Address,
    pub call: Call,
    /// Value returned by the entry point
    pub returned: bool,
    /// Events published by the call, in emission order
    pub events: Vec<LedgerEvent>,
    pub executed_at: DateTime<Utc>,
}
