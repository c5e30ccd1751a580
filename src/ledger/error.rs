//! Ledger error kinds
//!
//! Every error aborts the current operation. None are retried internally.

use thiserror::Error;

use super::address::{Address, Amount};

/// Errors raised by ledger operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: Amount, need: Amount },
    #[error("Allowance exceeded: allowance {allowance}, need {need}")]
    LimitExceeded { allowance: Amount, need: Amount },
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,
}

/// Violations found by a full audit of the committed state
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantError {
    #[error("the total supply {supply} does not match the sum of all balances {balance_sum}")]
    BalanceSupplyMismatch { supply: Amount, balance_sum: Amount },
    #[error("the sum of all balances overflows at account {0}")]
    SumOverflow(Address),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
