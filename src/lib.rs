//! Token Ledger: a fungible-token ledger engine in Rust
//!
//! This crate provides:
//! - An ERC-20 style ledger with balances, allowances and a fixed supply
//!   minted at deployment
//! - Checked arithmetic and validate-before-write atomicity
//! - Transfer and approval events
//! - A host runtime with per-call commit/rollback and receipt history
//! - JSON persistence with backups
//!
//! # Example
//!
//! ```rust
//! use token_ledger::ledger::Address;
//! use token_ledger::runtime::{Call, Runtime};
//!
//! let alice = Address::new([1; 20]);
//! let bob = Address::new([2; 20]);
//!
//! let mut runtime = Runtime::default();
//! runtime.deploy(alice, "My Token", "MTK", 1_000, 18).unwrap();
//!
//! let receipt = runtime
//!     .execute(alice, Call::Transfer { to: bob, amount: 300 })
//!     .unwrap();
//! assert_eq!(receipt.events.len(), 1);
//! assert_eq!(runtime.balance_of(&alice).unwrap(), 700);
//! ```

pub mod cli;
pub mod crypto;
pub mod ledger;
pub mod runtime;
pub mod storage;

// Re-export commonly used types
pub use crypto::KeyPair;
pub use ledger::{Address, Amount, EventSink, Ledger, LedgerError, LedgerEvent, TokenMetadata};
pub use runtime::{Call, Receipt, Runtime, RuntimeConfig, RuntimeError};
pub use storage::{Storage, StorageConfig};
