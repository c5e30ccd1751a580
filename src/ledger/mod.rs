//! ERC-20 style fungible token ledger
//!
//! Tracks balances per account and allowances for delegated transfers:
//! - Sparse balance and allowance tables (absent means zero)
//! - Checked arithmetic on every amount update
//! - Transfer and approval events handed to an [`EventSink`]
//!
//! # Example
//!
//! ```rust
//! use token_ledger::ledger::{Address, Ledger, LedgerEvent};
//!
//! let alice = Address::new([1; 20]);
//! let bob = Address::new([2; 20]);
//! let mut events: Vec<LedgerEvent> = Vec::new();
//!
//! let mut ledger = Ledger::create(
//!     alice,
//!     "My Token".to_string(),
//!     "MTK".to_string(),
//!     1_000,
//!     18,
//!     &mut events,
//! )
//! .unwrap();
//!
//! ledger.transfer(alice, bob, 300, &mut events).unwrap();
//! assert_eq!(ledger.balance_of(&bob), 300);
//! assert_eq!(ledger.total_supply(), 1_000);
//! ```

pub mod address;
pub mod engine;
pub mod error;
pub mod events;
pub mod state;

pub use address::{Address, AddressError, Amount, ADDRESS_LENGTH};
pub use engine::{Ledger, TokenMetadata, MAX_DECIMALS, MAX_NAME_LENGTH, MAX_SYMBOL_LENGTH};
pub use error::{InvariantError, LedgerError, LedgerResult};
pub use events::{EventSink, LedgerEvent};
pub use state::LedgerState;
