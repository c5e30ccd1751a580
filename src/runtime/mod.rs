//! Host environment for the ledger
//!
//! Supplies what the engine expects from its caller:
//! - Sender identity and call dispatch
//! - A commit/rollback boundary around every call
//! - Event buffering and a bounded receipt history

pub mod call;
pub mod host;

pub use call::{Call, Receipt};
pub use host::{Runtime, RuntimeConfig, RuntimeError, DEFAULT_HISTORY_LIMIT};
