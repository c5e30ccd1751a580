//! Storage layer for ledger persistence
//!
//! Saves the hosted ledger, its receipt history and configuration as JSON.

pub mod persistence;

pub use persistence::{Storage, StorageConfig, StorageError, StorageStats};
