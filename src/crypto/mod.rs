//! Cryptographic utilities
//!
//! This module provides:
//! - SHA-256 and HASH160 digests
//! - secp256k1 key pairs for minting new account identities

pub mod hash;
pub mod keys;

pub use hash::{hash160, sha256, sha256_hex};
pub use keys::{KeyError, KeyPair};
