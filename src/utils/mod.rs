//! Utility functions and helpers
//!
//! Hashing, account addresses and the binary encoding used by the store.

pub mod address;
pub mod crypto;
pub mod serialization;

pub use address::{validate_address, Address, ADDRESS_LEN};
pub use crypto::sha256_digest;
pub use serialization::{deserialize, serialize};
