//! Data storage and persistence
//!
//! A sled database holding the ledger snapshot, the token snapshot and an
//! append-only journal of events.

pub mod ledger_store;

pub use ledger_store::LedgerStore;
