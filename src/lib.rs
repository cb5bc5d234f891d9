//! # Exchange Ledger
//!
//! A fixed-ratio exchange between a base asset and a derived asset. Callers
//! deposit base tokens and get derived units minted at `1 / ratio`. Later they
//! burn derived units to get `ratio` base tokens back for each one.
//!
//! ## Rules the ledger enforces
//! - Deposits must be an exact multiple of the ratio. Nothing is rounded.
//! - Total derived supply never exceeds the cap fixed at creation
//! - A conversion needs both the caller's derived balance and enough base
//!   reserve in custody
//! - Each operation is all-or-nothing. If the token transfer fails, the
//!   bookkeeping is rolled back.
//!
//! ## Layout
//! - `core/`: the ledger, its parameters and emitted events
//! - `provider/`: the asset-transfer seam and an ERC20-style token
//! - `storage/`: sled persistence for snapshots and the event journal
//! - `config/`: settings from defaults, TOML and environment
//! - `cli/`: command parsing and the load/run/save loop
//! - `utils/`: addresses, hashing, encoding

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod provider;
pub mod storage;
pub mod utils;

#[cfg(test)]
pub mod testkit;

pub use cli::{execute, Command, Opt, Session};
pub use config::{Config, Settings, GLOBAL_CONFIG};
pub use core::{
    EventSink, ExchangeLedger, LedgerEvent, LedgerParams, LedgerSnapshot, LogSink,
    MemoryEventLog,
};
pub use error::{LedgerError, Result};
pub use provider::{AssetProvider, TokenSnapshot, TokenVault};
pub use storage::LedgerStore;
pub use utils::{validate_address, Address};
