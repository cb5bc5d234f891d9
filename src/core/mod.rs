//! Core exchange functionality
//!
//! The ledger itself, its immutable parameters, and the events it emits.

pub mod events;
pub mod ledger;
pub mod params;

pub use events::{EventSink, LedgerEvent, LogSink, MemoryEventLog};
pub use ledger::{ExchangeLedger, LedgerSnapshot};
pub use params::{LedgerParams, DEFAULT_EXCHANGE_RATIO, DEFAULT_MAX_DERIVED_SUPPLY};
