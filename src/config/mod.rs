//! Configuration management
//!
//! Ledger parameters and the data directory, layered from defaults, an
//! optional TOML file and `LEDGER_*` environment variables.

pub mod settings;

pub use settings::{Config, Settings, GLOBAL_CONFIG};
