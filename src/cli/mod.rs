//! Command-line interface
//!
//! Argument parsing, and the glue that loads a ledger from the store, runs
//! one command against it and saves the result.

pub mod commands;
pub mod runner;
pub mod session;

pub use commands::{parse_account, Command, Opt};
pub use runner::execute;
pub use session::Session;
