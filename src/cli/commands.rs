use crate::utils::Address;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Accounts are given either as `0x` addresses or as seed labels like `alice`
pub fn parse_account(input: &str) -> Result<Address, String> {
    Address::resolve(input).map_err(|e| e.to_string())
}

#[derive(Debug, Parser)]
#[command(name = "exchange-ledger", about = "Fixed-ratio exchange ledger")]
pub struct Opt {
    #[arg(long, global = true, help = "Path to a TOML settings file")]
    pub config: Option<PathBuf>,
    #[arg(long = "data-dir", global = true, help = "Directory holding the ledger database")]
    pub data_dir: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    #[command(name = "init", about = "Create a new ledger with the configured ratio and cap")]
    Init,
    #[command(name = "status", about = "Show supply, reserve and parameters")]
    Status,
    #[command(name = "faucet", about = "Mint base tokens to an account")]
    Faucet {
        #[arg(value_parser = parse_account, help = "Receiving account")]
        account: Address,
        #[arg(help = "Base units to mint")]
        amount: u64,
    },
    #[command(name = "approve", about = "Allow the ledger to pull base tokens from an account")]
    Approve {
        #[arg(value_parser = parse_account, help = "Approving account")]
        account: Address,
        #[arg(help = "Allowance in base units")]
        amount: u64,
    },
    #[command(name = "deposit", about = "Deposit base tokens and mint derived units")]
    Deposit {
        #[arg(value_parser = parse_account, help = "Depositing account")]
        account: Address,
        #[arg(help = "Base units to deposit (multiple of the ratio)")]
        amount: u64,
    },
    #[command(name = "convert", about = "Burn derived units and receive base tokens")]
    Convert {
        #[arg(value_parser = parse_account, help = "Converting account")]
        account: Address,
        #[arg(help = "Derived units to burn")]
        amount: u64,
    },
    #[command(name = "balance", about = "Show base and derived balances of an account")]
    Balance {
        #[arg(value_parser = parse_account, help = "Account to inspect")]
        account: Address,
    },
    #[command(name = "events", about = "Print the event journal as JSON lines")]
    Events,
    #[command(name = "quote-deposit", about = "Derived units a deposit would mint")]
    QuoteDeposit {
        #[arg(help = "Base units")]
        amount: u64,
    },
    #[command(name = "quote-convert", about = "Base units a conversion would return")]
    QuoteConvert {
        #[arg(help = "Derived units")]
        amount: u64,
    },
}
