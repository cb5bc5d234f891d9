//! Fixtures shared by the unit tests

use crate::core::{ExchangeLedger, LedgerParams, MemoryEventLog};
use crate::provider::TokenVault;
use crate::utils::Address;
use std::sync::Arc;

pub const CUSTODY_SEED: &str = "test-custody";

pub fn alice() -> Address {
    Address::from_seed("alice")
}

pub fn bob() -> Address {
    Address::from_seed("bob")
}

/// Ledger over a fresh token where every listed account holds `amount`
/// base units and has approved the ledger for all of it
pub fn funded_ledger(
    ratio: u64,
    cap: u64,
    accounts: &[(Address, u64)],
) -> ExchangeLedger<TokenVault> {
    let custodian = Address::from_seed(CUSTODY_SEED);
    let token = TokenVault::new(custodian);
    for (account, amount) in accounts {
        token.mint(account, *amount).expect("mint in fixture");
        token
            .approve(account, &custodian, *amount)
            .expect("approve in fixture");
    }
    let params = LedgerParams::new(ratio, cap).expect("valid fixture params");
    ExchangeLedger::new(params, token)
}

pub fn funded_ledger_with_log(
    ratio: u64,
    cap: u64,
    accounts: &[(Address, u64)],
) -> (ExchangeLedger<TokenVault>, Arc<MemoryEventLog>) {
    let log = Arc::new(MemoryEventLog::new());
    let ledger = funded_ledger(ratio, cap, accounts).with_sink(Arc::clone(&log));
    (ledger, log)
}
