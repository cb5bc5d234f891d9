//! The exchange ledger: mints derived units against deposited base asset and
//! burns them to release base asset again, at the fixed ratio in LedgerParams.
//!
//! Every operation runs under one mutex for the whole ledger. The supply cap
//! spans all accounts, so per-account locking would not be enough. Inside the
//! lock each operation validates, stages its bookkeeping, calls the provider,
//! and only then commits. A provider failure leaves no trace.

use crate::core::{EventSink, LedgerEvent, LedgerParams};
use crate::error::{LedgerError, Result};
use crate::provider::AssetProvider;
use crate::utils::Address;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// Persistable image of the ledger's own state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct LedgerSnapshot {
    pub params: LedgerParams,
    pub derived_supply_issued: u64,
    pub balances: BTreeMap<Address, u64>,
    pub next_sequence: u64,
}

#[derive(Debug, Default)]
struct LedgerState {
    derived_supply_issued: u64,
    balances: BTreeMap<Address, u64>,
    next_sequence: u64,
}

impl LedgerState {
    fn balance_of(&self, addr: &Address) -> u64 {
        self.balances.get(addr).copied().unwrap_or(0)
    }

    fn set_balance(&mut self, addr: Address, amount: u64) {
        if amount == 0 {
            self.balances.remove(&addr);
        } else {
            self.balances.insert(addr, amount);
        }
    }

    fn take_sequence(&mut self) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        sequence
    }
}

pub struct ExchangeLedger<P: AssetProvider> {
    params: LedgerParams,
    provider: P,
    state: Mutex<LedgerState>,
    sinks: Vec<Box<dyn EventSink>>,
}

impl<P: AssetProvider> ExchangeLedger<P> {
    pub fn new(params: LedgerParams, provider: P) -> ExchangeLedger<P> {
        info!(
            "Creating exchange ledger: ratio {}, cap {}",
            params.exchange_ratio(),
            params.max_derived_supply()
        );
        ExchangeLedger {
            params,
            provider,
            state: Mutex::new(LedgerState::default()),
            sinks: Vec::new(),
        }
    }

    /// Rebuild a ledger from a stored snapshot, checking its invariants first
    pub fn from_snapshot(snapshot: LedgerSnapshot, provider: P) -> Result<ExchangeLedger<P>> {
        // round-trip through the constructor so a stored zero ratio is caught
        let params = LedgerParams::new(
            snapshot.params.exchange_ratio(),
            snapshot.params.max_derived_supply(),
        )
        .map_err(|e| LedgerError::Database(format!("stored parameters invalid: {e}")))?;

        let sum = snapshot
            .balances
            .values()
            .try_fold(0u64, |acc, v| acc.checked_add(*v))
            .ok_or_else(|| LedgerError::Database("derived balances overflow".to_string()))?;
        if sum != snapshot.derived_supply_issued {
            return Err(LedgerError::Database(format!(
                "ledger snapshot inconsistent: balances sum to {sum}, issued supply is {}",
                snapshot.derived_supply_issued
            )));
        }
        if snapshot.derived_supply_issued > params.max_derived_supply() {
            return Err(LedgerError::Database(format!(
                "ledger snapshot inconsistent: issued supply {} exceeds cap {}",
                snapshot.derived_supply_issued,
                params.max_derived_supply()
            )));
        }

        let mut balances = snapshot.balances;
        balances.retain(|_, v| *v > 0);
        Ok(ExchangeLedger {
            params,
            provider,
            state: Mutex::new(LedgerState {
                derived_supply_issued: snapshot.derived_supply_issued,
                balances,
                next_sequence: snapshot.next_sequence,
            }),
            sinks: Vec::new(),
        })
    }

    /// Register an observer for committed operations
    pub fn with_sink<S: EventSink + 'static>(mut self, sink: S) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn snapshot(&self) -> Result<LedgerSnapshot> {
        let state = self.lock()?;
        Ok(LedgerSnapshot {
            params: self.params,
            derived_supply_issued: state.derived_supply_issued,
            balances: state.balances.clone(),
            next_sequence: state.next_sequence,
        })
    }

    pub fn exchange_ratio(&self) -> u64 {
        self.params.exchange_ratio()
    }

    pub fn max_derived_supply(&self) -> u64 {
        self.params.max_derived_supply()
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn derived_supply_issued(&self) -> Result<u64> {
        Ok(self.lock()?.derived_supply_issued)
    }

    pub fn derived_balance_of(&self, addr: &Address) -> Result<u64> {
        Ok(self.lock()?.balance_of(addr))
    }

    /// Derived units that can still be minted before the cap is hit
    pub fn remaining_capacity(&self) -> Result<u64> {
        let issued = self.lock()?.derived_supply_issued;
        Ok(self.params.max_derived_supply().saturating_sub(issued))
    }

    /// Number of accounts with a non-zero derived balance
    pub fn holder_count(&self) -> Result<usize> {
        Ok(self.lock()?.balances.len())
    }

    /// Derived units a deposit of `amount` would mint right now
    pub fn preview_deposit(&self, amount: u64) -> Result<u64> {
        let minted = self.params.base_to_derived(amount)?;
        let state = self.lock()?;
        self.params.check_capacity(state.derived_supply_issued, minted)?;
        debug!("quote: {amount} base -> {minted} derived");
        Ok(minted)
    }

    /// Base units a conversion of `derived_amount` would return
    pub fn preview_convert(&self, derived_amount: u64) -> Result<u64> {
        let base = self.params.derived_to_base(derived_amount)?;
        debug!("quote: {derived_amount} derived -> {base} base");
        Ok(base)
    }

    /// Pull `amount` base units from `caller` and mint `amount / ratio` derived units to them
    pub fn deposit(&self, caller: &Address, amount: u64) -> Result<LedgerEvent> {
        let mut state = self.lock()?;

        let minted = self
            .params
            .base_to_derived(amount)
            .map_err(|e| rejected("deposit", caller, e))?;
        let new_supply = self
            .params
            .check_capacity(state.derived_supply_issued, minted)
            .map_err(|e| rejected("deposit", caller, e))?;
        // cannot overflow: every balance is bounded by the supply
        let new_balance = state.balance_of(caller) + minted;

        self.provider
            .pull_from(caller, amount)
            .map_err(|e| rejected("deposit", caller, e))?;

        state.derived_supply_issued = new_supply;
        state.set_balance(*caller, new_balance);
        let event = LedgerEvent::Deposited {
            sequence: state.take_sequence(),
            caller: *caller,
            base_amount: amount,
            derived_amount: minted,
        };
        info!(
            "{caller} deposited {amount} base for {minted} derived (issued {new_supply}/{})",
            self.params.max_derived_supply()
        );
        self.emit(&event);
        Ok(event)
    }

    /// Burn `derived_amount` of `caller`'s derived units and return `derived_amount * ratio` base units
    pub fn convert(&self, caller: &Address, derived_amount: u64) -> Result<LedgerEvent> {
        let mut state = self.lock()?;

        let base_amount = self
            .params
            .derived_to_base(derived_amount)
            .map_err(|e| rejected("convert", caller, e))?;
        let available = state.balance_of(caller);
        if available < derived_amount {
            return Err(rejected(
                "convert",
                caller,
                LedgerError::InsufficientDerivedBalance {
                    required: derived_amount,
                    available,
                },
            ));
        }
        let reserve = self.provider.reserve_balance()?;
        if reserve < base_amount {
            return Err(rejected(
                "convert",
                caller,
                LedgerError::InsufficientReserve {
                    required: base_amount,
                    available: reserve,
                },
            ));
        }

        state.set_balance(*caller, available - derived_amount);
        state.derived_supply_issued -= derived_amount;

        if let Err(e) = self.provider.push_to(caller, base_amount) {
            state.set_balance(*caller, available);
            state.derived_supply_issued += derived_amount;
            return Err(rejected("convert", caller, e));
        }

        let event = LedgerEvent::Converted {
            sequence: state.take_sequence(),
            caller: *caller,
            derived_amount,
            base_amount,
        };
        info!(
            "{caller} converted {derived_amount} derived into {base_amount} base (issued {})",
            state.derived_supply_issued
        );
        self.emit(&event);
        Ok(event)
    }

    // Sinks run under the state lock so they observe events in sequence order
    fn emit(&self, event: &LedgerEvent) {
        for sink in &self.sinks {
            sink.emit(event);
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, LedgerState>> {
        self.state
            .lock()
            .map_err(|_| LedgerError::Database("ledger lock poisoned".to_string()))
    }
}

fn rejected(operation: &str, caller: &Address, err: LedgerError) -> LedgerError {
    warn!("{operation} by {caller} rejected: {err}");
    err
}
