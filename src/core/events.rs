use crate::error::{LedgerError, Result};
use crate::utils::Address;
use log::info;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// Record of a committed ledger operation
///
/// `sequence` is assigned by the ledger, starting at 0 and increasing by one
/// per committed operation, so consumers can order and de-duplicate events.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
#[serde(tag = "type")]
pub enum LedgerEvent {
    Deposited {
        sequence: u64,
        caller: Address,
        base_amount: u64,
        derived_amount: u64,
    },
    Converted {
        sequence: u64,
        caller: Address,
        derived_amount: u64,
        base_amount: u64,
    },
}

impl LedgerEvent {
    pub fn sequence(&self) -> u64 {
        match self {
            LedgerEvent::Deposited { sequence, .. } | LedgerEvent::Converted { sequence, .. } => {
                *sequence
            }
        }
    }

    pub fn caller(&self) -> Address {
        match self {
            LedgerEvent::Deposited { caller, .. } | LedgerEvent::Converted { caller, .. } => {
                *caller
            }
        }
    }

    pub fn base_amount(&self) -> u64 {
        match self {
            LedgerEvent::Deposited { base_amount, .. }
            | LedgerEvent::Converted { base_amount, .. } => *base_amount,
        }
    }

    pub fn derived_amount(&self) -> u64 {
        match self {
            LedgerEvent::Deposited { derived_amount, .. }
            | LedgerEvent::Converted { derived_amount, .. } => *derived_amount,
        }
    }
}

/// Observer notified after every committed operation
///
/// Sinks are called while the ledger still holds its state lock, which is
/// what keeps them in sequence order across threads. A sink must not call
/// back into the ledger that notifies it: that would deadlock.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &LedgerEvent);
}

/// Writes events through the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: &LedgerEvent) {
        match event {
            LedgerEvent::Deposited {
                sequence,
                caller,
                base_amount,
                derived_amount,
            } => info!(
                "event #{sequence}: {caller} deposited {base_amount} base, minted {derived_amount} derived"
            ),
            LedgerEvent::Converted {
                sequence,
                caller,
                derived_amount,
                base_amount,
            } => info!(
                "event #{sequence}: {caller} burned {derived_amount} derived, received {base_amount} base"
            ),
        }
    }
}

/// Keeps every event in memory in emission order
#[derive(Default)]
pub struct MemoryEventLog {
    inner: RwLock<Vec<LedgerEvent>>,
}

impl MemoryEventLog {
    pub fn new() -> MemoryEventLog {
        MemoryEventLog {
            inner: RwLock::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<LedgerEvent> {
        match self.inner.read() {
            Ok(events) => events.clone(),
            Err(_) => {
                log::error!("Failed to acquire read lock on event log");
                Vec::new()
            }
        }
    }

    pub fn len(&self) -> usize {
        match self.inner.read() {
            Ok(events) => events.len(),
            Err(_) => {
                log::error!("Failed to acquire read lock on event log");
                0
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hand out everything collected so far and start over
    pub fn drain(&self) -> Result<Vec<LedgerEvent>> {
        let mut events = self
            .inner
            .write()
            .map_err(|_| LedgerError::Database("event log lock poisoned".to_string()))?;
        Ok(std::mem::take(&mut *events))
    }
}

impl EventSink for MemoryEventLog {
    fn emit(&self, event: &LedgerEvent) {
        match self.inner.write() {
            Ok(mut events) => events.push(event.clone()),
            Err(_) => log::error!("Failed to acquire write lock on event log"),
        }
    }
}

// Lets a caller keep a handle on a sink it also registered with the ledger
impl<S: EventSink + ?Sized> EventSink for std::sync::Arc<S> {
    fn emit(&self, event: &LedgerEvent) {
        (**self).emit(event)
    }
}
