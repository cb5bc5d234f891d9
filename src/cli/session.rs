use crate::config::Settings;
use crate::core::{ExchangeLedger, LogSink, MemoryEventLog};
use crate::error::{LedgerError, Result};
use crate::provider::TokenVault;
use crate::storage::LedgerStore;
use log::info;
use std::sync::Arc;

/// A ledger loaded from disk for the span of one command
///
/// Nothing reaches the store until `commit`, so a command that fails
/// part-way leaves the database as it was.
pub struct Session {
    store: LedgerStore,
    ledger: ExchangeLedger<TokenVault>,
    pending: Arc<MemoryEventLog>,
}

impl Session {
    /// Initialize a fresh store with the configured parameters
    pub fn create(settings: &Settings) -> Result<Session> {
        let store = LedgerStore::open(&settings.data_dir)?;
        if store.is_initialized()? {
            return Err(LedgerError::Config(format!(
                "a ledger already exists in {}",
                store.path().display()
            )));
        }
        let token = TokenVault::new(settings.custodian());
        let pending = Arc::new(MemoryEventLog::new());
        let ledger = ExchangeLedger::new(settings.params()?, token)
            .with_sink(LogSink)
            .with_sink(Arc::clone(&pending));
        info!("Initialized ledger in {}", store.path().display());
        Ok(Session {
            store,
            ledger,
            pending,
        })
    }

    /// Load the ledger stored under the configured data directory
    pub fn open(settings: &Settings) -> Result<Session> {
        let store = LedgerStore::open(&settings.data_dir)?;
        let (ledger_snapshot, token_snapshot) = store.load()?.ok_or_else(|| {
            LedgerError::Config(format!(
                "no ledger in {}; run `init` first",
                store.path().display()
            ))
        })?;
        let token = TokenVault::from_snapshot(token_snapshot)?;
        let pending = Arc::new(MemoryEventLog::new());
        let ledger = ExchangeLedger::from_snapshot(ledger_snapshot, token)?
            .with_sink(LogSink)
            .with_sink(Arc::clone(&pending));
        Ok(Session {
            store,
            ledger,
            pending,
        })
    }

    pub fn ledger(&self) -> &ExchangeLedger<TokenVault> {
        &self.ledger
    }

    pub fn token(&self) -> &TokenVault {
        self.ledger.provider()
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    /// Persist ledger, token and the events raised since opening
    pub fn commit(&self) -> Result<()> {
        let ledger = self.ledger.snapshot()?;
        let token = self.token().snapshot()?;
        let events = self.pending.drain()?;
        self.store.save(&ledger, &token, &events)
    }
}
