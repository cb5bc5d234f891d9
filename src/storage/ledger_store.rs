// Sled-backed persistence for the ledger, its token and the event journal.
// Everything lives in one tree so a whole operation can be written with a
// single atomic batch.

use crate::core::{LedgerEvent, LedgerSnapshot};
use crate::error::{LedgerError, Result};
use crate::provider::TokenSnapshot;
use crate::utils::{deserialize, serialize};
use log::{debug, info};
use sled::{Batch, Db, Tree};
use std::path::{Path, PathBuf};

const STATE_TREE: &str = "exchange";
const LEDGER_KEY: &[u8] = b"ledger";
const TOKEN_KEY: &[u8] = b"token";
const EVENT_PREFIX: &[u8] = b"event/";

// Big-endian so lexicographic key order is sequence order
fn event_key(sequence: u64) -> Vec<u8> {
    let mut key = EVENT_PREFIX.to_vec();
    key.extend_from_slice(&sequence.to_be_bytes());
    key
}

pub struct LedgerStore {
    db: Db,
    tree: Tree,
    path: PathBuf,
}

impl LedgerStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<LedgerStore> {
        let path = path.as_ref().to_path_buf();
        let db = sled::open(&path)
            .map_err(|e| LedgerError::Database(format!("Failed to open database: {e}")))?;
        let tree = db
            .open_tree(STATE_TREE)
            .map_err(|e| LedgerError::Database(format!("Failed to open state tree: {e}")))?;
        debug!("Opened ledger store at {}", path.display());
        Ok(LedgerStore { db, tree, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_initialized(&self) -> Result<bool> {
        self.tree
            .contains_key(LEDGER_KEY)
            .map_err(|e| LedgerError::Database(format!("Failed to read ledger key: {e}")))
    }

    /// Both snapshots, or `None` for a fresh store
    pub fn load(&self) -> Result<Option<(LedgerSnapshot, TokenSnapshot)>> {
        let ledger = self
            .tree
            .get(LEDGER_KEY)
            .map_err(|e| LedgerError::Database(format!("Failed to read ledger: {e}")))?;
        let token = self
            .tree
            .get(TOKEN_KEY)
            .map_err(|e| LedgerError::Database(format!("Failed to read token: {e}")))?;

        match (ledger, token) {
            (None, None) => Ok(None),
            (Some(ledger), Some(token)) => {
                let ledger: LedgerSnapshot = deserialize(ledger.as_ref())?;
                let token: TokenSnapshot = deserialize(token.as_ref())?;
                Ok(Some((ledger, token)))
            }
            _ => Err(LedgerError::Database(
                "store holds only half of the ledger state".to_string(),
            )),
        }
    }

    /// Write ledger, token and the events produced since the last save in one batch
    pub fn save(
        &self,
        ledger: &LedgerSnapshot,
        token: &TokenSnapshot,
        events: &[LedgerEvent],
    ) -> Result<()> {
        let mut batch = Batch::default();
        batch.insert(LEDGER_KEY, serialize(ledger)?);
        batch.insert(TOKEN_KEY, serialize(token)?);
        for event in events {
            batch.insert(event_key(event.sequence()), serialize(event)?);
        }
        self.tree
            .apply_batch(batch)
            .map_err(|e| LedgerError::Database(format!("Failed to apply batch: {e}")))?;
        self.db
            .flush()
            .map_err(|e| LedgerError::Database(format!("Failed to flush database: {e}")))?;
        info!(
            "Saved ledger state (issued {}, {} new events)",
            ledger.derived_supply_issued,
            events.len()
        );
        Ok(())
    }

    /// Journal of every saved event, oldest first
    pub fn events(&self) -> Result<Vec<LedgerEvent>> {
        let mut events = Vec::new();
        for item in self.tree.scan_prefix(EVENT_PREFIX) {
            let (_, v) = item
                .map_err(|e| LedgerError::Database(format!("Failed to iterate events: {e}")))?;
            events.push(deserialize(v.as_ref())?);
        }
        Ok(events)
    }

    pub fn event_count(&self) -> Result<usize> {
        let mut count = 0;
        for item in self.tree.scan_prefix(EVENT_PREFIX) {
            item.map_err(|e| LedgerError::Database(format!("Failed to iterate events: {e}")))?;
            count += 1;
        }
        Ok(count)
    }
}
