//! In-memory ledger store

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::{Changed, LedgerSnapshot, LedgerStore};
use crate::error::StorageError;

/// Ledger store held in process memory
///
/// Clones share the same underlying snapshot. `set_failing(true)` makes
/// every subsequent load/save fail, for exercising error paths.
#[derive(Clone, Default)]
pub struct MemoryStore {
    snapshot: Arc<Mutex<LedgerSnapshot>>,
    failing: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `snapshot`
    pub fn with_snapshot(snapshot: LedgerSnapshot) -> Self {
        Self {
            snapshot: Arc::new(Mutex::new(snapshot)),
            failing: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StorageError::Unavailable("memory store set to fail".into()))
        } else {
            Ok(())
        }
    }
}

impl LedgerStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn load(&self) -> Result<LedgerSnapshot, StorageError> {
        self.check()?;
        self.snapshot
            .lock()
            .map(|s| s.clone())
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".into()))
    }

    fn save(&self, snapshot: &LedgerSnapshot, _changed: Changed) -> Result<(), StorageError> {
        self.check()?;
        let mut guard = self
            .snapshot
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".into()))?;
        *guard = snapshot.clone();
        Ok(())
    }
}
