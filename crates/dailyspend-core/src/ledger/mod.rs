//! Ledger of expenses and incomes with pluggable snapshot storage
//!
//! The store only ever sees whole-collection snapshots. All mutations go
//! through `Ledger`, which holds a single-writer lock across the
//! duplicate check, the append and the save, so concurrent adds cannot
//! both pass the duplicate check.
//!
//! # Duplicate detection
//!
//! Two independent strategies, composed with OR:
//! - identity: same `id` as an existing entry
//! - content: same label, amount, category/type and calendar day
//!   (compared through a SHA-256 content hash)

mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Error, Result, StorageError};
use crate::models::{Expense, Income, Transaction};

/// Full contents of the ledger as persisted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub expenses: Vec<Expense>,
    pub incomes: Vec<Income>,
}

impl LedgerSnapshot {
    /// Both collections merged, newest first
    pub fn transactions(&self) -> Vec<Transaction> {
        let mut all: Vec<Transaction> = self
            .expenses
            .iter()
            .cloned()
            .map(Transaction::Expense)
            .chain(self.incomes.iter().cloned().map(Transaction::Income))
            .collect();
        all.sort_by(|a, b| b.date().cmp(&a.date()));
        all
    }
}

/// Which collections differ between two snapshots
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Changed {
    pub expenses: bool,
    pub incomes: bool,
}

impl Changed {
    pub const ALL: Changed = Changed {
        expenses: true,
        incomes: true,
    };

    pub fn between(old: &LedgerSnapshot, new: &LedgerSnapshot) -> Self {
        Self {
            expenses: old.expenses != new.expenses,
            incomes: old.incomes != new.incomes,
        }
    }

    pub fn any(&self) -> bool {
        self.expenses || self.incomes
    }
}

/// Snapshot persistence for the ledger
///
/// `save` receives the full snapshot plus the set of collections that
/// changed since the last successful save. Stores may skip unchanged
/// collections; partial writes must never become visible.
pub trait LedgerStore: Send + Sync {
    /// Name of this store (for logging)
    fn name(&self) -> &str;

    /// Load the current snapshot (empty if nothing was saved yet)
    fn load(&self) -> std::result::Result<LedgerSnapshot, StorageError>;

    /// Persist the collections marked in `changed`
    fn save(
        &self,
        snapshot: &LedgerSnapshot,
        changed: Changed,
    ) -> std::result::Result<(), StorageError>;
}

/// Why an entry was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateReason {
    SameId,
    SameContent,
}

/// Result of adding an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    Duplicate(DuplicateReason),
}

impl AddOutcome {
    pub fn is_added(&self) -> bool {
        matches!(self, AddOutcome::Added)
    }
}

/// Hash of the fields that make two entries "the same" for dedup
fn content_hash(kind: &str, label: &str, amount: f64, class: &str, day: NaiveDate) -> String {
    let mut hasher = Sha256::new();
    hasher.update(kind.as_bytes());
    hasher.update(label.trim().to_lowercase().as_bytes());
    hasher.update(((amount * 100.0).round() as i64).to_be_bytes());
    hasher.update(class.as_bytes());
    hasher.update(day.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

pub fn expense_hash(expense: &Expense) -> String {
    content_hash(
        "expense",
        &expense.name,
        expense.cost,
        expense.category.as_str(),
        expense.calendar_date(),
    )
}

pub fn income_hash(income: &Income) -> String {
    content_hash(
        "income",
        &income.source,
        income.amount,
        income.income_type.as_str(),
        income.calendar_date(),
    )
}

fn check_duplicate<T>(
    existing: &[T],
    candidate: &T,
    id: impl Fn(&T) -> Uuid,
    hash: impl Fn(&T) -> String,
) -> Option<DuplicateReason> {
    let candidate_id = id(candidate);
    if existing.iter().any(|e| id(e) == candidate_id) {
        return Some(DuplicateReason::SameId);
    }
    let candidate_hash = hash(candidate);
    if existing.iter().any(|e| hash(e) == candidate_hash) {
        return Some(DuplicateReason::SameContent);
    }
    None
}

/// The user's ledger, backed by a snapshot store
pub struct Ledger {
    store: Box<dyn LedgerStore>,
    state: Mutex<LedgerSnapshot>,
}

impl Ledger {
    /// Open a ledger, loading the current snapshot from `store`
    pub fn open(store: impl LedgerStore + 'static) -> Result<Self> {
        let snapshot = store.load()?;
        info!(
            store = store.name(),
            expenses = snapshot.expenses.len(),
            incomes = snapshot.incomes.len(),
            "Ledger loaded"
        );
        Ok(Self {
            store: Box::new(store),
            state: Mutex::new(snapshot),
        })
    }

    /// In-memory ledger with no persistence beyond the process
    pub fn in_memory() -> Self {
        Self {
            store: Box::new(MemoryStore::new()),
            state: Mutex::new(LedgerSnapshot::default()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, LedgerSnapshot>> {
        self.state
            .lock()
            .map_err(|_| Error::Storage(StorageError::Unavailable("ledger lock poisoned".into())))
    }

    /// Apply `mutate` to a copy of the snapshot, save it, then publish it
    ///
    /// If the save fails the in-memory state is left untouched.
    fn commit<T>(
        &self,
        mutate: impl FnOnce(&mut LedgerSnapshot) -> (T, bool),
    ) -> Result<T> {
        let mut state = self.lock()?;
        let mut next = state.clone();
        let (value, mutated) = mutate(&mut next);
        let changed = Changed::between(&state, &next);
        if mutated && changed.any() {
            self.store.save(&next, changed)?;
            *state = next;
        }
        Ok(value)
    }

    pub fn add_expense(&self, expense: Expense) -> Result<AddOutcome> {
        self.commit(|snapshot| {
            match check_duplicate(&snapshot.expenses, &expense, |e| e.id, expense_hash) {
                Some(reason) => {
                    debug!(name = %expense.name, ?reason, "Skipping duplicate expense");
                    (AddOutcome::Duplicate(reason), false)
                }
                None => {
                    snapshot.expenses.push(expense);
                    (AddOutcome::Added, true)
                }
            }
        })
    }

    pub fn add_income(&self, income: Income) -> Result<AddOutcome> {
        self.commit(|snapshot| {
            match check_duplicate(&snapshot.incomes, &income, |i| i.id, income_hash) {
                Some(reason) => {
                    debug!(source = %income.source, ?reason, "Skipping duplicate income");
                    (AddOutcome::Duplicate(reason), false)
                }
                None => {
                    snapshot.incomes.push(income);
                    (AddOutcome::Added, true)
                }
            }
        })
    }

    /// Remove an expense by id, returning whether it existed
    pub fn remove_expense(&self, id: Uuid) -> Result<bool> {
        self.commit(|snapshot| {
            let before = snapshot.expenses.len();
            snapshot.expenses.retain(|e| e.id != id);
            let removed = snapshot.expenses.len() != before;
            (removed, removed)
        })
    }

    /// Remove an income by id, returning whether it existed
    pub fn remove_income(&self, id: Uuid) -> Result<bool> {
        self.commit(|snapshot| {
            let before = snapshot.incomes.len();
            snapshot.incomes.retain(|i| i.id != id);
            let removed = snapshot.incomes.len() != before;
            (removed, removed)
        })
    }

    /// Remove whichever entry has `id`
    pub fn remove(&self, id: Uuid) -> Result<bool> {
        if self.remove_expense(id)? {
            return Ok(true);
        }
        self.remove_income(id)
    }

    /// Replace an expense: delete `id` and insert `replacement` in one commit
    pub fn replace_expense(&self, id: Uuid, replacement: Expense) -> Result<AddOutcome> {
        let outcome = self.commit(|snapshot| {
            let Some(pos) = snapshot.expenses.iter().position(|e| e.id == id) else {
                return (None, false);
            };
            snapshot.expenses.remove(pos);
            match check_duplicate(&snapshot.expenses, &replacement, |e| e.id, expense_hash) {
                Some(reason) => (Some(AddOutcome::Duplicate(reason)), false),
                None => {
                    snapshot.expenses.push(replacement);
                    (Some(AddOutcome::Added), true)
                }
            }
        })?;
        outcome.ok_or_else(|| Error::NotFound(format!("expense {}", id)))
    }

    /// Replace an income: delete `id` and insert `replacement` in one commit
    pub fn replace_income(&self, id: Uuid, replacement: Income) -> Result<AddOutcome> {
        let outcome = self.commit(|snapshot| {
            let Some(pos) = snapshot.incomes.iter().position(|i| i.id == id) else {
                return (None, false);
            };
            snapshot.incomes.remove(pos);
            match check_duplicate(&snapshot.incomes, &replacement, |i| i.id, income_hash) {
                Some(reason) => (Some(AddOutcome::Duplicate(reason)), false),
                None => {
                    snapshot.incomes.push(replacement);
                    (Some(AddOutcome::Added), true)
                }
            }
        })?;
        outcome.ok_or_else(|| Error::NotFound(format!("income {}", id)))
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> Result<LedgerSnapshot> {
        Ok(self.lock()?.clone())
    }

    /// All transactions, newest first
    pub fn history(&self) -> Result<Vec<Transaction>> {
        Ok(self.lock()?.transactions())
    }

    pub fn expenses_for_month(&self, month: u32, year: i32) -> Result<Vec<Expense>> {
        Ok(self
            .lock()?
            .expenses
            .iter()
            .filter(|e| e.falls_in(month, year))
            .cloned()
            .collect())
    }

    pub fn incomes_for_month(&self, month: u32, year: i32) -> Result<Vec<Income>> {
        Ok(self
            .lock()?
            .incomes
            .iter()
            .filter(|i| i.falls_in(month, year))
            .cloned()
            .collect())
    }

    /// Re-read the snapshot from the store, discarding in-memory state
    pub fn reload(&self) -> Result<()> {
        let fresh = self.store.load()?;
        *self.lock()? = fresh;
        Ok(())
    }
}
