//! JSON document store
//!
//! Layout: two independent documents in the data directory,
//! `expenses.json` (array of expenses) and `incomes.json` (array of
//! incomes). A save only rewrites the documents whose collection changed.
//! Every temp file is written and synced before any of them is renamed
//! into place, so a serialization or write failure leaves both documents
//! untouched.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::{Changed, LedgerSnapshot, LedgerStore};
use crate::error::StorageError;

pub const EXPENSES_FILE: &str = "expenses.json";
pub const INCOMES_FILE: &str = "incomes.json";

/// Ledger store backed by two JSON files
pub struct JsonFileStore {
    data_dir: PathBuf,
}

impl JsonFileStore {
    /// Create a store rooted at `data_dir`, creating the directory if needed
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let data_dir = data_dir.into();
        if !data_dir.exists() {
            fs::create_dir_all(&data_dir).map_err(|source| StorageError::Io {
                path: data_dir.display().to_string(),
                source,
            })?;
            info!("Created data directory: {}", data_dir.display());
        }
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn expenses_path(&self) -> PathBuf {
        self.data_dir.join(EXPENSES_FILE)
    }

    pub fn incomes_path(&self) -> PathBuf {
        self.data_dir.join(INCOMES_FILE)
    }
}

fn read_document<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StorageError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path).map_err(|source| StorageError::Io {
        path: path.display().to_string(),
        source,
    })?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&content).map_err(|source| StorageError::Json {
        path: path.display().to_string(),
        source,
    })
}

/// Serialize `items` into a synced temp file next to `path`
fn stage_document<T: Serialize>(
    dir: &Path,
    path: &Path,
    items: &[T],
) -> Result<(NamedTempFile, PathBuf), StorageError> {
    let io_err = |source| StorageError::Io {
        path: path.display().to_string(),
        source,
    };
    let body = serde_json::to_vec_pretty(items).map_err(|source| StorageError::Json {
        path: path.display().to_string(),
        source,
    })?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(&body).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    Ok((tmp, path.to_path_buf()))
}

fn commit_document((tmp, path): (NamedTempFile, PathBuf)) -> Result<(), StorageError> {
    tmp.persist(&path).map_err(|e| StorageError::Io {
        path: path.display().to_string(),
        source: e.error,
    })?;
    Ok(())
}

impl LedgerStore for JsonFileStore {
    fn name(&self) -> &str {
        "json"
    }

    fn load(&self) -> Result<LedgerSnapshot, StorageError> {
        let snapshot = LedgerSnapshot {
            expenses: read_document(&self.expenses_path())?,
            incomes: read_document(&self.incomes_path())?,
        };
        debug!(
            expenses = snapshot.expenses.len(),
            incomes = snapshot.incomes.len(),
            "Loaded ledger documents from {}",
            self.data_dir.display()
        );
        Ok(snapshot)
    }

    fn save(&self, snapshot: &LedgerSnapshot, changed: Changed) -> Result<(), StorageError> {
        let mut staged = Vec::with_capacity(2);
        if changed.expenses {
            staged.push(stage_document(
                &self.data_dir,
                &self.expenses_path(),
                &snapshot.expenses,
            )?);
        }
        if changed.incomes {
            staged.push(stage_document(
                &self.data_dir,
                &self.incomes_path(),
                &snapshot.incomes,
            )?);
        }
        for document in staged {
            commit_document(document)?;
        }
        debug!(
            expenses = snapshot.expenses.len(),
            incomes = snapshot.incomes.len(),
            expenses_written = changed.expenses,
            incomes_written = changed.incomes,
            "Saved ledger documents"
        );
        Ok(())
    }
}
