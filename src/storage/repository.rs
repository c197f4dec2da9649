//! Generic JSON-file table
//!
//! One `Repository<T>` per record kind, backed by `data/<table>.json`. Rows
//! are kept in memory behind an `RwLock` and written back atomically.
//! Identifiers are assigned from a per-table counter that is persisted with
//! the rows, so ids of deleted records are never reused.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::paths::BillTrackerPaths;
use crate::error::BillTrackerError;
use crate::models::{Record, RecordId};

use super::file_io::{read_json, write_json_atomic};

/// On-disk layout of a table file
#[derive(Debug, Serialize, Deserialize)]
#[serde(bound = "T: Record")]
struct TableFile<T> {
    next_id: RecordId,
    rows: Vec<T>,
}

impl<T> Default for TableFile<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: Vec::new(),
        }
    }
}

#[derive(Debug)]
struct Table<T> {
    next_id: RecordId,
    rows: BTreeMap<RecordId, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

/// Repository for one kind of record
pub struct Repository<T: Record> {
    path: PathBuf,
    data: RwLock<Table<T>>,
}

impl<T: Record> Repository<T> {
    /// Create a repository backed by the given file
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(Table::default()),
        }
    }

    /// Create the repository for `T`'s table under the data directory
    pub fn open(paths: &BillTrackerPaths) -> Self {
        Self::new(paths.table_file(T::KIND.table_name()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load rows from disk, replacing whatever is in memory
    pub fn load(&self) -> Result<(), BillTrackerError> {
        let file: TableFile<T> = read_json(&self.path)?;

        let mut data = self.write_lock()?;
        data.rows.clear();
        data.next_id = file.next_id.max(1);

        for row in file.rows {
            let Some(id) = row.record_id() else {
                warn!(
                    table = T::KIND.table_name(),
                    path = %self.path.display(),
                    "Skipping row without id"
                );
                continue;
            };
            data.next_id = data.next_id.max(id + 1);
            data.rows.insert(id, row);
        }

        Ok(())
    }

    /// Write all rows to disk
    pub fn save(&self) -> Result<(), BillTrackerError> {
        let data = self.read_lock()?;

        let file = TableFile {
            next_id: data.next_id,
            rows: data.rows.values().cloned().collect(),
        };

        write_json_atomic(&self.path, &file)
    }

    /// Get a row by id
    pub fn get(&self, id: RecordId) -> Result<Option<T>, BillTrackerError> {
        Ok(self.read_lock()?.rows.get(&id).cloned())
    }

    /// All rows in id order
    pub fn all(&self) -> Result<Vec<T>, BillTrackerError> {
        Ok(self.read_lock()?.rows.values().cloned().collect())
    }

    /// Rows matching a predicate, in id order
    pub fn find_by<F>(&self, predicate: F) -> Result<Vec<T>, BillTrackerError>
    where
        F: Fn(&T) -> bool,
    {
        Ok(self
            .read_lock()?
            .rows
            .values()
            .filter(|row| predicate(row))
            .cloned()
            .collect())
    }

    pub fn exists(&self, id: RecordId) -> Result<bool, BillTrackerError> {
        Ok(self.read_lock()?.rows.contains_key(&id))
    }

    pub fn count(&self) -> Result<usize, BillTrackerError> {
        Ok(self.read_lock()?.rows.len())
    }

    /// Insert or replace a row in memory
    ///
    /// Assigns the next id if the row has none. Returns the row it replaced,
    /// `None` if the row is new to the table.
    pub fn upsert(&self, row: &mut T) -> Result<Option<T>, BillTrackerError> {
        let mut data = self.write_lock()?;

        let id = match row.record_id() {
            Some(id) => id,
            None => {
                let id = data.next_id;
                row.assign_id(id);
                id
            }
        };
        data.next_id = data.next_id.max(id + 1);

        Ok(data.rows.insert(id, row.clone()))
    }

    /// Remove a row from memory, returning it if it existed
    pub fn remove(&self, id: RecordId) -> Result<Option<T>, BillTrackerError> {
        Ok(self.write_lock()?.rows.remove(&id))
    }

    /// Put back the in-memory state of one row after a failed write
    ///
    /// `previous` is what the row held before the change; `None` removes it.
    /// The id counter is not wound back.
    pub fn restore(&self, id: RecordId, previous: Option<T>) -> Result<(), BillTrackerError> {
        let mut data = self.write_lock()?;
        match previous {
            Some(row) => data.rows.insert(id, row),
            None => data.rows.remove(&id),
        };
        Ok(())
    }

    /// Replace the whole table in memory
    ///
    /// Bulk operation: bypasses the audit hooks.
    pub fn replace_all(&self, rows: Vec<T>) -> Result<(), BillTrackerError> {
        let mut data = self.write_lock()?;
        data.rows.clear();

        for mut row in rows {
            let id = match row.record_id() {
                Some(id) => id,
                None => {
                    let id = data.next_id;
                    row.assign_id(id);
                    id
                }
            };
            data.next_id = data.next_id.max(id + 1);
            data.rows.insert(id, row);
        }

        Ok(())
    }

    /// Modify every row matching a predicate in memory, returning how many
    ///
    /// Bulk operation: bypasses the audit hooks.
    pub fn update_where<P, F>(&self, predicate: P, mut update: F) -> Result<usize, BillTrackerError>
    where
        P: Fn(&T) -> bool,
        F: FnMut(&mut T),
    {
        let mut data = self.write_lock()?;
        let mut count = 0;

        for row in data.rows.values_mut().filter(|row| predicate(row)) {
            update(row);
            count += 1;
        }

        Ok(count)
    }

    /// Poison the table lock, as a panicking writer would
    #[cfg(test)]
    pub(crate) fn poison(&self) {
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = self.data.write();
            panic!("writer panicked");
        }));
    }

    fn read_lock(&self) -> Result<std::sync::RwLockReadGuard<'_, Table<T>>, BillTrackerError> {
        self.data.read().map_err(|e| {
            BillTrackerError::Storage(format!("Failed to acquire read lock: {}", e))
        })
    }

    fn write_lock(&self) -> Result<std::sync::RwLockWriteGuard<'_, Table<T>>, BillTrackerError> {
        self.data.write().map_err(|e| {
            BillTrackerError::Storage(format!("Failed to acquire write lock: {}", e))
        })
    }
}
