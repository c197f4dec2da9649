//! Append-only audit log
//!
//! Provides the `AuditSink` seam the change interceptor writes through, and
//! `AuditLog`, which stores records in a line-delimited JSON file (JSONL).
//! Each record is written as a single line and flushed immediately. There is
//! no update or delete path for records once written.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use tracing::info;

use super::entry::{AuditDraft, AuditRecord};
use crate::error::{BillTrackerError, BillTrackerResult};
use crate::models::UserId;

/// Destination for audit records
pub trait AuditSink {
    /// Durably persist a new record, assigning its id and timestamp
    ///
    /// Any failure to persist is returned as `BillTrackerError::Audit`.
    fn append(&self, draft: AuditDraft) -> BillTrackerResult<AuditRecord>;
}

/// Handles writing audit records to the audit log file
pub struct AuditLog {
    /// Path to the audit log file
    log_path: PathBuf,
    /// Next record id; recovered from the file on first append
    next_id: Mutex<Option<u64>>,
}

impl AuditLog {
    /// Create an AuditLog that writes to the specified path
    pub fn new(log_path: PathBuf) -> Self {
        Self {
            log_path,
            next_id: Mutex::new(None),
        }
    }

    /// Read all audit records, oldest first
    pub fn read_all(&self) -> BillTrackerResult<Vec<AuditRecord>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.log_path)
            .map_err(|e| BillTrackerError::Io(format!("Failed to open audit log: {}", e)))?;

        let reader = BufReader::new(file);
        let mut records = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| {
                BillTrackerError::Io(format!(
                    "Failed to read audit log line {}: {}",
                    line_num + 1,
                    e
                ))
            })?;

            if line.trim().is_empty() {
                continue;
            }

            let record: AuditRecord = serde_json::from_str(&line).map_err(|e| {
                BillTrackerError::Json(format!(
                    "Failed to parse audit record at line {}: {}",
                    line_num + 1,
                    e
                ))
            })?;

            records.push(record);
        }

        Ok(records)
    }

    /// Records attributed to one user, oldest first
    pub fn read_for_user(&self, user: UserId) -> BillTrackerResult<Vec<AuditRecord>> {
        Ok(self
            .read_all()?
            .into_iter()
            .filter(|r| r.user == Some(user))
            .collect())
    }

    /// The most recent `count` records, oldest first
    pub fn read_recent(&self, count: usize) -> BillTrackerResult<Vec<AuditRecord>> {
        let mut records = self.read_all()?;
        let start = records.len().saturating_sub(count);
        Ok(records.split_off(start))
    }

    /// Look up a single record by id
    pub fn get(&self, id: u64) -> BillTrackerResult<Option<AuditRecord>> {
        Ok(self.read_all()?.into_iter().find(|r| r.id == id))
    }

    /// Number of records in the log
    pub fn entry_count(&self) -> BillTrackerResult<usize> {
        Ok(self.read_all()?.len())
    }

    /// Check if the audit log file exists
    pub fn exists(&self) -> bool {
        self.log_path.exists()
    }

    /// Get the path to the audit log file
    pub fn path(&self) -> &Path {
        &self.log_path
    }

    fn recover_next_id(&self) -> BillTrackerResult<u64> {
        let last = self.read_all()?.iter().map(|r| r.id).max().unwrap_or(0);
        Ok(last + 1)
    }

    fn write_line(&self, record: &AuditRecord) -> BillTrackerResult<()> {
        let json = serde_json::to_string(record).map_err(|e| {
            BillTrackerError::Audit(format!("Failed to serialize audit record: {}", e))
        })?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| BillTrackerError::Audit(format!("Failed to open audit log: {}", e)))?;

        writeln!(file, "{}", json)
            .map_err(|e| BillTrackerError::Audit(format!("Failed to write audit record: {}", e)))?;

        file.flush()
            .map_err(|e| BillTrackerError::Audit(format!("Failed to flush audit log: {}", e)))?;

        Ok(())
    }
}

impl AuditSink for AuditLog {
    fn append(&self, draft: AuditDraft) -> BillTrackerResult<AuditRecord> {
        if !draft.has_values() {
            return Err(BillTrackerError::Validation(format!(
                "Audit record for {} {} has neither before nor after values",
                draft.table_name, draft.row_id
            )));
        }

        let mut next_id = self
            .next_id
            .lock()
            .map_err(|e| BillTrackerError::Audit(format!("Audit log lock poisoned: {}", e)))?;

        let id = match *next_id {
            Some(id) => id,
            None => self
                .recover_next_id()
                .map_err(|e| BillTrackerError::Audit(e.to_string()))?,
        };

        let record = AuditRecord::from_draft(id, draft, Utc::now());
        self.write_line(&record)?;
        *next_id = Some(id + 1);

        info!(
            audit_id = record.id,
            action = %record.action,
            table = %record.table_name,
            row_id = record.row_id,
            user = ?record.user.map(|u| u.get()),
            "Audit record written"
        );

        Ok(record)
    }
}
