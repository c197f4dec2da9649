//! CSV Export functionality
//!
//! One row per audit record. Before/after maps are written as compact JSON
//! cells so the export stays spreadsheet-friendly.

use crate::audit::AuditRecord;
use crate::error::{BillTrackerError, BillTrackerResult};
use serde_json::Value;
use std::io::Write;

const HEADER: [&str; 8] = [
    "ID",
    "Timestamp",
    "User",
    "Action",
    "Table",
    "Row ID",
    "Before",
    "After",
];

/// Export audit records to CSV
pub fn export_audit_csv<W: Write>(records: &[AuditRecord], writer: W) -> BillTrackerResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(HEADER)
        .map_err(|e| BillTrackerError::Export(e.to_string()))?;

    for record in records {
        csv_writer
            .write_record([
                record.id.to_string(),
                record.timestamp.to_rfc3339(),
                record.user.map(|u| u.to_string()).unwrap_or_default(),
                record.action.to_string(),
                record.table_name.clone(),
                record.row_id.to_string(),
                json_cell(record.before_values.as_ref()),
                json_cell(record.after_values.as_ref()),
            ])
            .map_err(|e| BillTrackerError::Export(e.to_string()))?;
    }

    csv_writer
        .flush()
        .map_err(|e| BillTrackerError::Export(e.to_string()))?;

    Ok(())
}

fn json_cell(value: Option<&Value>) -> String {
    value.map(Value::to_string).unwrap_or_default()
}
