//! JSON Export functionality
//!
//! Exports audit records to JSON with schema versioning.

use crate::audit::AuditRecord;
use crate::error::{BillTrackerError, BillTrackerResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Audit log export structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditExport {
    /// Schema version for compatibility checking
    pub schema_version: String,

    /// Export timestamp
    pub exported_at: DateTime<Utc>,

    /// Application version that created the export
    pub app_version: String,

    pub record_count: usize,

    /// Exported records, oldest first
    pub records: Vec<AuditRecord>,
}

impl AuditExport {
    pub fn new(records: Vec<AuditRecord>) -> Self {
        Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            record_count: records.len(),
            records,
        }
    }
}

/// Export audit records as pretty-printed JSON
pub fn export_audit_json<W: Write>(
    records: Vec<AuditRecord>,
    writer: &mut W,
) -> BillTrackerResult<()> {
    let export = AuditExport::new(records);

    serde_json::to_writer_pretty(&mut *writer, &export)
        .map_err(|e| BillTrackerError::Export(e.to_string()))?;
    writeln!(writer).map_err(|e| BillTrackerError::Export(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{AuditAction, AuditDraft};
    use crate::models::{EntityKind, UserId};
    use serde_json::json;

    #[test]
    fn test_export_json() {
        let draft = AuditDraft::add(
            Some(UserId::new(1)),
            EntityKind::Bill,
            1,
            json!({"id": 1, "default_amount_due": 1200.0}),
        );
        let record = AuditRecord::from_draft(1, draft, Utc::now());

        let mut output = Vec::new();
        export_audit_json(vec![record], &mut output).unwrap();

        let parsed: AuditExport = serde_json::from_slice(&output).unwrap();
        assert_eq!(parsed.schema_version, EXPORT_SCHEMA_VERSION);
        assert_eq!(parsed.record_count, 1);
        assert_eq!(parsed.records[0].action, AuditAction::Add);
        assert_eq!(
            parsed.records[0].after_values,
            Some(json!({"id": 1, "default_amount_due": 1200.0}))
        );
    }

    #[test]
    fn test_export_empty() {
        let mut output = Vec::new();
        export_audit_json(Vec::new(), &mut output).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(value["record_count"], json!(0));
        assert_eq!(value["records"], json!([]));
    }
}
