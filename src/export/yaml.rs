//! YAML Export functionality
//!
//! Exports audit records to YAML for human-readable review.

use crate::audit::AuditRecord;
use crate::error::{BillTrackerError, BillTrackerResult};
use crate::export::json::AuditExport;
use std::io::Write;

/// Export audit records to YAML
pub fn export_audit_yaml<W: Write>(
    records: Vec<AuditRecord>,
    writer: &mut W,
) -> BillTrackerResult<()> {
    let export = AuditExport::new(records);

    writeln!(writer, "# BillTracker Audit Log Export")
        .map_err(|e| BillTrackerError::Export(e.to_string()))?;
    writeln!(writer, "# Generated: {}", export.exported_at)
        .map_err(|e| BillTrackerError::Export(e.to_string()))?;
    writeln!(writer).map_err(|e| BillTrackerError::Export(e.to_string()))?;

    serde_yaml::to_writer(writer, &export).map_err(|e| BillTrackerError::Export(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{AuditAction, AuditDraft};
    use crate::models::{EntityKind, UserId};
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn test_export_yaml() {
        let draft = AuditDraft::update(
            Some(UserId::new(1)),
            EntityKind::Bill,
            1,
            Some(json!({"default_amount_due": 1200.0})),
            json!({"default_amount_due": 1300.0}),
        );
        let record = AuditRecord::from_draft(2, draft, Utc::now());

        let mut output = Vec::new();
        export_audit_yaml(vec![record], &mut output).unwrap();

        let yaml = String::from_utf8(output).unwrap();
        assert!(yaml.starts_with("# BillTracker Audit Log Export"));
        assert!(yaml.contains("action: update"));
        assert!(yaml.contains("table_name: Bill"));

        let parsed: AuditExport = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.records[0].action, AuditAction::Update);
        assert_eq!(
            parsed.records[0].before_values,
            Some(json!({"default_amount_due": 1200.0}))
        );
    }
}
