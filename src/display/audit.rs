//! Audit record display formatting
//!
//! Formats audit records for terminal output in table and detail views.

use serde_json::Value;

use crate::audit::{field_changes, AuditRecord};

/// Format a list of audit records as a table
pub fn format_audit_list(records: &[AuditRecord]) -> String {
    if records.is_empty() {
        return "No audit records found.".to_string();
    }

    let table_width = records
        .iter()
        .map(|r| r.table_name.len())
        .max()
        .unwrap_or(5)
        .max(5);

    let mut output = String::new();
    output.push_str(&format!(
        "{:>6}  {:<19}  {:<8}  {:<6}  {:<table_width$}  {:>6}\n",
        "ID",
        "Timestamp (UTC)",
        "User",
        "Action",
        "Table",
        "Row",
        table_width = table_width,
    ));

    output.push_str(&format!(
        "{:->6}  {:-<19}  {:-<8}  {:-<6}  {:-<table_width$}  {:->6}\n",
        "",
        "",
        "",
        "",
        "",
        "",
        table_width = table_width,
    ));

    for record in records {
        output.push_str(&format!(
            "{:>6}  {:<19}  {:<8}  {:<6}  {:<table_width$}  {:>6}\n",
            record.id,
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            actor_label(record),
            record.action.to_string(),
            record.table_name,
            record.row_id,
            table_width = table_width,
        ));
    }

    output
}

/// Format a single audit record with its before/after values and changes
pub fn format_audit_details(record: &AuditRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!("Audit Record #{}\n", record.id));
    output.push_str(&format!(
        "  Timestamp: {}\n",
        record.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    output.push_str(&format!("  User:      {}\n", actor_label(record)));
    output.push_str(&format!("  Action:    {}\n", record.action));
    output.push_str(&format!(
        "  Record:    {} {}\n",
        record.table_name, record.row_id
    ));

    output.push('\n');
    output.push_str(&format!(
        "  Before: {}\n",
        pretty(record.before_values.as_ref())
    ));
    output.push_str(&format!(
        "  After:  {}\n",
        pretty(record.after_values.as_ref())
    ));

    if let (Some(before), Some(after)) = (&record.before_values, &record.after_values) {
        let changes = field_changes(before, after);
        output.push('\n');
        if changes.is_empty() {
            output.push_str("  No field changes\n");
        } else {
            output.push_str("  Changes:\n");
            for change in changes {
                output.push_str(&format!("    {}\n", change));
            }
        }
    }

    output
}

fn actor_label(record: &AuditRecord) -> String {
    record
        .user
        .map(|u| u.to_string())
        .unwrap_or_else(|| "system".to_string())
}

fn pretty(value: Option<&Value>) -> String {
    match value {
        None => "(none)".to_string(),
        Some(value) => serde_json::to_string_pretty(value)
            .unwrap_or_else(|_| value.to_string())
            .replace('\n', "\n  "),
    }
}
