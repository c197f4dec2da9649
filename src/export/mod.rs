//! Export module for BillTracker
//!
//! Exports the audit log in multiple formats:
//! - CSV: one row per record (spreadsheet-compatible)
//! - JSON: machine-readable, with schema version
//! - YAML: human-readable

pub mod csv;
pub mod json;
pub mod yaml;

pub use self::csv::export_audit_csv;
pub use json::{export_audit_json, AuditExport, EXPORT_SCHEMA_VERSION};
pub use yaml::export_audit_yaml;
