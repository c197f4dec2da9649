//! Audit log CLI commands
//!
//! Read-only access to the audit log: list, show, and export. Records are
//! scoped to the acting user unless `--all` is given.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::{Subcommand, ValueEnum};

use crate::audit::AuditRecord;
use crate::display::audit::{format_audit_details, format_audit_list};
use crate::error::{BillTrackerError, BillTrackerResult};
use crate::export::{export_audit_csv, export_audit_json, export_audit_yaml};
use crate::models::{EntityKind, UserId};
use crate::services::require_actor;
use crate::storage::Storage;

/// Export file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
    Yaml,
}

/// Audit subcommands
#[derive(Subcommand)]
pub enum AuditCommands {
    /// List recent audit records
    List {
        /// Number of records to show
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
        /// Only records for this table (e.g., "Bill")
        #[arg(short, long)]
        table: Option<String>,
        /// Include records of every user
        #[arg(short, long)]
        all: bool,
    },
    /// Show one audit record with its before/after values
    Show {
        /// Audit record ID
        id: u64,
        /// Allow records of every user
        #[arg(short, long)]
        all: bool,
    },
    /// Export audit records
    Export {
        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: ExportFormat,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Include records of every user
        #[arg(short, long)]
        all: bool,
    },
}

/// Handle an audit command
pub fn handle_audit_command(
    storage: &Storage,
    actor: Option<UserId>,
    cmd: AuditCommands,
) -> BillTrackerResult<()> {
    match cmd {
        AuditCommands::List { limit, table, all } => {
            let mut records = visible_records(storage, actor, all)?;

            if let Some(table) = table {
                let kind = EntityKind::from_table_name(&table).ok_or_else(|| {
                    BillTrackerError::Validation(format!("Unknown table: '{}'", table))
                })?;
                records.retain(|r| r.table_name == kind.table_name());
            }

            let start = records.len().saturating_sub(limit);
            print!("{}", format_audit_list(&records[start..]));
        }

        AuditCommands::Show { id, all } => {
            let record = storage
                .audit_log()
                .get(id)?
                .filter(|r| all || r.user == actor)
                .ok_or_else(|| BillTrackerError::audit_record_not_found(id.to_string()))?;
            print!("{}", format_audit_details(&record));
        }

        AuditCommands::Export {
            format,
            output,
            all,
        } => {
            let records = visible_records(storage, actor, all)?;
            let count = records.len();

            match &output {
                Some(path) => {
                    let file = File::create(path).map_err(|e| {
                        BillTrackerError::Export(format!(
                            "Failed to create {}: {}",
                            path.display(),
                            e
                        ))
                    })?;
                    let mut writer = BufWriter::new(file);
                    write_export(format, records, &mut writer)?;
                    writer
                        .flush()
                        .map_err(|e| BillTrackerError::Export(e.to_string()))?;
                    println!("Exported {} audit records to {}", count, path.display());
                }
                None => {
                    let stdout = io::stdout();
                    let mut writer = stdout.lock();
                    write_export(format, records, &mut writer)?;
                }
            }
        }
    }

    Ok(())
}

fn visible_records(
    storage: &Storage,
    actor: Option<UserId>,
    all: bool,
) -> BillTrackerResult<Vec<AuditRecord>> {
    if all {
        storage.audit_log().read_all()
    } else {
        storage.audit_log().read_for_user(require_actor(actor)?)
    }
}

fn write_export<W: Write>(
    format: ExportFormat,
    records: Vec<AuditRecord>,
    writer: &mut W,
) -> BillTrackerResult<()> {
    match format {
        ExportFormat::Json => export_audit_json(records, writer),
        ExportFormat::Csv => export_audit_csv(&records, writer),
        ExportFormat::Yaml => export_audit_yaml(records, writer),
    }
}
