//! Lookup table CLI commands
//!
//! Statuses, recurrences, and categories. With no name, each subcommand
//! lists the table.

use clap::Subcommand;

use crate::error::BillTrackerResult;
use crate::models::UserId;
use crate::services::LookupService;
use crate::storage::Storage;

/// Lookup subcommands
#[derive(Subcommand)]
pub enum LookupCommands {
    /// Add or list statuses
    Status {
        /// Status name (e.g., "Paid")
        name: Option<String>,
        /// Highlight color
        #[arg(short, long, default_value = "default")]
        color: String,
    },
    /// Add or list recurrences
    Recurrence {
        /// Recurrence name (e.g., "Monthly")
        name: Option<String>,
        /// Calculation rule (e.g., "+1 month")
        #[arg(short = 'r', long)]
        calculation: Option<String>,
    },
    /// Add or list categories
    Category {
        /// Category name
        name: Option<String>,
    },
}

/// Handle a lookup command
pub fn handle_lookup_command(
    storage: &Storage,
    actor: Option<UserId>,
    cmd: LookupCommands,
) -> BillTrackerResult<()> {
    let service = LookupService::new(storage);

    match cmd {
        LookupCommands::Status { name: Some(name), color } => {
            let status = service.add_status(&name, &color, actor)?;
            println!("Added status: {}", status.name);
        }
        LookupCommands::Status { name: None, .. } => {
            for status in service.statuses()? {
                print_row(status.id.map(|id| id.get()), &status.name, &status.highlight_color);
            }
        }

        LookupCommands::Recurrence {
            name: Some(name),
            calculation,
        } => {
            let recurrence = service.add_recurrence(&name, calculation.as_deref(), actor)?;
            println!("Added recurrence: {}", recurrence.name);
        }
        LookupCommands::Recurrence { name: None, .. } => {
            for recurrence in service.recurrences()? {
                print_row(
                    recurrence.id.map(|id| id.get()),
                    &recurrence.name,
                    recurrence.calculation.as_deref().unwrap_or(""),
                );
            }
        }

        LookupCommands::Category { name: Some(name) } => {
            let category = service.add_category(&name, actor)?;
            println!("Added category: {}", category.name);
        }
        LookupCommands::Category { name: None } => {
            for category in service.categories()? {
                print_row(category.id.map(|id| id.get()), &category.name, "");
            }
        }
    }

    Ok(())
}

fn print_row(id: Option<i64>, name: &str, detail: &str) {
    let id = id.map(|id| id.to_string()).unwrap_or_default();
    println!("{:>4}  {:<20}  {}", id, name, detail);
}
