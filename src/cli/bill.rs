//! Bill CLI commands
//!
//! Implements CLI commands for bills and their due occurrences.

use clap::{Args, Subcommand};

use crate::config::settings::Settings;
use crate::display::bill::{format_bill_list, format_due_bill_list};
use crate::error::{BillTrackerError, BillTrackerResult};
use crate::models::{BillId, CategoryId, DueBillId, RecurrenceId, StatusId, UserId};
use crate::services::{require_actor, BankAccountService, BillService, BillUpdate};
use crate::storage::Storage;

use super::{parse_date, parse_money};

/// Optional bill fields shared by `add` and `update`
#[derive(Args)]
pub struct BillFields {
    /// Sort priority (lower first)
    #[arg(short, long)]
    priority: Option<i32>,
    /// Payment portal link
    #[arg(long)]
    url: Option<String>,
    /// Account the bill is drafted from (name or ID)
    #[arg(long)]
    draft_account: Option<String>,
    /// Category ID
    #[arg(long)]
    category: Option<i64>,
    /// Recurrence ID
    #[arg(long)]
    recurrence: Option<i64>,
}

/// Bill subcommands
#[derive(Subcommand)]
pub enum BillCommands {
    /// Create a new bill
    Add {
        /// Bill name
        name: String,
        /// Default amount due (e.g., "1200.00")
        amount: String,
        #[command(flatten)]
        fields: BillFields,
    },
    /// Change a bill
    Update {
        /// Bill name or ID
        bill: String,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New default amount due
        #[arg(short, long)]
        amount: Option<String>,
        #[command(flatten)]
        fields: BillFields,
    },
    /// Delete a bill and its due bills
    Delete {
        /// Bill name or ID
        bill: String,
    },
    /// List your bills
    List,
    /// Schedule a due bill, or list due bills when no bill is given
    Due {
        /// Bill name or ID
        bill: Option<String>,
        /// Due date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
        /// Amount due, if different from the bill's default
        #[arg(short, long)]
        amount: Option<String>,
        /// Only list unpaid due bills
        #[arg(long)]
        unpaid: bool,
        /// List instead of scheduling, even when a bill is given
        #[arg(short, long)]
        list: bool,
    },
    /// Mark a due bill as paid
    Pay {
        /// Due bill ID
        due_bill: i64,
        /// Payment date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
        /// Status ID to set
        #[arg(short, long)]
        status: Option<i64>,
    },
}

/// Handle a bill command
pub fn handle_bill_command(
    storage: &Storage,
    settings: &Settings,
    actor: Option<UserId>,
    cmd: BillCommands,
) -> BillTrackerResult<()> {
    let service = BillService::new(storage);
    let owner = require_actor(actor)?;
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        BillCommands::Add {
            name,
            amount,
            fields,
        } => {
            let amount = parse_money(&amount)?;
            let details = fields.into_update(storage, owner)?;
            let bill = service.create(actor, &name, amount, details)?;

            println!("Created bill: {}", bill.name);
            println!(
                "  Amount: {}",
                bill.default_amount_due.format_with_symbol(symbol)
            );
            if let Some(id) = bill.id {
                println!("  ID: {}", id);
            }
        }

        BillCommands::Update {
            bill,
            name,
            amount,
            fields,
        } => {
            let found = service.require(owner, &bill)?;
            let mut changes = fields.into_update(storage, owner)?;
            changes.name = name;
            changes.default_amount_due = amount.as_deref().map(parse_money).transpose()?;

            let updated = service.update(actor, bill_id(found.id)?, changes)?;
            println!("Updated bill: {}", updated.name);
        }

        BillCommands::Delete { bill } => {
            let found = service.require(owner, &bill)?;
            let deleted = service.delete(actor, bill_id(found.id)?)?;
            println!("Deleted bill: {}", deleted.name);
        }

        BillCommands::List => {
            let bills = service.list_for_user(owner)?;
            print!("{}", format_bill_list(&bills, symbol));
        }

        BillCommands::Due {
            bill,
            date,
            amount,
            unpaid,
            list,
        } => {
            let found = bill.map(|b| service.require(owner, &b)).transpose()?;

            match found {
                Some(found) if !list => {
                    let due_date = parse_date(date.as_deref())?;
                    let amount = amount.as_deref().map(parse_money).transpose()?;
                    let due = service.schedule(actor, bill_id(found.id)?, due_date, amount)?;
                    println!(
                        "Scheduled {} for {}: {}",
                        found.name,
                        due.due_date.format(&settings.date_format),
                        due.amount_due.format_with_symbol(symbol)
                    );
                }
                found => {
                    let bills = service.list_for_user(owner)?;
                    let due = service.due_bills(owner, found.and_then(|b| b.id), unpaid)?;
                    print!("{}", format_due_bill_list(&due, &bills, symbol));
                }
            }
        }

        BillCommands::Pay {
            due_bill,
            date,
            status,
        } => {
            let pay_date = parse_date(date.as_deref())?;
            let paid = service.mark_paid(
                actor,
                DueBillId::new(due_bill),
                pay_date,
                status.map(StatusId::new),
            )?;
            println!(
                "Marked due bill {} paid on {}",
                due_bill,
                paid.pay_date
                    .unwrap_or(pay_date)
                    .format(&settings.date_format)
            );
        }
    }

    Ok(())
}

impl BillFields {
    fn into_update(self, storage: &Storage, owner: UserId) -> BillTrackerResult<BillUpdate> {
        let draft_account = match self.draft_account {
            Some(account) => {
                let found = BankAccountService::new(storage).require(owner, &account)?;
                Some(found.id.ok_or_else(|| {
                    BillTrackerError::Storage("Stored account has no ID".into())
                })?)
            }
            None => None,
        };

        Ok(BillUpdate {
            priority: self.priority,
            url: self.url,
            draft_account,
            category: self.category.map(CategoryId::new),
            recurrence: self.recurrence.map(RecurrenceId::new),
            ..Default::default()
        })
    }
}

fn bill_id(id: Option<BillId>) -> BillTrackerResult<BillId> {
    id.ok_or_else(|| BillTrackerError::Storage("Stored bill has no ID".into()))
}
