//! Bank account CLI commands
//!
//! Implements CLI commands for bank accounts and their balance snapshots.

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::account::{format_account_list, format_balance_list};
use crate::error::{BillTrackerError, BillTrackerResult};
use crate::models::{BankAccountId, StatusId, UserId};
use crate::services::{require_actor, BankAccountService};
use crate::storage::Storage;

use super::{parse_date, parse_money};

/// Account subcommands
#[derive(Subcommand)]
pub enum AccountCommands {
    /// Create a new bank account
    Add {
        /// Account name
        name: String,
        /// Text color used when listing the account
        #[arg(short, long, default_value = "default")]
        color: String,
        /// Online banking link
        #[arg(long)]
        url: Option<String>,
    },
    /// Rename an account
    Rename {
        /// Account name or ID
        account: String,
        /// New name
        new_name: String,
    },
    /// Record a balance snapshot, or list balances when no amount is given
    Balance {
        /// Account name or ID
        account: String,
        /// Balance amount (e.g., "2500.75")
        amount: Option<String>,
        /// Due date of the balance (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
        /// Status ID
        #[arg(short, long)]
        status: Option<i64>,
        /// Mark an existing balance snapshot (by ID) as settled instead
        #[arg(long, conflicts_with = "amount")]
        settle: Option<i64>,
    },
    /// Delete an account and its balance snapshots
    Delete {
        /// Account name or ID
        account: String,
    },
    /// List your accounts
    List,
}

/// Handle an account command
pub fn handle_account_command(
    storage: &Storage,
    settings: &Settings,
    actor: Option<UserId>,
    cmd: AccountCommands,
) -> BillTrackerResult<()> {
    let service = BankAccountService::new(storage);
    let owner = require_actor(actor)?;

    match cmd {
        AccountCommands::Add { name, color, url } => {
            let account = service.create(actor, &name, &color, url.as_deref())?;
            println!("Created account: {}", account.name);
            if let Some(id) = account.id {
                println!("  ID: {}", id);
            }
        }

        AccountCommands::Rename { account, new_name } => {
            let found = service.require(owner, &account)?;
            let renamed = service.rename(actor, account_id(found.id)?, &new_name)?;
            println!("Renamed account '{}' to '{}'", found.name, renamed.name);
        }

        AccountCommands::Balance {
            account,
            amount,
            date,
            status,
            settle,
        } => {
            let found = service.require(owner, &account)?;
            let id = account_id(found.id)?;

            if let Some(instance) = settle {
                let pay_date = parse_date(date.as_deref())?;
                let settled = service.settle_balance(actor, instance.into(), pay_date)?;
                println!(
                    "Settled balance {} of {} on {}",
                    instance,
                    found.name,
                    settled.pay_date.unwrap_or(pay_date)
                );
            } else if let Some(amount) = amount {
                let balance = parse_money(&amount)?;
                let due_date = parse_date(date.as_deref())?;
                let instance = service.record_balance(
                    actor,
                    id,
                    balance,
                    due_date,
                    status.map(StatusId::new),
                )?;
                println!(
                    "Recorded balance {} for {} (due {})",
                    instance.balance.format_with_symbol(&settings.currency_symbol),
                    found.name,
                    instance.due_date.format(&settings.date_format)
                );
            } else {
                let balances = service.balances(owner, id)?;
                print!(
                    "{}",
                    format_balance_list(&found, &balances, &settings.currency_symbol)
                );
            }
        }

        AccountCommands::Delete { account } => {
            let found = service.require(owner, &account)?;
            let deleted = service.delete(actor, account_id(found.id)?)?;
            println!("Deleted account: {}", deleted.name);
        }

        AccountCommands::List => {
            let accounts = service.list_for_user(owner)?;
            print!("{}", format_account_list(&accounts));
        }
    }

    Ok(())
}

fn account_id(id: Option<BankAccountId>) -> BillTrackerResult<BankAccountId> {
    id.ok_or_else(|| BillTrackerError::Storage("Stored account has no ID".into()))
}
