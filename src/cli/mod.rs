//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod account;
pub mod audit;
pub mod bill;
pub mod lookup;
pub mod user;

pub use account::{handle_account_command, AccountCommands};
pub use audit::{handle_audit_command, AuditCommands, ExportFormat};
pub use bill::{handle_bill_command, BillCommands};
pub use lookup::{handle_lookup_command, LookupCommands};
pub use user::{handle_user_command, UserCommands};

use chrono::NaiveDate;

use crate::error::{BillTrackerError, BillTrackerResult};
use crate::models::Money;

/// Parse a `YYYY-MM-DD` argument, defaulting to today
pub(crate) fn parse_date(value: Option<&str>) -> BillTrackerResult<NaiveDate> {
    match value {
        None => Ok(chrono::Local::now().date_naive()),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            BillTrackerError::Validation(format!(
                "Invalid date: '{}'. Use format YYYY-MM-DD",
                s
            ))
        }),
    }
}

pub(crate) fn parse_money(value: &str) -> BillTrackerResult<Money> {
    Money::parse(value).map_err(|e| {
        BillTrackerError::Validation(format!(
            "Invalid amount: '{}'. Use format like '1200.00' or '1200'. Error: {}",
            value, e
        ))
    })
}
