//! Display formatting for terminal output
//!
//! Provides utilities for formatting data models and audit records as
//! plain-text tables and detail views.

pub mod account;
pub mod audit;
pub mod bill;

pub use account::{format_account_list, format_balance_list};
pub use audit::{format_audit_details, format_audit_list};
pub use bill::{format_bill_list, format_due_bill_list};
