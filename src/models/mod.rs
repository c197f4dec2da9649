//! Core data models for BillTracker
//!
//! Users, bank accounts and their balance snapshots, bills and their due
//! occurrences, and the shared lookup tables (statuses, recurrences,
//! categories).

pub mod bank_account;
pub mod bill;
pub mod ids;
pub mod lookup;
pub mod money;
pub mod record;
pub mod user;

pub use bank_account::{BankAccount, BankAccountInstance};
pub use bill::{Bill, DueBill};
pub use ids::{
    BankAccountId, BankAccountInstanceId, BillId, CategoryId, DueBillId, RecordId, RecurrenceId,
    StatusId, UserId,
};
pub use lookup::{Category, Recurrence, Status};
pub use money::Money;
pub use record::{EntityKind, ModelValidationError, Record, AUDITED_KINDS};
pub use user::User;
