//! Service layer for BillTracker
//!
//! The service layer provides business logic on top of the storage layer,
//! handling validation, ownership, and cross-entity operations. Services take
//! the acting user explicitly; it is recorded on every audit record their
//! mutations produce.

pub mod bank_account;
pub mod bill;
pub mod lookup;
pub mod user;

pub use bank_account::BankAccountService;
pub use bill::{BillService, BillUpdate};
pub use lookup::LookupService;
pub use user::UserService;

use crate::error::{BillTrackerError, BillTrackerResult};
use crate::models::{StatusId, UserId};
use crate::storage::Storage;

/// The owner for an operation that creates or changes user data
pub(crate) fn require_actor(actor: Option<UserId>) -> BillTrackerResult<UserId> {
    actor.ok_or_else(|| {
        BillTrackerError::Validation("This operation requires an acting user".into())
    })
}

pub(crate) fn require_status(storage: &Storage, status: StatusId) -> BillTrackerResult<()> {
    if storage.statuses.exists(status.get())? {
        Ok(())
    } else {
        Err(BillTrackerError::NotFound {
            entity_type: "Status",
            identifier: status.to_string(),
        })
    }
}
