//! Bill service
//!
//! Provides business logic for bills and their due occurrences: creation,
//! updates, scheduling, payment, and deletion. Bills belong to the acting
//! user; due bills are reached through their bill.

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{BillTrackerError, BillTrackerResult};
use crate::models::{
    BankAccount, BankAccountId, Bill, BillId, CategoryId, DueBill, DueBillId, Money, RecurrenceId,
    StatusId, UserId,
};
use crate::storage::Storage;

use super::{require_actor, require_status};

/// Fields to change on an existing bill; `None` leaves a field as is
#[derive(Debug, Clone, Default)]
pub struct BillUpdate {
    pub name: Option<String>,
    pub default_amount_due: Option<Money>,
    pub priority: Option<i32>,
    pub url: Option<String>,
    pub draft_account: Option<BankAccountId>,
    pub category: Option<CategoryId>,
    pub recurrence: Option<RecurrenceId>,
}

impl BillUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.default_amount_due.is_none()
            && self.priority.is_none()
            && self.url.is_none()
            && self.draft_account.is_none()
            && self.category.is_none()
            && self.recurrence.is_none()
    }
}

/// Service for bill management
pub struct BillService<'a> {
    storage: &'a Storage,
}

impl<'a> BillService<'a> {
    /// Create a new bill service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a bill owned by the acting user
    ///
    /// Optional fields are taken from `details`; its `name` and
    /// `default_amount_due` are ignored.
    pub fn create(
        &self,
        actor: Option<UserId>,
        name: &str,
        default_amount_due: Money,
        details: BillUpdate,
    ) -> BillTrackerResult<Bill> {
        let owner = require_actor(actor)?;
        let mut bill = Bill::new(owner, name.trim(), default_amount_due);
        self.apply(owner, &mut bill, details)?;

        self.storage.save(&mut bill, actor)?;
        Ok(bill)
    }

    /// Get a bill owned by `owner`
    pub fn get(&self, owner: UserId, id: BillId) -> BillTrackerResult<Option<Bill>> {
        Ok(self
            .storage
            .get::<Bill>(id.get())?
            .filter(|b| b.user == owner))
    }

    /// Find a bill by name (case-insensitive) or ID string
    pub fn find(&self, owner: UserId, identifier: &str) -> BillTrackerResult<Option<Bill>> {
        let name_lower = identifier.to_lowercase();
        let by_name = self
            .storage
            .bills
            .find_by(|b| b.user == owner && b.name.to_lowercase() == name_lower)?;
        if let Some(bill) = by_name.into_iter().next() {
            return Ok(Some(bill));
        }

        if let Ok(id) = identifier.parse::<BillId>() {
            return self.get(owner, id);
        }

        Ok(None)
    }

    /// Find a bill by identifier, failing if there is none
    pub fn require(&self, owner: UserId, identifier: &str) -> BillTrackerResult<Bill> {
        self.find(owner, identifier)?
            .ok_or_else(|| BillTrackerError::bill_not_found(identifier))
    }

    /// A user's bills by priority, then name
    pub fn list_for_user(&self, owner: UserId) -> BillTrackerResult<Vec<Bill>> {
        let mut bills = self.storage.bills.find_by(|b| b.user == owner)?;
        bills.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
        Ok(bills)
    }

    /// Change fields of a bill
    pub fn update(
        &self,
        actor: Option<UserId>,
        id: BillId,
        changes: BillUpdate,
    ) -> BillTrackerResult<Bill> {
        let owner = require_actor(actor)?;
        if changes.is_empty() {
            return Err(BillTrackerError::Validation(
                "No changes given for bill".into(),
            ));
        }

        let mut bill = self
            .get(owner, id)?
            .ok_or_else(|| BillTrackerError::bill_not_found(id.to_string()))?;
        self.apply(owner, &mut bill, changes)?;

        self.storage.save(&mut bill, actor)?;
        Ok(bill)
    }

    /// Schedule an occurrence of a bill
    ///
    /// The due bill inherits the bill's amount, draft account, recurrence, and
    /// priority unless `amount_due` overrides the amount.
    pub fn schedule(
        &self,
        actor: Option<UserId>,
        bill_id: BillId,
        due_date: NaiveDate,
        amount_due: Option<Money>,
    ) -> BillTrackerResult<DueBill> {
        let owner = require_actor(actor)?;
        let bill = self
            .get(owner, bill_id)?
            .ok_or_else(|| BillTrackerError::bill_not_found(bill_id.to_string()))?;

        let mut due = DueBill::for_bill(&bill, bill_id, due_date);
        if let Some(amount) = amount_due {
            due.amount_due = amount;
        }

        self.storage.save(&mut due, actor)?;
        Ok(due)
    }

    /// Mark an occurrence as paid
    pub fn mark_paid(
        &self,
        actor: Option<UserId>,
        due_bill_id: DueBillId,
        pay_date: NaiveDate,
        status: Option<StatusId>,
    ) -> BillTrackerResult<DueBill> {
        let owner = require_actor(actor)?;
        let mut due = self.owned_due_bill(owner, due_bill_id)?;

        if due.is_paid() {
            return Err(BillTrackerError::Validation(format!(
                "Due bill {} is already paid",
                due_bill_id
            )));
        }
        if let Some(status) = status {
            require_status(self.storage, status)?;
            due.status = Some(status);
        }
        due.pay_date = Some(pay_date);

        self.storage.save(&mut due, actor)?;
        Ok(due)
    }

    /// Due bills of a user, optionally for one bill, by due date
    pub fn due_bills(
        &self,
        owner: UserId,
        bill_id: Option<BillId>,
        unpaid_only: bool,
    ) -> BillTrackerResult<Vec<DueBill>> {
        let owned: Vec<BillId> = self
            .list_for_user(owner)?
            .into_iter()
            .filter_map(|b| b.id)
            .filter(|id| bill_id.map_or(true, |wanted| wanted == *id))
            .collect();

        let mut due = self
            .storage
            .due_bills
            .find_by(|d| owned.contains(&d.bill) && !(unpaid_only && d.is_paid()))?;
        due.sort_by(|a, b| a.due_date.cmp(&b.due_date).then(a.priority.cmp(&b.priority)));
        Ok(due)
    }

    /// Delete a bill and, one by one, each of its due bills
    pub fn delete(&self, actor: Option<UserId>, id: BillId) -> BillTrackerResult<Bill> {
        let owner = require_actor(actor)?;
        if self.get(owner, id)?.is_none() {
            return Err(BillTrackerError::bill_not_found(id.to_string()));
        }

        let due = self.storage.due_bills.find_by(|d| d.bill == id)?;
        for occurrence in &due {
            if let Some(due_id) = occurrence.id {
                self.storage.delete::<DueBill>(due_id.get(), actor)?;
            }
        }
        debug!(bill = id.get(), due_bills = due.len(), "Cascaded bill delete");

        let (bill, _) = self.storage.delete::<Bill>(id.get(), actor)?;
        Ok(bill)
    }

    fn owned_due_bill(&self, owner: UserId, id: DueBillId) -> BillTrackerResult<DueBill> {
        let not_found = || BillTrackerError::due_bill_not_found(id.to_string());
        let due = self.storage.get::<DueBill>(id.get())?.ok_or_else(not_found)?;
        if self.get(owner, due.bill)?.is_none() {
            return Err(not_found());
        }
        Ok(due)
    }

    fn apply(&self, owner: UserId, bill: &mut Bill, changes: BillUpdate) -> BillTrackerResult<()> {
        if let Some(name) = changes.name {
            bill.name = name.trim().to_string();
        }
        if let Some(amount) = changes.default_amount_due {
            bill.default_amount_due = amount;
        }
        if let Some(priority) = changes.priority {
            bill.priority = priority;
        }
        if let Some(url) = changes.url {
            bill.url = url.trim().to_string();
        }
        if let Some(account) = changes.draft_account {
            let owned = self
                .storage
                .get::<BankAccount>(account.get())?
                .is_some_and(|a| a.user == owner);
            if !owned {
                return Err(BillTrackerError::account_not_found(account.to_string()));
            }
            bill.draft_account = Some(account);
        }
        if let Some(category) = changes.category {
            if !self.storage.categories.exists(category.get())? {
                return Err(BillTrackerError::NotFound {
                    entity_type: "Category",
                    identifier: category.to_string(),
                });
            }
            bill.category = Some(category);
        }
        if let Some(recurrence) = changes.recurrence {
            if !self.storage.recurrences.exists(recurrence.get())? {
                return Err(BillTrackerError::NotFound {
                    entity_type: "Recurrence",
                    identifier: recurrence.to_string(),
                });
            }
            bill.recurrence = Some(recurrence);
        }

        bill.validate()
            .map_err(|e| BillTrackerError::Validation(e.to_string()))
    }
}
