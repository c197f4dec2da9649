//! Bill models
//!
//! A `Bill` is a recurring obligation; each `DueBill` is one occurrence of it
//! with its own amount, due date, and payment state.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::bank_account::MAX_URL_LEN;
use super::ids::{
    BankAccountId, BillId, CategoryId, DueBillId, RecordId, RecurrenceId, StatusId, UserId,
};
use super::money::Money;
use super::record::{check_len, check_text, EntityKind, ModelValidationError, Record};
use crate::audit::Snapshot;

/// A recurring bill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    #[serde(default)]
    pub id: Option<BillId>,

    /// Owner
    pub user: UserId,

    pub name: String,

    /// Amount each occurrence defaults to
    pub default_amount_due: Money,

    /// Payment portal link
    #[serde(default)]
    pub url: String,

    /// Account the bill is drafted from
    #[serde(default)]
    pub draft_account: Option<BankAccountId>,

    #[serde(default)]
    pub category: Option<CategoryId>,

    #[serde(default)]
    pub recurrence: Option<RecurrenceId>,

    /// Sort priority (lower first)
    #[serde(default)]
    pub priority: i32,
}

impl Bill {
    pub fn new(user: UserId, name: impl Into<String>, default_amount_due: Money) -> Self {
        Self {
            id: None,
            user,
            name: name.into(),
            default_amount_due,
            url: String::new(),
            draft_account: None,
            category: None,
            recurrence: None,
            priority: 0,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        check_text("Bill name", &self.name, 100)?;
        check_len("URL", &self.url, MAX_URL_LEN)
    }
}

impl Record for Bill {
    const KIND: EntityKind = EntityKind::Bill;

    fn record_id(&self) -> Option<RecordId> {
        self.id.map(|id| id.get())
    }

    fn assign_id(&mut self, id: RecordId) {
        self.id = Some(BillId::new(id));
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::new()
            .field("id", self.id)
            .field("user", self.user)
            .field("name", &self.name)
            .field("default_amount_due", self.default_amount_due)
            .field("url", &self.url)
            .field("draft_account", self.draft_account)
            .field("category", self.category)
            .field("recurrence", self.recurrence)
            .field("priority", self.priority)
    }
}

impl fmt::Display for Bill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// One occurrence of a bill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueBill {
    #[serde(default)]
    pub id: Option<DueBillId>,

    pub bill: BillId,

    #[serde(default)]
    pub recurrence: Option<RecurrenceId>,

    pub amount_due: Money,

    #[serde(default)]
    pub draft_account: Option<BankAccountId>,

    pub due_date: NaiveDate,

    #[serde(default)]
    pub pay_date: Option<NaiveDate>,

    #[serde(default)]
    pub status: Option<StatusId>,

    #[serde(default)]
    pub priority: i32,
}

impl DueBill {
    /// Create an occurrence of a saved bill that inherits the bill's defaults
    pub fn for_bill(bill: &Bill, bill_id: BillId, due_date: NaiveDate) -> Self {
        Self {
            id: None,
            bill: bill_id,
            recurrence: bill.recurrence,
            amount_due: bill.default_amount_due,
            draft_account: bill.draft_account,
            due_date,
            pay_date: None,
            status: None,
            priority: bill.priority,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.pay_date.is_some()
    }
}

impl Record for DueBill {
    const KIND: EntityKind = EntityKind::DueBill;

    fn record_id(&self) -> Option<RecordId> {
        self.id.map(|id| id.get())
    }

    fn assign_id(&mut self, id: RecordId) {
        self.id = Some(DueBillId::new(id));
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::new()
            .field("id", self.id)
            .field("bill", self.bill)
            .field("recurrence", self.recurrence)
            .field("amount_due", self.amount_due)
            .field("draft_account", self.draft_account)
            .field("due_date", self.due_date)
            .field("pay_date", self.pay_date)
            .field("status", self.status)
            .field("priority", self.priority)
    }
}
