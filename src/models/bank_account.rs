//! Bank account model
//!
//! A user's bank account and the balance snapshots recorded against it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{BankAccountId, BankAccountInstanceId, RecordId, StatusId, UserId};
use super::money::Money;
use super::record::{check_len, check_text, EntityKind, ModelValidationError, Record};
use crate::audit::Snapshot;

/// Maximum URL length accepted for accounts and bills
pub const MAX_URL_LEN: usize = 2083;

/// A user's bank account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankAccount {
    #[serde(default)]
    pub id: Option<BankAccountId>,

    /// Owner
    pub user: UserId,

    /// Account name (e.g. "Chase Checking")
    pub name: String,

    /// Text color used when listing this account
    pub font_color: String,

    /// Online banking link
    #[serde(default)]
    pub url: String,
}

impl BankAccount {
    pub fn new(user: UserId, name: impl Into<String>, font_color: impl Into<String>) -> Self {
        Self {
            id: None,
            user,
            name: name.into(),
            font_color: font_color.into(),
            url: String::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        check_text("Account name", &self.name, 100)?;
        check_len("Font color", &self.font_color, 20)?;
        check_len("URL", &self.url, MAX_URL_LEN)
    }
}

impl Record for BankAccount {
    const KIND: EntityKind = EntityKind::BankAccount;

    fn record_id(&self) -> Option<RecordId> {
        self.id.map(|id| id.get())
    }

    fn assign_id(&mut self, id: RecordId) {
        self.id = Some(BankAccountId::new(id));
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::new()
            .field("id", self.id)
            .field("user", self.user)
            .field("name", &self.name)
            .field("font_color", &self.font_color)
            .field("url", &self.url)
    }
}

impl fmt::Display for BankAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// The balance of a bank account at a specific time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankAccountInstance {
    #[serde(default)]
    pub id: Option<BankAccountInstanceId>,

    pub bank_account: BankAccountId,

    pub balance: Money,

    pub due_date: NaiveDate,

    #[serde(default)]
    pub pay_date: Option<NaiveDate>,

    #[serde(default)]
    pub status: Option<StatusId>,
}

impl BankAccountInstance {
    pub fn new(bank_account: BankAccountId, balance: Money, due_date: NaiveDate) -> Self {
        Self {
            id: None,
            bank_account,
            balance,
            due_date,
            pay_date: None,
            status: None,
        }
    }
}

impl Record for BankAccountInstance {
    const KIND: EntityKind = EntityKind::BankAccountInstance;

    fn record_id(&self) -> Option<RecordId> {
        self.id.map(|id| id.get())
    }

    fn assign_id(&mut self, id: RecordId) {
        self.id = Some(BankAccountInstanceId::new(id));
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::new()
            .field("id", self.id)
            .field("bank_account", self.bank_account)
            .field("balance", self.balance)
            .field("due_date", self.due_date)
            .field("pay_date", self.pay_date)
            .field("status", self.status)
    }
}
