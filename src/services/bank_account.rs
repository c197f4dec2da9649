//! Bank account service
//!
//! Provides business logic for a user's bank accounts and the balance
//! snapshots recorded against them. Every operation is scoped to the acting
//! user: accounts owned by someone else behave as if they don't exist.

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{BillTrackerError, BillTrackerResult};
use crate::models::{
    BankAccount, BankAccountId, BankAccountInstance, BankAccountInstanceId, Money, StatusId,
    UserId,
};
use crate::storage::Storage;

use super::{require_actor, require_status};

/// Service for bank account management
pub struct BankAccountService<'a> {
    storage: &'a Storage,
}

impl<'a> BankAccountService<'a> {
    /// Create a new bank account service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a new account owned by the acting user
    pub fn create(
        &self,
        actor: Option<UserId>,
        name: &str,
        font_color: &str,
        url: Option<&str>,
    ) -> BillTrackerResult<BankAccount> {
        let owner = require_actor(actor)?;
        let name = name.trim();

        if self.find_by_name(owner, name)?.is_some() {
            return Err(BillTrackerError::Duplicate {
                entity_type: "BankAccount",
                identifier: name.to_string(),
            });
        }

        let mut account = BankAccount::new(owner, name, font_color.trim());
        if let Some(url) = url {
            account.url = url.trim().to_string();
        }
        account
            .validate()
            .map_err(|e| BillTrackerError::Validation(e.to_string()))?;

        self.storage.save(&mut account, actor)?;
        Ok(account)
    }

    /// Get an account owned by `owner`
    pub fn get(&self, owner: UserId, id: BankAccountId) -> BillTrackerResult<Option<BankAccount>> {
        Ok(self
            .storage
            .get::<BankAccount>(id.get())?
            .filter(|a| a.user == owner))
    }

    /// Find an account by name (case-insensitive) or ID string
    pub fn find(&self, owner: UserId, identifier: &str) -> BillTrackerResult<Option<BankAccount>> {
        if let Some(account) = self.find_by_name(owner, identifier)? {
            return Ok(Some(account));
        }

        if let Ok(id) = identifier.parse::<BankAccountId>() {
            return self.get(owner, id);
        }

        Ok(None)
    }

    /// Find an account by identifier, failing if there is none
    pub fn require(&self, owner: UserId, identifier: &str) -> BillTrackerResult<BankAccount> {
        self.find(owner, identifier)?
            .ok_or_else(|| BillTrackerError::account_not_found(identifier))
    }

    /// All accounts of a user, by name
    pub fn list_for_user(&self, owner: UserId) -> BillTrackerResult<Vec<BankAccount>> {
        let mut accounts = self.storage.bank_accounts.find_by(|a| a.user == owner)?;
        accounts.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(accounts)
    }

    /// Rename an account
    pub fn rename(
        &self,
        actor: Option<UserId>,
        id: BankAccountId,
        new_name: &str,
    ) -> BillTrackerResult<BankAccount> {
        let owner = require_actor(actor)?;
        let mut account = self
            .get(owner, id)?
            .ok_or_else(|| BillTrackerError::account_not_found(id.to_string()))?;

        let new_name = new_name.trim();
        if let Some(existing) = self.find_by_name(owner, new_name)? {
            if existing.id != account.id {
                return Err(BillTrackerError::Duplicate {
                    entity_type: "BankAccount",
                    identifier: new_name.to_string(),
                });
            }
        }

        account.name = new_name.to_string();
        account
            .validate()
            .map_err(|e| BillTrackerError::Validation(e.to_string()))?;

        self.storage.save(&mut account, actor)?;
        Ok(account)
    }

    /// Record a balance snapshot for an account
    pub fn record_balance(
        &self,
        actor: Option<UserId>,
        account_id: BankAccountId,
        balance: Money,
        due_date: NaiveDate,
        status: Option<StatusId>,
    ) -> BillTrackerResult<BankAccountInstance> {
        let owner = require_actor(actor)?;
        if self.get(owner, account_id)?.is_none() {
            return Err(BillTrackerError::account_not_found(account_id.to_string()));
        }
        if let Some(status) = status {
            require_status(self.storage, status)?;
        }

        let mut instance = BankAccountInstance::new(account_id, balance, due_date);
        instance.status = status;

        self.storage.save(&mut instance, actor)?;
        Ok(instance)
    }

    /// Mark a balance snapshot as settled on `pay_date`
    pub fn settle_balance(
        &self,
        actor: Option<UserId>,
        instance_id: BankAccountInstanceId,
        pay_date: NaiveDate,
    ) -> BillTrackerResult<BankAccountInstance> {
        let owner = require_actor(actor)?;
        let not_found = || BillTrackerError::NotFound {
            entity_type: "BankAccountInstance",
            identifier: instance_id.to_string(),
        };
        let mut instance = self
            .storage
            .get::<BankAccountInstance>(instance_id.get())?
            .ok_or_else(not_found)?;
        if self.get(owner, instance.bank_account)?.is_none() {
            return Err(not_found());
        }

        instance.pay_date = Some(pay_date);
        self.storage.save(&mut instance, actor)?;
        Ok(instance)
    }

    /// Balance snapshots of an account, most recent due date first
    pub fn balances(
        &self,
        owner: UserId,
        account_id: BankAccountId,
    ) -> BillTrackerResult<Vec<BankAccountInstance>> {
        if self.get(owner, account_id)?.is_none() {
            return Err(BillTrackerError::account_not_found(account_id.to_string()));
        }

        let mut instances = self
            .storage
            .bank_account_instances
            .find_by(|i| i.bank_account == account_id)?;
        instances.sort_by(|a, b| b.due_date.cmp(&a.due_date));
        Ok(instances)
    }

    /// Delete an account
    ///
    /// Its balance snapshots are deleted one by one, each audited. Bills and
    /// due bills drafted from the account keep existing with the draft
    /// account cleared (a bulk update, not audited).
    pub fn delete(
        &self,
        actor: Option<UserId>,
        id: BankAccountId,
    ) -> BillTrackerResult<BankAccount> {
        let owner = require_actor(actor)?;
        if self.get(owner, id)?.is_none() {
            return Err(BillTrackerError::account_not_found(id.to_string()));
        }

        let instances = self
            .storage
            .bank_account_instances
            .find_by(|i| i.bank_account == id)?;
        for instance in &instances {
            if let Some(instance_id) = instance.id {
                self.storage
                    .delete::<BankAccountInstance>(instance_id.get(), actor)?;
            }
        }

        let cleared_bills = self.storage.bills.update_where(
            |b| b.draft_account == Some(id),
            |b| b.draft_account = None,
        )?;
        let cleared_due = self.storage.due_bills.update_where(
            |d| d.draft_account == Some(id),
            |d| d.draft_account = None,
        )?;
        if cleared_bills > 0 {
            self.storage.bills.save()?;
        }
        if cleared_due > 0 {
            self.storage.due_bills.save()?;
        }

        debug!(
            account = id.get(),
            instances = instances.len(),
            cleared_bills,
            cleared_due,
            "Cascaded account delete"
        );

        let (account, _) = self.storage.delete::<BankAccount>(id.get(), actor)?;
        Ok(account)
    }

    fn find_by_name(&self, owner: UserId, name: &str) -> BillTrackerResult<Option<BankAccount>> {
        let name_lower = name.to_lowercase();
        Ok(self
            .storage
            .bank_accounts
            .find_by(|a| a.user == owner && a.name.to_lowercase() == name_lower)?
            .into_iter()
            .next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditAction;
    use crate::models::{Bill, Record};
    use crate::services::tests::create_test_storage;
    use serde_json::json;

    const ALICE: Option<UserId> = Some(UserId::new(1));
    const BOB: Option<UserId> = Some(UserId::new(2));

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_create_account() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BankAccountService::new(&storage);

        let account = service
            .create(ALICE, "Checking", "green", Some("https://bank.example"))
            .unwrap();

        assert_eq!(account.user, UserId::new(1));
        assert_eq!(account.url, "https://bank.example");
        assert_eq!(service.list_for_user(UserId::new(1)).unwrap().len(), 1);

        let record = storage.audit_log().get(1).unwrap().unwrap();
        assert_eq!(record.table_name, "BankAccount");
        assert_eq!(record.user, ALICE);
    }

    #[test]
    fn test_create_requires_actor() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BankAccountService::new(&storage);

        assert!(service
            .create(None, "Checking", "green", None)
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn test_create_rejects_long_url() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BankAccountService::new(&storage);
        let url = "x".repeat(2084);

        assert!(service
            .create(ALICE, "Checking", "green", Some(&url))
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn test_accounts_are_scoped_to_owner() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BankAccountService::new(&storage);

        let account = service.create(ALICE, "Checking", "green", None).unwrap();
        service.create(BOB, "Checking", "blue", None).unwrap();

        assert!(service
            .get(UserId::new(2), account.id.unwrap())
            .unwrap()
            .is_none());
        assert!(service
            .rename(BOB, account.id.unwrap(), "Mine")
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_rename_records_update() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BankAccountService::new(&storage);
        let account = service.create(ALICE, "Checking", "green", None).unwrap();

        service.rename(ALICE, account.id.unwrap(), "Main").unwrap();

        let record = storage.audit_log().get(2).unwrap().unwrap();
        assert_eq!(record.action, AuditAction::Update);
        assert_eq!(record.before_values.unwrap()["name"], json!("Checking"));
        assert_eq!(record.after_values.unwrap()["name"], json!("Main"));
    }

    #[test]
    fn test_record_and_settle_balance() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BankAccountService::new(&storage);
        let account = service.create(ALICE, "Checking", "green", None).unwrap();
        let account_id = account.id.unwrap();

        let instance = service
            .record_balance(
                ALICE,
                account_id,
                Money::parse("2500.75").unwrap(),
                date(2025, 1, 31),
                None,
            )
            .unwrap();
        let settled = service
            .settle_balance(ALICE, instance.id.unwrap(), date(2025, 2, 1))
            .unwrap();
        assert_eq!(settled.pay_date, Some(date(2025, 2, 1)));

        let record = storage.audit_log().get(3).unwrap().unwrap();
        assert_eq!(record.table_name, "BankAccountInstance");
        assert_eq!(record.before_values.unwrap()["pay_date"], json!(null));
        let after = record.after_values.unwrap();
        assert_eq!(after["pay_date"], json!("2025-02-01"));
        assert_eq!(after["balance"], json!(2500.75));
    }

    #[test]
    fn test_settle_surfaces_storage_errors() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BankAccountService::new(&storage);
        let account = service.create(ALICE, "Checking", "green", None).unwrap();
        let balance = Money::from_cents(100);
        let instance = service
            .record_balance(ALICE, account.id.unwrap(), balance, date(2025, 1, 31), None)
            .unwrap();

        storage.bank_accounts.poison();
        let err = service
            .settle_balance(ALICE, instance.id.unwrap(), date(2025, 2, 1))
            .unwrap_err();

        assert!(matches!(err, BillTrackerError::Storage(_)));
    }

    #[test]
    fn test_record_balance_unknown_status() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BankAccountService::new(&storage);
        let account = service.create(ALICE, "Checking", "green", None).unwrap();

        let err = service
            .record_balance(
                ALICE,
                account.id.unwrap(),
                Money::zero(),
                date(2025, 1, 1),
                Some(StatusId::new(9)),
            )
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_delete_cascades_and_clears_draft_account() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BankAccountService::new(&storage);
        let account = service.create(ALICE, "Checking", "green", None).unwrap();
        let account_id = account.id.unwrap();

        for day in [1, 15] {
            service
                .record_balance(ALICE, account_id, Money::from_cents(100), date(2025, 1, day), None)
                .unwrap();
        }

        let mut bill = Bill::new(UserId::new(1), "Rent", Money::from_cents(100));
        bill.draft_account = Some(account_id);
        storage.save(&mut bill, ALICE).unwrap();

        service.delete(ALICE, account_id).unwrap();

        assert_eq!(storage.bank_account_instances.count().unwrap(), 0);
        assert_eq!(
            storage.get::<Bill>(bill.record_id().unwrap()).unwrap().unwrap().draft_account,
            None
        );

        let deletes: Vec<_> = storage
            .audit_log()
            .read_all()
            .unwrap()
            .into_iter()
            .filter(|r| r.action == AuditAction::Delete)
            .map(|r| r.table_name)
            .collect();
        assert_eq!(
            deletes,
            vec!["BankAccountInstance", "BankAccountInstance", "BankAccount"]
        );
    }

    #[test]
    fn test_balances_newest_first() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BankAccountService::new(&storage);
        let account_id = service
            .create(ALICE, "Checking", "green", None)
            .unwrap()
            .id
            .unwrap();

        for day in [3, 20, 10] {
            service
                .record_balance(ALICE, account_id, Money::zero(), date(2025, 3, day), None)
                .unwrap();
        }

        let days: Vec<_> = service
            .balances(UserId::new(1), account_id)
            .unwrap()
            .iter()
            .map(|i| i.due_date)
            .collect();
        assert_eq!(days, vec![date(2025, 3, 20), date(2025, 3, 10), date(2025, 3, 3)]);
    }
}
