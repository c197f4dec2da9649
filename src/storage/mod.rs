//! Storage layer for BillTracker
//!
//! Provides JSON file storage with atomic writes and automatic directory
//! creation. Every single-record save and delete goes through [`Storage`],
//! which runs the audit hooks around the mutation:
//!
//! ```text
//! before hook ──► write table + persist ──► after hook (append audit record)
//! ```
//!
//! The entity is persisted before its audit record is appended. If the append
//! fails the change stays and the error is returned to the caller. Bulk
//! operations on a [`Repository`] bypass the hooks and are not audited.

pub mod file_io;
pub mod repository;

pub use file_io::{read_json, write_json_atomic};
pub use repository::Repository;

use tracing::{debug, warn};

use crate::audit::{AuditLog, AuditRecord, ChangeInterceptor, Snapshot, SnapshotSource};
use crate::config::paths::BillTrackerPaths;
use crate::error::{BillTrackerError, BillTrackerResult};
use crate::models::{
    BankAccount, BankAccountInstance, Bill, Category, DueBill, EntityKind, Record, RecordId,
    Recurrence, Status, User, UserId,
};

/// Access to the repository holding records of type `T`
pub trait HasTable<T: Record> {
    fn table(&self) -> &Repository<T>;
}

macro_rules! impl_has_table {
    ($($model:ty => $field:ident),+ $(,)?) => {
        $(
            impl HasTable<$model> for Storage {
                fn table(&self) -> &Repository<$model> {
                    &self.$field
                }
            }
        )+
    };
}

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: BillTrackerPaths,
    pub users: Repository<User>,
    pub statuses: Repository<Status>,
    pub recurrences: Repository<Recurrence>,
    pub categories: Repository<Category>,
    pub bank_accounts: Repository<BankAccount>,
    pub bank_account_instances: Repository<BankAccountInstance>,
    pub bills: Repository<Bill>,
    pub due_bills: Repository<DueBill>,
    interceptor: ChangeInterceptor<AuditLog>,
}

impl_has_table!(
    User => users,
    Status => statuses,
    Recurrence => recurrences,
    Category => categories,
    BankAccount => bank_accounts,
    BankAccountInstance => bank_account_instances,
    Bill => bills,
    DueBill => due_bills,
);

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: BillTrackerPaths) -> BillTrackerResult<Self> {
        paths.ensure_directories()?;

        Ok(Self {
            users: Repository::open(&paths),
            statuses: Repository::open(&paths),
            recurrences: Repository::open(&paths),
            categories: Repository::open(&paths),
            bank_accounts: Repository::open(&paths),
            bank_account_instances: Repository::open(&paths),
            bills: Repository::open(&paths),
            due_bills: Repository::open(&paths),
            interceptor: ChangeInterceptor::new(AuditLog::new(paths.audit_log())),
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &BillTrackerPaths {
        &self.paths
    }

    /// The audit log every audited mutation is appended to
    pub fn audit_log(&self) -> &AuditLog {
        self.interceptor.sink()
    }

    /// Snapshots captured but not yet redeemed by an "after" hook
    pub fn pending_snapshots(&self) -> usize {
        self.interceptor.pending_snapshots()
    }

    /// Load all data from disk
    pub fn load_all(&self) -> BillTrackerResult<()> {
        self.users.load()?;
        self.statuses.load()?;
        self.recurrences.load()?;
        self.categories.load()?;
        self.bank_accounts.load()?;
        self.bank_account_instances.load()?;
        self.bills.load()?;
        self.due_bills.load()?;
        Ok(())
    }

    /// Get a record by id
    pub fn get<T: Record>(&self, id: RecordId) -> BillTrackerResult<Option<T>>
    where
        Self: HasTable<T>,
    {
        HasTable::<T>::table(self).get(id)
    }

    /// All records of a kind, in id order
    pub fn list<T: Record>(&self) -> BillTrackerResult<Vec<T>>
    where
        Self: HasTable<T>,
    {
        HasTable::<T>::table(self).all()
    }

    /// Create or update a single record and persist its table
    ///
    /// Assigns an id to a new record. Returns the audit record written for the
    /// change, or `None` for kinds that are not audited.
    pub fn save<T: Record>(
        &self,
        entity: &mut T,
        actor: Option<UserId>,
    ) -> BillTrackerResult<Option<AuditRecord>>
    where
        Self: HasTable<T>,
    {
        let token = self.interceptor.before_save(&*entity, self);
        let original = entity.clone();

        let table = HasTable::<T>::table(self);
        let replaced = match table.upsert(entity) {
            Ok(replaced) => replaced,
            Err(e) => {
                self.interceptor.discard(token);
                *entity = original;
                return Err(e);
            }
        };
        let created = replaced.is_none();

        if let Err(e) = table.save() {
            self.interceptor.discard(token);
            if let Some(id) = entity.record_id() {
                roll_back(table, id, replaced);
            }
            *entity = original;
            return Err(e);
        }

        debug!(
            kind = T::KIND.table_name(),
            id = ?entity.record_id(),
            created,
            "Saved record"
        );
        self.interceptor.after_save(&*entity, created, token, actor)
    }

    /// Delete a single record by id and persist its table
    ///
    /// Returns the removed record and, for audited kinds, its audit record.
    pub fn delete<T: Record>(
        &self,
        id: RecordId,
        actor: Option<UserId>,
    ) -> BillTrackerResult<(T, Option<AuditRecord>)>
    where
        Self: HasTable<T>,
    {
        let table = HasTable::<T>::table(self);
        let entity = table.get(id)?.ok_or_else(|| BillTrackerError::NotFound {
            entity_type: T::KIND.table_name(),
            identifier: id.to_string(),
        })?;

        let token = self.interceptor.before_delete(&entity);

        let removed = match table.remove(id) {
            Ok(removed) => removed,
            Err(e) => {
                self.interceptor.discard(token);
                return Err(e);
            }
        };
        if let Err(e) = table.save() {
            self.interceptor.discard(token);
            roll_back(table, id, removed);
            return Err(e);
        }

        debug!(kind = T::KIND.table_name(), id, "Deleted record");
        let record = self.interceptor.after_delete(&entity, token, actor)?;
        Ok((entity, record))
    }
}

impl SnapshotSource for Storage {
    fn load_snapshot(
        &self,
        kind: EntityKind,
        id: RecordId,
    ) -> BillTrackerResult<Option<Snapshot>> {
        match kind {
            EntityKind::User => committed(&self.users, id),
            EntityKind::Status => committed(&self.statuses, id),
            EntityKind::Recurrence => committed(&self.recurrences, id),
            EntityKind::Category => committed(&self.categories, id),
            EntityKind::BankAccount => committed(&self.bank_accounts, id),
            EntityKind::BankAccountInstance => committed(&self.bank_account_instances, id),
            EntityKind::Bill => committed(&self.bills, id),
            EntityKind::DueBill => committed(&self.due_bills, id),
        }
    }
}

fn committed<T: Record>(
    table: &Repository<T>,
    id: RecordId,
) -> BillTrackerResult<Option<Snapshot>> {
    Ok(table.get(id)?.map(|row| row.snapshot()))
}

/// Undo an in-memory change whose table write failed
///
/// Keeps memory in line with the file, so a retry is audited as the same kind
/// of change.
fn roll_back<T: Record>(table: &Repository<T>, id: RecordId, previous: Option<T>) {
    if let Err(e) = table.restore(id, previous) {
        warn!(
            kind = T::KIND.table_name(),
            id,
            error = %e,
            "Failed to roll back in-memory change"
        );
    }
}
