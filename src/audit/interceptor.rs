//! Change interception for audited entities
//!
//! The storage layer calls four hooks around every single-record mutation:
//!
//! ```text
//! before_save ──► (write) ──► after_save(created)
//! before_delete ─► (remove) ─► after_delete
//! ```
//!
//! The "before" hooks capture the prior state into the snapshot cache and
//! return a token; the matching "after" hook redeems the token, normalizes
//! both states, and appends exactly one audit record. Kinds outside
//! [`AUDITED_KINDS`](crate::models::AUDITED_KINDS) pass through every hook
//! untouched.
//!
//! Only persistence failures of the audit record are returned as errors.
//! Everything else (a vanished record, a poisoned cache, a missing token)
//! is logged and degrades to missing before-values.

use tracing::{debug, warn};

use super::entry::{AuditDraft, AuditRecord};
use super::logger::AuditSink;
use super::snapshot::{SnapshotCache, SnapshotToken};
use super::value::{normalize_fields, normalize_snapshot, Snapshot};
use crate::error::{BillTrackerError, BillTrackerResult};
use crate::models::{EntityKind, Record, RecordId, UserId};

/// Read access to last-committed record state
pub trait SnapshotSource {
    /// Current committed state of a record, or `None` if it does not exist
    fn load_snapshot(
        &self,
        kind: EntityKind,
        id: RecordId,
    ) -> BillTrackerResult<Option<Snapshot>>;
}

/// Observes mutations of audited entities and records them
pub struct ChangeInterceptor<S: AuditSink> {
    sink: S,
    cache: SnapshotCache,
}

impl<S: AuditSink> ChangeInterceptor<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            cache: SnapshotCache::new(),
        }
    }

    /// The sink records are appended to
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Snapshots captured by a "before" hook but not yet redeemed
    pub fn pending_snapshots(&self) -> usize {
        self.cache.pending()
    }

    /// Pre-mutation hook for a create-or-update
    ///
    /// Captures the committed state if the record already exists. A new
    /// record (no id yet, or an id storage doesn't know) has no prior state.
    pub fn before_save<T: Record>(
        &self,
        entity: &T,
        source: &dyn SnapshotSource,
    ) -> Option<SnapshotToken> {
        if !T::KIND.is_audited() {
            return None;
        }
        let kind = T::KIND;
        let id = entity.record_id()?;

        match source.load_snapshot(kind, id) {
            Ok(Some(committed)) => self.cache.capture(kind, id, committed),
            Ok(None) => None,
            Err(e) => {
                warn!(%kind, id, error = %e, "Failed to load prior state; treating as new");
                None
            }
        }
    }

    /// Post-mutation hook for a create-or-update
    ///
    /// Appends an `add` record when `created`, otherwise an `update` record
    /// whose before-values come from the redeemed token (null on a miss).
    pub fn after_save<T: Record>(
        &self,
        entity: &T,
        created: bool,
        token: Option<SnapshotToken>,
        actor: Option<UserId>,
    ) -> BillTrackerResult<Option<AuditRecord>> {
        if !T::KIND.is_audited() {
            self.discard(token);
            return Ok(None);
        }
        let row_id = saved_id(entity)?;
        let after = normalize_fields(&entity.snapshot());

        let draft = if created {
            self.discard(token);
            AuditDraft::add(actor, T::KIND, row_id, after)
        } else {
            let before = self.redeem(token, T::KIND, row_id);
            AuditDraft::update(actor, T::KIND, row_id, normalize_snapshot(before.as_ref()), after)
        };

        self.sink.append(draft).map(Some)
    }

    /// Pre-delete hook: a record being deleted always has a prior state
    pub fn before_delete<T: Record>(&self, entity: &T) -> Option<SnapshotToken> {
        if !T::KIND.is_audited() {
            return None;
        }
        let id = entity.record_id()?;
        self.cache.capture(T::KIND, id, entity.snapshot())
    }

    /// Post-delete hook: appends a `delete` record
    ///
    /// Unlike an update, a delete whose token cannot be redeemed does not fall
    /// back to null before-values: the state of the instance just removed
    /// stands in for the captured snapshot. A delete record has no
    /// after-values, so this keeps at least one side of every record present.
    pub fn after_delete<T: Record>(
        &self,
        entity: &T,
        token: Option<SnapshotToken>,
        actor: Option<UserId>,
    ) -> BillTrackerResult<Option<AuditRecord>> {
        if !T::KIND.is_audited() {
            self.discard(token);
            return Ok(None);
        }
        let row_id = saved_id(entity)?;

        let before = self
            .redeem(token, T::KIND, row_id)
            .unwrap_or_else(|| entity.snapshot());

        let draft = AuditDraft::delete(actor, T::KIND, row_id, normalize_fields(&before));
        self.sink.append(draft).map(Some)
    }

    /// Drop a pending snapshot whose mutation will not complete
    pub fn discard(&self, token: Option<SnapshotToken>) {
        if let Some(token) = token {
            debug!(kind = %token.kind(), id = token.id(), "Discarding pending snapshot");
            self.cache.take(token);
        }
    }

    fn redeem(
        &self,
        token: Option<SnapshotToken>,
        kind: EntityKind,
        id: RecordId,
    ) -> Option<Snapshot> {
        let Some(token) = token else {
            warn!(%kind, id, "No prior snapshot captured");
            return None;
        };

        if token.kind() != kind || token.id() != id {
            warn!(
                %kind,
                id,
                token_kind = %token.kind(),
                token_id = token.id(),
                "Snapshot token belongs to another record"
            );
            self.cache.take(token);
            return None;
        }

        let snapshot = self.cache.take(token);
        if snapshot.is_none() {
            warn!(%kind, id, "Prior snapshot missing from cache");
        }
        snapshot
    }
}

fn saved_id<T: Record>(entity: &T) -> BillTrackerResult<RecordId> {
    entity.record_id().ok_or_else(|| {
        BillTrackerError::Audit(format!("Cannot audit unsaved {} record", T::KIND))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::entry::AuditAction;
    use crate::models::{Bill, Category, Money, User};
    use serde_json::json;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Sink that keeps records in memory, optionally failing every append
    #[derive(Default)]
    struct MemorySink {
        records: RefCell<Vec<AuditRecord>>,
        fail: bool,
    }

    impl AuditSink for MemorySink {
        fn append(&self, draft: AuditDraft) -> BillTrackerResult<AuditRecord> {
            if self.fail {
                return Err(BillTrackerError::Audit("disk full".into()));
            }
            let mut records = self.records.borrow_mut();
            let id = records.len() as u64 + 1;
            let record = AuditRecord::from_draft(id, draft, chrono::Utc::now());
            records.push(record.clone());
            Ok(record)
        }
    }

    /// Committed state keyed by (kind, id)
    #[derive(Default)]
    struct MemorySource {
        rows: HashMap<(EntityKind, RecordId), Snapshot>,
        broken: bool,
    }

    impl MemorySource {
        fn commit<T: Record>(&mut self, entity: &T) {
            self.rows
                .insert((T::KIND, entity.record_id().unwrap()), entity.snapshot());
        }
    }

    impl SnapshotSource for MemorySource {
        fn load_snapshot(
            &self,
            kind: EntityKind,
            id: RecordId,
        ) -> BillTrackerResult<Option<Snapshot>> {
            if self.broken {
                return Err(BillTrackerError::Storage("table vanished".into()));
            }
            Ok(self.rows.get(&(kind, id)).cloned())
        }
    }

    fn saved_bill(id: i64, amount: &str) -> Bill {
        let mut bill = Bill::new(UserId::new(1), "Rent", Money::parse(amount).unwrap());
        bill.assign_id(id);
        bill
    }

    #[test]
    fn test_creation_records_add() {
        let interceptor = ChangeInterceptor::new(MemorySink::default());
        let source = MemorySource::default();
        let bill = Bill::new(UserId::new(1), "Rent", Money::parse("1200.00").unwrap());

        let token = interceptor.before_save(&bill, &source);
        assert!(token.is_none());

        let mut saved = bill.clone();
        saved.assign_id(1);
        let record = interceptor
            .after_save(&saved, true, token, Some(UserId::new(1)))
            .unwrap()
            .unwrap();

        assert_eq!(record.action, AuditAction::Add);
        assert_eq!(record.table_name, "Bill");
        assert_eq!(record.row_id, 1);
        assert_eq!(record.user, Some(UserId::new(1)));
        assert!(record.before_values.is_none());
        assert_eq!(record.after_values.as_ref().unwrap()["default_amount_due"], json!(1200.0));
    }

    #[test]
    fn test_update_records_before_and_after() {
        let interceptor = ChangeInterceptor::new(MemorySink::default());
        let mut source = MemorySource::default();
        source.commit(&saved_bill(1, "1200.00"));

        let updated = saved_bill(1, "1300.00");
        let token = interceptor.before_save(&updated, &source);
        assert!(token.is_some());
        assert_eq!(interceptor.pending_snapshots(), 1);

        let record = interceptor
            .after_save(&updated, false, token, None)
            .unwrap()
            .unwrap();

        assert_eq!(record.action, AuditAction::Update);
        assert_eq!(record.before_values.unwrap()["default_amount_due"], json!(1200.0));
        assert_eq!(record.after_values.unwrap()["default_amount_due"], json!(1300.0));
        assert_eq!(interceptor.pending_snapshots(), 0);
    }

    #[test]
    fn test_update_without_snapshot_has_null_before() {
        let interceptor = ChangeInterceptor::new(MemorySink::default());

        let record = interceptor
            .after_save(&saved_bill(1, "10.00"), false, None, None)
            .unwrap()
            .unwrap();

        assert_eq!(record.action, AuditAction::Update);
        assert!(record.before_values.is_none());
        assert!(record.after_values.is_some());
    }

    #[test]
    fn test_explicit_id_unknown_to_storage_is_a_creation() {
        let interceptor = ChangeInterceptor::new(MemorySink::default());
        let source = MemorySource::default();

        assert!(interceptor.before_save(&saved_bill(42, "5.00"), &source).is_none());
    }

    #[test]
    fn test_lookup_failure_is_suppressed() {
        let interceptor = ChangeInterceptor::new(MemorySink::default());
        let source = MemorySource {
            broken: true,
            ..Default::default()
        };

        assert!(interceptor.before_save(&saved_bill(1, "5.00"), &source).is_none());
    }

    #[test]
    fn test_delete_records_before_only() {
        let interceptor = ChangeInterceptor::new(MemorySink::default());
        let bill = saved_bill(3, "1300.00");

        let token = interceptor.before_delete(&bill);
        let record = interceptor
            .after_delete(&bill, token, Some(UserId::new(1)))
            .unwrap()
            .unwrap();

        assert_eq!(record.action, AuditAction::Delete);
        assert_eq!(record.before_values.unwrap()["name"], json!("Rent"));
        assert!(record.after_values.is_none());
    }

    #[test]
    fn test_delete_without_token_uses_removed_instance() {
        let interceptor = ChangeInterceptor::new(MemorySink::default());
        let bill = saved_bill(3, "1.00");

        let record = interceptor.after_delete(&bill, None, None).unwrap().unwrap();
        assert_eq!(record.before_values.unwrap()["id"], json!(3));
    }

    #[test]
    fn test_mismatched_token_is_not_used() {
        let interceptor = ChangeInterceptor::new(MemorySink::default());
        let mut source = MemorySource::default();
        source.commit(&saved_bill(1, "1.00"));

        let token = interceptor.before_save(&saved_bill(1, "2.00"), &source);
        let record = interceptor
            .after_save(&saved_bill(2, "2.00"), false, token, None)
            .unwrap()
            .unwrap();

        assert!(record.before_values.is_none());
        assert_eq!(interceptor.pending_snapshots(), 0);
    }

    #[test]
    fn test_non_audited_kind_produces_nothing() {
        let interceptor = ChangeInterceptor::new(MemorySink::default());
        let mut source = MemorySource::default();
        let mut user = User::new("alice");
        user.assign_id(1);
        source.commit(&user);

        assert!(interceptor.before_save(&user, &source).is_none());
        assert!(interceptor.after_save(&user, true, None, None).unwrap().is_none());
        assert!(interceptor.after_save(&user, false, None, None).unwrap().is_none());
        assert!(interceptor.before_delete(&user).is_none());
        assert!(interceptor.after_delete(&user, None, None).unwrap().is_none());
        assert!(interceptor.sink().records.borrow().is_empty());
    }

    #[test]
    fn test_one_record_per_mutation() {
        let interceptor = ChangeInterceptor::new(MemorySink::default());
        let mut source = MemorySource::default();
        let mut category = Category::new("Utilities");
        category.assign_id(1);

        interceptor.after_save(&category, true, None, None).unwrap();
        source.commit(&category);

        category.name = "Bills".into();
        let token = interceptor.before_save(&category, &source);
        interceptor.after_save(&category, false, token, None).unwrap();

        let token = interceptor.before_delete(&category);
        interceptor.after_delete(&category, token, None).unwrap();

        let actions: Vec<_> = interceptor
            .sink()
            .records
            .borrow()
            .iter()
            .map(|r| r.action)
            .collect();
        assert_eq!(
            actions,
            vec![AuditAction::Add, AuditAction::Update, AuditAction::Delete]
        );
    }

    #[test]
    fn test_sink_failure_propagates() {
        let interceptor = ChangeInterceptor::new(MemorySink {
            fail: true,
            ..Default::default()
        });

        let err = interceptor
            .after_save(&saved_bill(1, "1.00"), true, None, None)
            .unwrap_err();
        assert!(err.is_audit());
    }
}
