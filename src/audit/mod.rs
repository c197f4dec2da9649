//! Audit logging for BillTracker
//!
//! Every create, update, and delete of an audited entity (bank accounts,
//! balance snapshots, bills, due bills, statuses, recurrences, categories)
//! is recorded in an append-only log with normalized before/after values and
//! the acting user.
//!
//! # Architecture
//!
//! - `value`: `FieldValue`/`Snapshot` and normalization into log-safe JSON
//! - `actor`: resolves the ambient current user to a persisted `UserId`
//! - `snapshot`: pending pre-mutation snapshots, redeemed by token
//! - `interceptor`: the before/after hooks the storage layer calls
//! - `entry` / `logger`: the record format and the JSONL log writer
//! - `diff`: readable change summaries for display
//!
//! # Example
//!
//! ```rust,ignore
//! use billtracker::audit::{AuditLog, ChangeInterceptor};
//!
//! let interceptor = ChangeInterceptor::new(AuditLog::new(paths.audit_log()));
//!
//! let token = interceptor.before_save(&bill, &storage);
//! // ... write the bill ...
//! interceptor.after_save(&bill, created, token, actor)?;
//! ```

mod actor;
mod diff;
mod entry;
mod interceptor;
mod logger;
mod snapshot;
mod value;

pub use actor::{resolve_actor, CurrentUser, DeferredUser};
pub use diff::{change_summary, field_changes, FieldChange};
pub use entry::{AuditAction, AuditDraft, AuditRecord};
pub use interceptor::{ChangeInterceptor, SnapshotSource};
pub use logger::{AuditLog, AuditSink};
pub use snapshot::{SnapshotCache, SnapshotToken};
pub use value::{normalize, normalize_fields, normalize_snapshot, FieldValue, Snapshot};
