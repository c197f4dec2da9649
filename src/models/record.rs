//! Record kinds and the capability every stored entity provides
//!
//! `EntityKind` names each table; `AUDITED_KINDS` is the fixed set whose
//! mutations end up in the audit log.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;

use super::ids::RecordId;
use crate::audit::Snapshot;

/// Every kind of record the storage layer holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    User,
    Status,
    Recurrence,
    Category,
    BankAccount,
    BankAccountInstance,
    Bill,
    DueBill,
}

/// Kinds whose create/update/delete operations are audited
pub const AUDITED_KINDS: [EntityKind; 7] = [
    EntityKind::BankAccount,
    EntityKind::BankAccountInstance,
    EntityKind::Bill,
    EntityKind::DueBill,
    EntityKind::Status,
    EntityKind::Recurrence,
    EntityKind::Category,
];

impl EntityKind {
    /// Type name recorded as `table_name` in audit records
    pub const fn table_name(&self) -> &'static str {
        match self {
            EntityKind::User => "User",
            EntityKind::Status => "Status",
            EntityKind::Recurrence => "Recurrence",
            EntityKind::Category => "Category",
            EntityKind::BankAccount => "BankAccount",
            EntityKind::BankAccountInstance => "BankAccountInstance",
            EntityKind::Bill => "Bill",
            EntityKind::DueBill => "DueBill",
        }
    }

    /// Whether mutations of this kind are audited
    pub fn is_audited(&self) -> bool {
        AUDITED_KINDS.contains(self)
    }

    /// Look a kind up by its table name (case-insensitive)
    pub fn from_table_name(name: &str) -> Option<Self> {
        const ALL: [EntityKind; 8] = [
            EntityKind::User,
            EntityKind::Status,
            EntityKind::Recurrence,
            EntityKind::Category,
            EntityKind::BankAccount,
            EntityKind::BankAccountInstance,
            EntityKind::Bill,
            EntityKind::DueBill,
        ];
        ALL.into_iter()
            .find(|k| k.table_name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// A persisted entity
///
/// Implementors declare their kind, expose their storage-assigned identifier,
/// and can capture their full field state as a [`Snapshot`]. The snapshot
/// covers every declared field; foreign keys appear as plain identifiers.
pub trait Record: Clone + Serialize + DeserializeOwned {
    const KIND: EntityKind;

    /// Identifier, `None` until storage assigns one
    fn record_id(&self) -> Option<RecordId>;

    fn assign_id(&mut self, id: RecordId);

    fn snapshot(&self) -> Snapshot;
}

/// Validation failure for a model field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    EmptyField(&'static str),
    TooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },
}

impl fmt::Display for ModelValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "{} cannot be empty", field),
            Self::TooLong { field, len, max } => {
                write!(f, "{} too long ({} chars, max {})", field, len, max)
            }
        }
    }
}

impl std::error::Error for ModelValidationError {}

/// Check a required text column against its maximum length
pub(crate) fn check_text(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ModelValidationError> {
    if value.trim().is_empty() {
        return Err(ModelValidationError::EmptyField(field));
    }
    check_len(field, value, max)
}

/// Check an optional (blank-allowed) text column against its maximum length
pub(crate) fn check_len(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ModelValidationError> {
    let len = value.chars().count();
    if len > max {
        return Err(ModelValidationError::TooLong { field, len, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audited_set() {
        assert!(EntityKind::Bill.is_audited());
        assert!(EntityKind::BankAccountInstance.is_audited());
        assert!(!EntityKind::User.is_audited());
    }

    #[test]
    fn test_table_name_round_trip() {
        for kind in AUDITED_KINDS {
            assert_eq!(EntityKind::from_table_name(kind.table_name()), Some(kind));
        }
        assert_eq!(EntityKind::from_table_name("duebill"), Some(EntityKind::DueBill));
        assert_eq!(EntityKind::from_table_name("AuditLog"), None);
    }

    #[test]
    fn test_text_checks() {
        assert!(check_text("Name", "Rent", 100).is_ok());
        assert_eq!(
            check_text("Name", "   ", 100),
            Err(ModelValidationError::EmptyField("Name"))
        );
        assert_eq!(
            check_len("URL", &"a".repeat(11), 10).unwrap_err().to_string(),
            "URL too long (11 chars, max 10)"
        );
        assert!(check_len("URL", "", 10).is_ok());
    }
}
