//! Audit record data structures
//!
//! An [`AuditDraft`] is what the change interceptor produces for one observed
//! mutation. The log writer turns it into an [`AuditRecord`] by assigning an
//! id and a timestamp. Records are never modified after that.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::diff::change_summary;
use crate::models::{EntityKind, RecordId, UserId};

/// Kind of mutation an audit record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Add,
    Update,
    Delete,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditAction::Add => write!(f, "add"),
            AuditAction::Update => write!(f, "update"),
            AuditAction::Delete => write!(f, "delete"),
        }
    }
}

/// An audit record that has not been written yet
#[derive(Debug, Clone, PartialEq)]
pub struct AuditDraft {
    pub user: Option<UserId>,
    pub table_name: String,
    pub row_id: RecordId,
    pub action: AuditAction,
    pub before_values: Option<Value>,
    pub after_values: Option<Value>,
}

impl AuditDraft {
    /// A creation: no prior state
    pub fn add(user: Option<UserId>, kind: EntityKind, row_id: RecordId, after: Value) -> Self {
        Self {
            user,
            table_name: kind.table_name().to_string(),
            row_id,
            action: AuditAction::Add,
            before_values: None,
            after_values: Some(after),
        }
    }

    /// An update; `before` is `None` when no prior snapshot was captured
    pub fn update(
        user: Option<UserId>,
        kind: EntityKind,
        row_id: RecordId,
        before: Option<Value>,
        after: Value,
    ) -> Self {
        Self {
            user,
            table_name: kind.table_name().to_string(),
            row_id,
            action: AuditAction::Update,
            before_values: before,
            after_values: Some(after),
        }
    }

    /// A deletion: no state afterwards
    pub fn delete(user: Option<UserId>, kind: EntityKind, row_id: RecordId, before: Value) -> Self {
        Self {
            user,
            table_name: kind.table_name().to_string(),
            row_id,
            action: AuditAction::Delete,
            before_values: Some(before),
            after_values: None,
        }
    }

    /// Whether at least one of the before/after maps is present
    pub fn has_values(&self) -> bool {
        self.before_values.is_some() || self.after_values.is_some()
    }
}

/// A persisted audit record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Unique, assigned by the log writer
    pub id: u64,

    /// Acting user; `None` means the system or an unresolvable actor
    pub user: Option<UserId>,

    /// Type name of the mutated entity (e.g. "Bill")
    pub table_name: String,

    /// Identifier of the mutated entity
    pub row_id: RecordId,

    pub action: AuditAction,

    /// Normalized field values before the mutation (absent for `add`)
    pub before_values: Option<Value>,

    /// Normalized field values after the mutation (absent for `delete`)
    pub after_values: Option<Value>,

    /// When the record was written (UTC)
    pub timestamp: DateTime<Utc>,
}

impl AuditRecord {
    pub(crate) fn from_draft(id: u64, draft: AuditDraft, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            user: draft.user,
            table_name: draft.table_name,
            row_id: draft.row_id,
            action: draft.action,
            before_values: draft.before_values,
            after_values: draft.after_values,
            timestamp,
        }
    }

    /// Human-readable list of changed fields, for updates with both maps
    pub fn changes(&self) -> Option<String> {
        match (&self.before_values, &self.after_values) {
            (Some(before), Some(after)) => change_summary(before, after),
            _ => None,
        }
    }

    /// Format the record as a single summary line (plus changes, if any)
    pub fn format_human_readable(&self) -> String {
        let actor = self
            .user
            .map(|u| format!("user {}", u))
            .unwrap_or_else(|| "system".to_string());

        let mut output = format!(
            "[{}] #{} {} {} {} by {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.id,
            self.action,
            self.table_name,
            self.row_id,
            actor
        );

        if let Some(changes) = self.changes() {
            output.push_str(&format!("\n  Changes: {}", changes));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_action_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&AuditAction::Add).unwrap(), "\"add\"");
        assert_eq!(AuditAction::Update.to_string(), "update");
        assert_eq!(
            serde_json::from_str::<AuditAction>("\"delete\"").unwrap(),
            AuditAction::Delete
        );
    }

    #[test]
    fn test_draft_constructors() {
        let add = AuditDraft::add(None, EntityKind::Bill, 1, json!({"name": "Rent"}));
        assert_eq!(add.table_name, "Bill");
        assert!(add.before_values.is_none());
        assert!(add.has_values());

        let update = AuditDraft::update(None, EntityKind::Bill, 1, None, json!({}));
        assert_eq!(update.action, AuditAction::Update);
        assert!(update.has_values());

        let delete = AuditDraft::delete(Some(UserId::new(2)), EntityKind::DueBill, 4, json!({}));
        assert_eq!(delete.table_name, "DueBill");
        assert!(delete.after_values.is_none());
    }

    #[test]
    fn test_record_wire_format() {
        let draft = AuditDraft::add(
            Some(UserId::new(1)),
            EntityKind::Category,
            3,
            json!({"name": "Food"}),
        );
        let timestamp = "2025-01-02T03:04:05Z".parse::<DateTime<Utc>>().unwrap();
        let record = AuditRecord::from_draft(10, draft, timestamp);

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 10,
                "user": 1,
                "table_name": "Category",
                "row_id": 3,
                "action": "add",
                "before_values": null,
                "after_values": {"name": "Food"},
                "timestamp": "2025-01-02T03:04:05Z"
            })
        );
    }

    #[test]
    fn test_human_readable_update() {
        let draft = AuditDraft::update(
            None,
            EntityKind::Bill,
            5,
            Some(json!({"name": "Rent", "default_amount_due": 1200.0})),
            json!({"name": "Rent", "default_amount_due": 1300.0}),
        );
        let record = AuditRecord::from_draft(2, draft, Utc::now());

        let text = record.format_human_readable();
        assert!(text.contains("#2 update Bill 5 by system"));
        assert!(text.contains("default_amount_due: 1200.0 -> 1300.0"));
        assert!(!text.contains("name:"));
    }
}
