//! Shared lookup tables: statuses, recurrences, categories
//!
//! These are global (not owned by a user) and referenced by bills, due bills,
//! and balance snapshots.

use serde::{Deserialize, Serialize};

use super::ids::{CategoryId, RecordId, RecurrenceId, StatusId};
use super::record::{check_len, check_text, EntityKind, ModelValidationError, Record};
use crate::audit::Snapshot;

/// Status of a due bill or balance snapshot (e.g. "Paid", "Upcoming")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub id: Option<StatusId>,
    pub name: String,
    /// Row highlight color shown for items in this status
    pub highlight_color: String,
}

impl Status {
    pub fn new(name: impl Into<String>, highlight_color: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            highlight_color: highlight_color.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        check_text("Status name", &self.name, 50)?;
        check_text("Highlight color", &self.highlight_color, 20)
    }
}

impl Record for Status {
    const KIND: EntityKind = EntityKind::Status;

    fn record_id(&self) -> Option<RecordId> {
        self.id.map(|id| id.get())
    }

    fn assign_id(&mut self, id: RecordId) {
        self.id = Some(StatusId::new(id));
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::new()
            .field("id", self.id)
            .field("name", &self.name)
            .field("highlight_color", &self.highlight_color)
    }
}

/// Recurrence pattern of a bill (e.g. "Monthly", "Annually")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recurrence {
    #[serde(default)]
    pub id: Option<RecurrenceId>,
    pub name: String,
    /// Free-form rule used to compute the next due date
    #[serde(default)]
    pub calculation: Option<String>,
}

impl Recurrence {
    pub fn new(name: impl Into<String>, calculation: Option<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            calculation,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        check_text("Recurrence name", &self.name, 50)?;
        match &self.calculation {
            Some(calculation) => check_len("Calculation", calculation, 100),
            None => Ok(()),
        }
    }
}

impl Record for Recurrence {
    const KIND: EntityKind = EntityKind::Recurrence;

    fn record_id(&self) -> Option<RecordId> {
        self.id.map(|id| id.get())
    }

    fn assign_id(&mut self, id: RecordId) {
        self.id = Some(RecurrenceId::new(id));
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::new()
            .field("id", self.id)
            .field("name", &self.name)
            .field("calculation", self.calculation.clone())
    }
}

/// Custom bill category (e.g. "Utilities")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub id: Option<CategoryId>,
    pub name: String,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        check_text("Category name", &self.name, 50)
    }
}

impl Record for Category {
    const KIND: EntityKind = EntityKind::Category;

    fn record_id(&self) -> Option<RecordId> {
        self.id.map(|id| id.get())
    }

    fn assign_id(&mut self, id: RecordId) {
        self.id = Some(CategoryId::new(id));
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::new()
            .field("id", self.id)
            .field("name", &self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::FieldValue;

    #[test]
    fn test_recurrence_snapshot_keeps_null_calculation() {
        let mut recurrence = Recurrence::new("Monthly", None);
        recurrence.assign_id(4);

        let snapshot = recurrence.snapshot();
        assert_eq!(snapshot.get("id"), Some(&FieldValue::Int(4)));
        assert_eq!(snapshot.get("calculation"), Some(&FieldValue::Null));
    }

    #[test]
    fn test_status_validation() {
        assert!(Status::new("Paid", "#00ff00").validate().is_ok());
        assert!(Status::new("", "#00ff00").validate().is_err());
        assert!(Status::new("Paid", "x".repeat(21)).validate().is_err());
    }

    #[test]
    fn test_unsaved_category_has_no_id() {
        let category = Category::new("Utilities");
        assert_eq!(category.record_id(), None);
        assert_eq!(category.snapshot().get("id"), Some(&FieldValue::Null));
    }
}
