//! Lookup table service
//!
//! Statuses, recurrences, and categories shared by every user's bills and
//! accounts. Names are unique per table (case-insensitive).

use crate::error::{BillTrackerError, BillTrackerResult};
use crate::models::{Category, Recurrence, Record, Status, UserId};
use crate::storage::{HasTable, Storage};

/// Service for the shared lookup tables
pub struct LookupService<'a> {
    storage: &'a Storage,
}

impl<'a> LookupService<'a> {
    /// Create a new lookup service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Add a status (e.g. "Paid", "Late") with its highlight color
    pub fn add_status(
        &self,
        name: &str,
        highlight_color: &str,
        actor: Option<UserId>,
    ) -> BillTrackerResult<Status> {
        let name = self.unique_name::<Status>(name, |s| &s.name)?;
        let mut status = Status::new(name, highlight_color.trim());
        status
            .validate()
            .map_err(|e| BillTrackerError::Validation(e.to_string()))?;

        self.storage.save(&mut status, actor)?;
        Ok(status)
    }

    /// Add a recurrence (e.g. "Monthly") with an optional calculation rule
    pub fn add_recurrence(
        &self,
        name: &str,
        calculation: Option<&str>,
        actor: Option<UserId>,
    ) -> BillTrackerResult<Recurrence> {
        let name = self.unique_name::<Recurrence>(name, |r| &r.name)?;
        let calculation = calculation
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(String::from);

        let mut recurrence = Recurrence::new(name, calculation);
        recurrence
            .validate()
            .map_err(|e| BillTrackerError::Validation(e.to_string()))?;

        self.storage.save(&mut recurrence, actor)?;
        Ok(recurrence)
    }

    /// Add a bill category
    pub fn add_category(&self, name: &str, actor: Option<UserId>) -> BillTrackerResult<Category> {
        let name = self.unique_name::<Category>(name, |c| &c.name)?;
        let mut category = Category::new(name);
        category
            .validate()
            .map_err(|e| BillTrackerError::Validation(e.to_string()))?;

        self.storage.save(&mut category, actor)?;
        Ok(category)
    }

    pub fn statuses(&self) -> BillTrackerResult<Vec<Status>> {
        self.storage.list()
    }

    pub fn recurrences(&self) -> BillTrackerResult<Vec<Recurrence>> {
        self.storage.list()
    }

    pub fn categories(&self) -> BillTrackerResult<Vec<Category>> {
        self.storage.list()
    }

    /// Trim a name and reject it if the table already has it
    fn unique_name<T: Record>(
        &self,
        name: &str,
        name_of: impl Fn(&T) -> &String,
    ) -> BillTrackerResult<String>
    where
        Storage: HasTable<T>,
    {
        let name = name.trim();
        let name_lower = name.to_lowercase();
        let taken = HasTable::<T>::table(self.storage)
            .find_by(|row| name_of(row).to_lowercase() == name_lower)?;

        if !taken.is_empty() {
            return Err(BillTrackerError::Duplicate {
                entity_type: T::KIND.table_name(),
                identifier: name.to_string(),
            });
        }
        Ok(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditAction;
    use crate::services::tests::create_test_storage;
    use serde_json::json;

    #[test]
    fn test_add_status_is_audited() {
        let (_temp_dir, storage) = create_test_storage();
        let service = LookupService::new(&storage);

        let status = service
            .add_status("Paid", "green", Some(UserId::new(1)))
            .unwrap();
        assert_eq!(status.record_id(), Some(1));

        let records = storage.audit_log().read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].table_name, "Status");
        assert_eq!(records[0].action, AuditAction::Add);
        assert_eq!(
            records[0].after_values,
            Some(json!({"id": 1, "name": "Paid", "highlight_color": "green"}))
        );
    }

    #[test]
    fn test_add_recurrence_blank_calculation() {
        let (_temp_dir, storage) = create_test_storage();
        let service = LookupService::new(&storage);

        let recurrence = service.add_recurrence("Monthly", Some("  "), None).unwrap();
        assert_eq!(recurrence.calculation, None);

        let recurrence = service
            .add_recurrence("Weekly", Some("+7 days"), None)
            .unwrap();
        assert_eq!(recurrence.calculation.as_deref(), Some("+7 days"));
    }

    #[test]
    fn test_duplicate_category_rejected() {
        let (_temp_dir, storage) = create_test_storage();
        let service = LookupService::new(&storage);

        service.add_category("Utilities", None).unwrap();
        let err = service.add_category("utilities", None).unwrap_err();
        assert!(matches!(
            err,
            BillTrackerError::Duplicate {
                entity_type: "Category",
                ..
            }
        ));
        assert_eq!(service.categories().unwrap().len(), 1);
    }

    #[test]
    fn test_empty_name_rejected_without_audit() {
        let (_temp_dir, storage) = create_test_storage();
        let service = LookupService::new(&storage);

        assert!(service.add_category("", None).unwrap_err().is_validation());
        assert_eq!(storage.audit_log().entry_count().unwrap(), 0);
    }
}
