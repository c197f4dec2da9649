//! User service
//!
//! Registration and lookup of users. Users are the actors recorded in the
//! audit log; they are not audited themselves.

use crate::error::{BillTrackerError, BillTrackerResult};
use crate::models::{User, UserId};
use crate::storage::Storage;

/// Service for user management
pub struct UserService<'a> {
    storage: &'a Storage,
}

impl<'a> UserService<'a> {
    /// Create a new user service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Register a new user
    pub fn register(&self, username: &str) -> BillTrackerResult<User> {
        let username = username.trim();
        if username.is_empty() {
            return Err(BillTrackerError::Validation(
                "Username cannot be empty".into(),
            ));
        }

        if self.find_by_name(username)?.is_some() {
            return Err(BillTrackerError::Duplicate {
                entity_type: "User",
                identifier: username.to_string(),
            });
        }

        let mut user = User::new(username);
        user.validate()
            .map_err(|e| BillTrackerError::Validation(e.to_string()))?;

        self.storage.save(&mut user, None)?;
        Ok(user)
    }

    /// Get a user by ID
    pub fn get(&self, id: UserId) -> BillTrackerResult<Option<User>> {
        self.storage.get(id.get())
    }

    /// Find a user by exact username
    pub fn find_by_name(&self, username: &str) -> BillTrackerResult<Option<User>> {
        Ok(self
            .storage
            .users
            .find_by(|u| u.username == username)?
            .into_iter()
            .next())
    }

    /// Find a user by username, failing if there is none
    pub fn require(&self, username: &str) -> BillTrackerResult<User> {
        self.find_by_name(username)?
            .ok_or_else(|| BillTrackerError::user_not_found(username))
    }

    /// All users in registration order
    pub fn list(&self) -> BillTrackerResult<Vec<User>> {
        self.storage.list()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::tests::create_test_storage;

    #[test]
    fn test_register_user() {
        let (_temp_dir, storage) = create_test_storage();
        let service = UserService::new(&storage);

        let user = service.register("  alice ").unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.id, Some(UserId::new(1)));
        assert_eq!(service.require("alice").unwrap(), user);
    }

    #[test]
    fn test_register_duplicate() {
        let (_temp_dir, storage) = create_test_storage();
        let service = UserService::new(&storage);

        service.register("alice").unwrap();
        let err = service.register("alice").unwrap_err();
        assert!(matches!(err, BillTrackerError::Duplicate { .. }));
    }

    #[test]
    fn test_register_empty_name() {
        let (_temp_dir, storage) = create_test_storage();
        let service = UserService::new(&storage);

        assert!(service.register("   ").unwrap_err().is_validation());
    }

    #[test]
    fn test_registration_is_not_audited() {
        let (_temp_dir, storage) = create_test_storage();
        UserService::new(&storage).register("alice").unwrap();

        assert_eq!(storage.audit_log().entry_count().unwrap(), 0);
    }

    #[test]
    fn test_require_unknown_user() {
        let (_temp_dir, storage) = create_test_storage();
        let service = UserService::new(&storage);

        assert!(service.require("nobody").unwrap_err().is_not_found());
        assert!(service.list().unwrap().is_empty());
    }
}
