//! User model
//!
//! The persisted user that bank accounts and bills belong to, and that audit
//! records are attributed to. Users themselves are not audited.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{RecordId, UserId};
use super::record::{check_text, EntityKind, ModelValidationError, Record};
use crate::audit::Snapshot;

/// A registered user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: Option<UserId>,

    /// Unique login name
    pub username: String,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: None,
            username: username.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        check_text("Username", &self.username, 150)
    }
}

impl Record for User {
    const KIND: EntityKind = EntityKind::User;

    fn record_id(&self) -> Option<RecordId> {
        self.id.map(|id| id.get())
    }

    fn assign_id(&mut self, id: RecordId) {
        self.id = Some(UserId::new(id));
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::new()
            .field("id", self.id)
            .field("username", &self.username)
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.username)
    }
}
