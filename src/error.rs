//! Custom error types for BillTracker
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for BillTracker operations
#[derive(Error, Debug)]
pub enum BillTrackerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// The audit record for a committed mutation could not be persisted
    #[error("Audit log error: {0}")]
    Audit(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),
}

impl BillTrackerError {
    /// Create a "not found" error for users
    pub fn user_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "User",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for bank accounts
    pub fn account_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "BankAccount",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for bills
    pub fn bill_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Bill",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for due bills
    pub fn due_bill_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "DueBill",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for audit records
    pub fn audit_record_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "AuditLog",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is an audit persistence failure
    pub fn is_audit(&self) -> bool {
        matches!(self, Self::Audit(_))
    }
}

impl From<std::io::Error> for BillTrackerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BillTrackerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for BillTracker operations
pub type BillTrackerResult<T> = Result<T, BillTrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BillTrackerError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = BillTrackerError::bill_not_found("42");
        assert_eq!(err.to_string(), "Bill not found: 42");
        assert!(err.is_not_found());
        assert!(!err.is_validation());
    }

    #[test]
    fn test_audit_error() {
        let err = BillTrackerError::Audit("disk full".into());
        assert_eq!(err.to_string(), "Audit log error: disk full");
        assert!(err.is_audit());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: BillTrackerError = io_err.into();
        assert!(matches!(err, BillTrackerError::Io(_)));
    }
}
