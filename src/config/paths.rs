//! Path management for BillTracker
//!
//! Provides XDG-compliant path resolution for configuration, data, and the audit log.
//!
//! ## Path Resolution Order
//!
//! 1. `BILLTRACKER_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/billtracker` or `~/.config/billtracker`
//! 3. Windows: `%APPDATA%\billtracker`

use std::path::PathBuf;

use crate::error::BillTrackerError;

/// Manages all paths used by BillTracker
#[derive(Debug, Clone)]
pub struct BillTrackerPaths {
    /// Base directory for all BillTracker data
    base_dir: PathBuf,
}

impl BillTrackerPaths {
    /// Create a new BillTrackerPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, BillTrackerError> {
        let base_dir = if let Ok(custom) = std::env::var("BILLTRACKER_DATA_DIR") {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create BillTrackerPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.config/billtracker/ or equivalent)
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the data directory (~/.config/billtracker/data/)
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the audit log
    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    /// Get the path of the JSON file backing a table
    ///
    /// Table names are the entity type names (`Bill`, `DueBill`, ...), stored
    /// in snake case: `bill.json`, `due_bill.json`.
    pub fn table_file(&self, table_name: &str) -> PathBuf {
        self.data_dir()
            .join(format!("{}.json", to_snake_case(table_name)))
    }

    /// Ensure all required directories exist
    pub fn ensure_directories(&self) -> Result<(), BillTrackerError> {
        std::fs::create_dir_all(&self.base_dir).map_err(|e| {
            BillTrackerError::Io(format!("Failed to create base directory: {}", e))
        })?;

        std::fs::create_dir_all(self.data_dir()).map_err(|e| {
            BillTrackerError::Io(format!("Failed to create data directory: {}", e))
        })?;

        Ok(())
    }

    /// Check if BillTracker has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Resolve the default data directory path based on platform
#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, BillTrackerError> {
    let config_base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) => PathBuf::from(xdg),
        Err(_) => {
            let home = std::env::var("HOME").map_err(|_| {
                BillTrackerError::Config("HOME environment variable not set".into())
            })?;
            PathBuf::from(home).join(".config")
        }
    };
    Ok(config_base.join("billtracker"))
}

/// Resolve the default data directory path based on platform
#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, BillTrackerError> {
    let appdata = std::env::var("APPDATA")
        .map_err(|_| BillTrackerError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("billtracker"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = BillTrackerPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.data_dir(), temp_dir.path().join("data"));
        assert_eq!(paths.audit_log(), temp_dir.path().join("audit.log"));
    }

    #[test]
    fn test_table_files_are_snake_case() {
        let paths = BillTrackerPaths::with_base_dir(PathBuf::from("/tmp/bt"));

        assert_eq!(paths.table_file("Bill"), PathBuf::from("/tmp/bt/data/bill.json"));
        assert_eq!(
            paths.table_file("BankAccountInstance"),
            PathBuf::from("/tmp/bt/data/bank_account_instance.json")
        );
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = BillTrackerPaths::with_base_dir(temp_dir.path().join("nested"));

        paths.ensure_directories().unwrap();

        assert!(paths.data_dir().exists());
        assert!(!paths.is_initialized());
    }
}
