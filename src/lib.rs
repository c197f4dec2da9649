//! BillTracker - personal bill and bank-balance tracker with an audit trail
//!
//! This library provides the core functionality for the BillTracker
//! application. Users keep bank accounts with balance snapshots, recurring
//! bills with their due occurrences, and shared lookup tables. Every
//! create, update, and delete of those records is written to an append-only
//! audit log together with the acting user.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `logging`: Diagnostic logging setup
//! - `models`: Core data models (accounts, bills, lookups, users)
//! - `audit`: Change interception and the audit log
//! - `storage`: JSON file storage layer driving the audit hooks
//! - `services`: Business logic layer
//! - `display`: Terminal formatting
//! - `export`: Audit log export (JSON, CSV, YAML)
//! - `cli`: Command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use billtracker::config::{paths::BillTrackerPaths, settings::Settings};
//! use billtracker::storage::Storage;
//!
//! let paths = BillTrackerPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let storage = Storage::new(paths)?;
//! storage.load_all()?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{BillTrackerError, BillTrackerResult};
