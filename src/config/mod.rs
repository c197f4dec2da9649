//! Configuration module for BillTracker
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::BillTrackerPaths;
pub use settings::Settings;
