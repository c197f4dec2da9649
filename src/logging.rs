//! Diagnostic logging setup using tracing
//!
//! Diagnostics go to stderr so command output on stdout stays clean.
//! `RUST_LOG` takes precedence over the configured level.
//!
//! ```no_run
//! billtracker::logging::init_logging("info").expect("Failed to initialize logging");
//! ```

use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::error::{BillTrackerError, BillTrackerResult};

/// Initialize the global subscriber
///
/// `log_level_str` is one of trace, debug, info, warn, error and applies to
/// this crate's events unless `RUST_LOG` is set.
pub fn init_logging(log_level_str: &str) -> BillTrackerResult<()> {
    let log_level = parse_log_level(log_level_str)?;

    let directive = format!("billtracker={}", log_level_str.to_lowercase());
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .map_err(|e| BillTrackerError::Config(format!("Failed to initialize logging: {}", e)))?;

    tracing::debug!(level = %log_level, "Logging initialized");
    Ok(())
}

/// Parse log level from string
pub fn parse_log_level(level_str: &str) -> BillTrackerResult<Level> {
    match level_str.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(BillTrackerError::Config(format!(
            "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
            level_str
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level_valid() {
        assert_eq!(parse_log_level("trace").unwrap(), Level::TRACE);
        assert_eq!(parse_log_level("debug").unwrap(), Level::DEBUG);
        assert_eq!(parse_log_level("info").unwrap(), Level::INFO);
        assert_eq!(parse_log_level("warn").unwrap(), Level::WARN);
        assert_eq!(parse_log_level("error").unwrap(), Level::ERROR);
    }

    #[test]
    fn test_parse_log_level_case_insensitive() {
        assert_eq!(parse_log_level("WARN").unwrap(), Level::WARN);
        assert_eq!(parse_log_level("Debug").unwrap(), Level::DEBUG);
    }

    #[test]
    fn test_parse_log_level_invalid() {
        assert!(matches!(
            parse_log_level("verbose"),
            Err(BillTrackerError::Config(_))
        ));
        assert!(parse_log_level("").is_err());
    }

    #[test]
    fn test_invalid_level_fails_before_installing_subscriber() {
        assert!(init_logging("loud").is_err());
    }
}
