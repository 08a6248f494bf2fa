//! Error handlers
//!
//! Reporting for the few errors that abort startup.

use crate::error::types::ConfigError;
use log::error;

/// Log a fatal bootstrap error and return the exit code to use.
pub fn handle_error(err: &ConfigError) -> i32 {
    error!("Startup aborted: {}", err);
    if let Some(source) = std::error::Error::source(err) {
        error!("Caused by: {}", source);
    }
    err.exit_code()
}
