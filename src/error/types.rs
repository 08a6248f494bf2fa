//! Error types
//!
//! Resolution is designed to absorb malformed input; the only failure that
//! reaches the caller is a configuration file that exists but cannot be read.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration file {}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: config::ConfigError,
    },
}

impl ConfigError {
    /// Process exit code the binary uses for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            ConfigError::File { .. } => 78,
        }
    }
}
