//! Utility functions
//!
//! Logging setup shared by the binary and embedding servers.

pub mod logging;
