//! Error handling
//!
//! Defines the bootstrap error type and how the binary reports it.

pub mod handlers;
pub mod types;

pub use types::*;
