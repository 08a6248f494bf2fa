//! Forum server prestart
//!
//! Resolves the process configuration from the environment, a configuration
//! file and built-in defaults, configures logging from the result, and checks
//! the toolchain against the supported range.

pub mod config;
pub mod error;
pub mod store;
pub mod utils;
pub mod version;

pub use self::config::{Paths, ResolvedConfig, load_config, resolve};
pub use error::ConfigError;
pub use store::{ConfigStore, ConfigValue, Environment};
pub use utils::logging::setup_logging;
pub use version::version_check;
