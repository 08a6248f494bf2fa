//! Forum server prestart - Entry Point
//!
//! Resolves configuration, sets up logging and checks the toolchain before
//! the server proper starts.

use log::{debug, info};
use std::path::PathBuf;
use std::process::ExitCode;

use forum_prestart::error::handlers::handle_error;
use forum_prestart::utils::logging;
use forum_prestart::{ConfigStore, Environment, Paths, ResolvedConfig};

const DEFAULT_CONFIG_FILE: &str = "config.json";

fn main() -> ExitCode {
    let env = Environment::from_process();
    let config_file = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    // Default logging until the configured settings are known.
    logging::setup_logging(&ConfigStore::new(&env), &env);

    let store = match forum_prestart::load_config(&config_file, &env, &Paths::discover()) {
        Ok(store) => store,
        Err(e) => {
            let code = handle_error(&e);
            return ExitCode::from(u8::try_from(code).unwrap_or(1));
        }
    };

    if !logging::setup_logging(&store, &env) {
        eprintln!("Another logger is already installed; keeping it");
    }
    debug!("Logging configured ({})", logging::describe(&store));

    forum_prestart::version_check();

    let resolved = ResolvedConfig::from_store(&store);
    info!("Configuration loaded from {}", config_file.display());
    info!("Version {}", resolved.version);
    match &resolved.url {
        Some(url) => info!(
            "Serving {} on port {} (relative path {:?}, secure={})",
            url.base_url, url.port, url.relative_path, url.secure
        ),
        None => info!("No url configured"),
    }
    info!(
        "Uploads at {} served from {}",
        resolved.upload_path.display(),
        resolved.upload_url
    );
    debug!(
        "Cluster: isCluster={} isPrimary={} runJobs={}",
        resolved.is_cluster, resolved.is_primary, resolved.run_jobs
    );

    ExitCode::SUCCESS
}
