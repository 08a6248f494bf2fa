//! Configuration resolution
//!
//! Loads the configuration file on top of the environment, fills defaults,
//! coerces launcher flags to booleans and derives the secondary settings the
//! rest of the server reads. Run once at startup, before anything else
//! touches the store.

pub mod coerce;
pub mod paths;
pub mod resolved;
pub mod url;

pub use coerce::{coerce_bool, first_truthy};
pub use paths::{Paths, resolve_path};
pub use resolved::{ResolvedConfig, UrlSettings};
pub use self::url::{DEFAULT_PORT, ParsedUrl};

use log::debug;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::store::{ConfigStore, ConfigValue, Environment, SourceKind, Table};

/// Keys the process launcher passes as strings.
pub const BOOLEAN_KEYS: [&str; 3] = ["isCluster", "isPrimary", "jobsDisabled"];

pub const DEFAULT_UPLOAD_PATH: &str = "public/uploads";
pub const UPLOAD_URL: &str = "/assets/uploads";
pub const DEFAULT_SESSION_KEY: &str = "express.sid";

/// Version declared in the package metadata.
pub const PACKAGE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build the authoritative store: environment, then `config_file`, then
/// resolution. Fails only when the file exists and cannot be parsed.
pub fn load_config(
    config_file: &Path,
    env: &Environment,
    paths: &Paths,
) -> Result<ConfigStore, ConfigError> {
    let mut store = ConfigStore::new(env);
    store.load_file(config_file)?;
    resolve(&mut store, paths);
    Ok(store)
}

/// Resolution pass over a store whose environment and file layers are
/// already registered. Each step sees the output of the previous ones.
pub fn resolve(store: &mut ConfigStore, paths: &Paths) {
    // Writes need a writable layer to land in.
    if store.layer(SourceKind::File).is_none() {
        store.load_table(Table::new());
    }
    store.defaults(defaults(paths));

    store.with_writable_source(SourceKind::Env, |store| {
        for key in BOOLEAN_KEYS {
            if let Some(value) = store.get(key) {
                let coerced = coerce_bool(value);
                store.set(key, coerced);
            }
        }
    });

    let run_jobs = flag(store, "isPrimary") && !flag(store, "jobsDisabled");
    store.set("runJobs", run_jobs);

    let themes_path = resolve_path(&paths.base_dir, &path_of(store, "themes_path"));
    store.set("themes_path", display(&themes_path));
    store.set(
        "core_templates_path",
        display(&paths.base_dir.join("src/views")),
    );
    store.set(
        "base_templates_path",
        display(&themes_path.join("nodebb-theme-persona/templates")),
    );

    let base_dir = match store.get("base_dir").filter(|v| v.is_truthy()) {
        Some(dir) => PathBuf::from(dir.to_string()),
        None => paths.base_dir.clone(),
    };
    let upload_path = resolve_path(&base_dir, &path_of(store, "upload_path"));
    store.set("upload_path", display(&upload_path));
    store.set("upload_url", UPLOAD_URL);

    if !store.is_truthy("sessionKey") {
        store.set("sessionKey", DEFAULT_SESSION_KEY);
    }

    self::url::derive_url_settings(store);

    debug!(
        "Configuration resolved (runJobs={}, url={})",
        run_jobs,
        store.get("url").map(ToString::to_string).unwrap_or_default()
    );
}

fn defaults(paths: &Paths) -> Table {
    let mut table = Table::new();
    let mut put = |key: &str, value: ConfigValue| {
        table.insert(key.to_string(), value);
    };
    put("base_dir", display(&paths.base_dir).into());
    put("themes_path", display(&paths.themes).into());
    put("upload_path", DEFAULT_UPLOAD_PATH.into());
    put(
        "views_dir",
        display(&paths.base_dir.join("build/public/templates")).into(),
    );
    put("version", PACKAGE_VERSION.into());
    put("isCluster", false.into());
    put("isPrimary", true.into());
    put("jobsDisabled", false.into());
    table
}

fn flag(store: &ConfigStore, key: &str) -> bool {
    store.get(key).and_then(ConfigValue::as_bool).unwrap_or(false)
}

fn path_of(store: &ConfigStore, key: &str) -> PathBuf {
    PathBuf::from(store.get(key).map(ToString::to_string).unwrap_or_default())
}

fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
