//! Typed view of a resolved store
//!
//! Downstream subsystems read settings through [`ResolvedConfig`] instead of
//! poking string keys.

use std::path::PathBuf;

use super::url::ParsedUrl;
use crate::store::{ConfigStore, ConfigValue};

/// Settings present only when a `url` is configured.
#[derive(Debug, Clone, PartialEq)]
pub struct UrlSettings {
    pub url: String,
    pub parsed: ParsedUrl,
    pub base_url: String,
    pub relative_path: String,
    pub secure: bool,
    pub use_port: bool,
    pub asset_base_url: String,
    pub port: String,
    pub socket_io_origins: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub base_dir: PathBuf,
    pub themes_path: PathBuf,
    pub views_dir: PathBuf,
    pub core_templates_path: PathBuf,
    pub base_templates_path: PathBuf,
    pub upload_path: PathBuf,
    pub upload_url: String,
    pub version: String,
    pub is_cluster: bool,
    pub is_primary: bool,
    pub jobs_disabled: bool,
    pub run_jobs: bool,
    pub session_key: String,
    pub url: Option<UrlSettings>,
}

impl ResolvedConfig {
    /// Snapshot a store that has been through resolution.
    pub fn from_store(store: &ConfigStore) -> Self {
        let text = |key: &str| store.get(key).map(ToString::to_string).unwrap_or_default();
        let path = |key: &str| PathBuf::from(text(key));
        let flag = |key: &str| store.get(key).and_then(ConfigValue::as_bool).unwrap_or(false);

        let url = store.is_truthy("url").then(|| UrlSettings {
            url: text("url"),
            parsed: store
                .get("url_parsed")
                .and_then(ConfigValue::as_table)
                .map(ParsedUrl::from_table)
                .unwrap_or_default(),
            base_url: text("base_url"),
            relative_path: text("relative_path"),
            secure: flag("secure"),
            use_port: flag("use_port"),
            asset_base_url: text("asset_base_url"),
            port: text("port"),
            socket_io_origins: text("socket.io:origins"),
        });

        Self {
            base_dir: path("base_dir"),
            themes_path: path("themes_path"),
            views_dir: path("views_dir"),
            core_templates_path: path("core_templates_path"),
            base_templates_path: path("base_templates_path"),
            upload_path: path("upload_path"),
            upload_url: text("upload_url"),
            version: text("version"),
            is_cluster: flag("isCluster"),
            is_primary: flag("isPrimary"),
            jobs_disabled: flag("jobsDisabled"),
            run_jobs: flag("runJobs"),
            session_key: text("sessionKey"),
            url,
        }
    }
}
