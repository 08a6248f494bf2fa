use std::fs;
use std::path::Path;

use forum_prestart::config::DEFAULT_PORT;
use forum_prestart::{ConfigError, ConfigValue, Environment, Paths, ResolvedConfig, load_config};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

// Helper to write a config file into a fresh install directory
fn install_with_config(name: &str, contents: &str) -> (TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    (dir, path)
}

#[test]
fn test_json_config_with_subfolder_url() {
    let (dir, path) = install_with_config(
        "config.json",
        r#"{
            "url": "https://example.com/forum/",
            "port": 3000,
            "secret": "abc",
            "database": "redis",
            "redis": { "host": "127.0.0.1", "port": 6379 }
        }"#,
    );
    let env = Environment::from_pairs([("PORT", "8080")]);

    let store = load_config(&path, &env, &Paths::new(dir.path())).unwrap();
    let resolved = ResolvedConfig::from_store(&store);
    let url = resolved.url.expect("url settings");

    assert_eq!(url.url, "https://example.com/forum");
    assert_eq!(url.base_url, "https://example.com");
    assert!(url.secure);
    assert_eq!(url.relative_path, "/forum");
    assert_eq!(url.asset_base_url, "/forum/assets");
    assert_eq!(url.port, "8080");
    assert_eq!(url.socket_io_origins, "https://example.com:*");
    assert_eq!(store.get("redis:port"), Some(&ConfigValue::Int(6379)));
    assert_eq!(
        resolved.upload_path,
        dir.path().join("public").join("uploads")
    );
    assert_eq!(resolved.themes_path, dir.path().join("node_modules"));
}

#[test]
fn test_env_flags_from_launcher() {
    let (dir, path) = install_with_config("config.json", r#"{ "url": "http://localhost:4567" }"#);
    let env = Environment::from_pairs([
        ("isCluster", "true"),
        ("isPrimary", "false"),
        ("jobsDisabled", "0"),
    ]);

    let store = load_config(&path, &env, &Paths::new(dir.path())).unwrap();
    let resolved = ResolvedConfig::from_store(&store);

    assert!(resolved.is_cluster);
    assert!(!resolved.is_primary);
    assert!(!resolved.jobs_disabled);
    assert!(!resolved.run_jobs);
    let url = resolved.url.expect("url settings");
    assert_eq!(url.port, "4567");
    assert!(url.use_port);
}

#[test]
fn test_toml_config() {
    let (dir, path) = install_with_config(
        "config.toml",
        r#"
url = "http://forum.example.org"
sessionKey = "forum.sid"
cookieDomain = "example.org"
"#,
    );

    let store = load_config(&path, &Environment::default(), &Paths::new(dir.path())).unwrap();
    let resolved = ResolvedConfig::from_store(&store);
    let url = resolved.url.expect("url settings");

    assert_eq!(resolved.session_key, "forum.sid");
    assert_eq!(url.port, DEFAULT_PORT.to_string());
    assert_eq!(url.socket_io_origins, "http://example.org:*");
}

#[test]
fn test_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");

    let store = load_config(&path, &Environment::default(), &Paths::new(dir.path())).unwrap();
    let resolved = ResolvedConfig::from_store(&store);

    assert_eq!(resolved.url, None);
    assert_eq!(resolved.session_key, "express.sid");
    assert!(resolved.run_jobs);
    assert!(!store.contains("port"));
}

#[test]
fn test_malformed_file_is_reported() {
    let (dir, path) = install_with_config("config.json", "{ \"url\": ");

    let result = load_config(&path, &Environment::default(), &Paths::new(dir.path()));

    match result {
        Err(ConfigError::File { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected a file error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_file_without_extension_is_json() {
    let (dir, path) = install_with_config("forumrc", r#"{ "url": "https://a.example" }"#);

    let store = load_config(Path::new(&path), &Environment::default(), &Paths::new(dir.path()))
        .unwrap();

    assert_eq!(store.get_str("base_url"), Some("https://a.example"));
}
