//! Environment snapshot
//!
//! Captures environment variables once so resolution never reads process
//! state directly.

use std::collections::BTreeMap;

use super::layer::KEY_SEPARATOR;
use super::value::Table;
use super::{ConfigValue, Layer, SourceKind};

/// Separator inside a variable name that marks a nested key.
pub const ENV_NESTING_SEPARATOR: &str = "__";

#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    /// Snapshot of the current process environment. Non-unicode variables
    /// are skipped.
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect(),
        }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// True when `NODE_ENV` selects the production runtime mode.
    pub fn is_production(&self) -> bool {
        self.get("NODE_ENV") == Some("production")
    }

    /// Build the read-only env layer. Every value stays a string; names
    /// containing `__` become nested keys.
    pub fn to_layer(&self) -> Layer {
        let mut layer = Layer::new(SourceKind::Env, Table::new(), true);
        for (name, value) in &self.vars {
            if name.is_empty() {
                continue;
            }
            let key = name.replace(ENV_NESTING_SEPARATOR, &KEY_SEPARATOR.to_string());
            layer.set(&key, ConfigValue::from(value.as_str()));
        }
        layer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_keeps_strings_and_nests() {
        let env = Environment::from_pairs([
            ("PORT", "8080"),
            ("isCluster", "true"),
            ("socket.io__origins", "https://b.example:*"),
        ]);
        let layer = env.to_layer();

        assert!(layer.is_read_only());
        assert_eq!(layer.get("PORT"), Some(&ConfigValue::from("8080")));
        assert_eq!(layer.get("isCluster"), Some(&ConfigValue::from("true")));
        assert_eq!(
            layer.get("socket.io:origins"),
            Some(&ConfigValue::from("https://b.example:*"))
        );
    }

    #[test]
    fn test_production_mode() {
        assert!(Environment::from_pairs([("NODE_ENV", "production")]).is_production());
        assert!(!Environment::from_pairs([("NODE_ENV", "development")]).is_production());
        assert!(!Environment::default().is_production());
    }
}
