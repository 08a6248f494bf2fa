//! Configuration values
//!
//! The closed set of value shapes a layer can hold, independent of the file
//! format or environment they were read from.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// Nested table of values, keyed by a single path segment.
pub type Table = BTreeMap<String, ConfigValue>;

/// A loosely-typed configuration value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<ConfigValue>),
    Table(Table),
}

impl ConfigValue {
    /// Loose truthiness: `false`, `0`, `NaN`, the empty string and null are
    /// falsy, everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            ConfigValue::Null => false,
            ConfigValue::Bool(b) => *b,
            ConfigValue::Int(n) => *n != 0,
            ConfigValue::Float(f) => *f != 0.0 && !f.is_nan(),
            ConfigValue::String(s) => !s.is_empty(),
            ConfigValue::Array(_) | ConfigValue::Table(_) => true,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            ConfigValue::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_table_mut(&mut self) -> Option<&mut Table> {
        match self {
            ConfigValue::Table(t) => Some(t),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Null => write!(f, "null"),
            ConfigValue::Bool(b) => write!(f, "{}", b),
            ConfigValue::Int(n) => write!(f, "{}", n),
            ConfigValue::Float(x) => write!(f, "{}", x),
            ConfigValue::String(s) => write!(f, "{}", s),
            ConfigValue::Array(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "{}", parts.join(","))
            }
            ConfigValue::Table(_) => write!(f, "[table]"),
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Int(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::String(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::String(value)
    }
}

impl From<Table> for ConfigValue {
    fn from(value: Table) -> Self {
        ConfigValue::Table(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!ConfigValue::Null.is_truthy());
        assert!(!ConfigValue::Bool(false).is_truthy());
        assert!(!ConfigValue::Int(0).is_truthy());
        assert!(!ConfigValue::Float(f64::NAN).is_truthy());
        assert!(!ConfigValue::from("").is_truthy());

        assert!(ConfigValue::from("0").is_truthy());
        assert!(ConfigValue::Int(4567).is_truthy());
        assert!(ConfigValue::Table(Table::new()).is_truthy());
    }

    #[test]
    fn test_display_matches_raw_value() {
        assert_eq!(ConfigValue::from("8080").to_string(), "8080");
        assert_eq!(ConfigValue::Int(3000).to_string(), "3000");
        assert_eq!(ConfigValue::Bool(true).to_string(), "true");
    }
}
