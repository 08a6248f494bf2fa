//! Store layers
//!
//! A layer is one origin of configuration values with its own write
//! permission. Keys are colon paths (`socket.io:origins`) that descend into
//! nested tables.

use super::value::{ConfigValue, Table};

/// Origin of a layer, ordered from lowest to highest read precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourceKind {
    Defaults,
    File,
    Env,
}

/// Separator between nested key segments.
pub const KEY_SEPARATOR: char = ':';

#[derive(Debug, Clone)]
pub struct Layer {
    kind: SourceKind,
    values: Table,
    read_only: bool,
}

impl Layer {
    pub fn new(kind: SourceKind, values: Table, read_only: bool) -> Self {
        Self {
            kind,
            values,
            read_only,
        }
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Look up a colon path. Intermediate segments must be tables.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        let mut segments = key.split(KEY_SEPARATOR);
        let first = segments.next()?;
        let mut current = self.values.get(first)?;
        for segment in segments {
            current = current.as_table()?.get(segment)?;
        }
        Some(current)
    }

    /// Write a colon path, replacing any non-table value found on the way.
    pub fn set(&mut self, key: &str, value: ConfigValue) {
        let segments: Vec<&str> = key.split(KEY_SEPARATOR).collect();
        let (last, parents) = match segments.split_last() {
            Some(split) => split,
            None => return,
        };

        let mut table = &mut self.values;
        for segment in parents {
            let entry = table
                .entry((*segment).to_string())
                .or_insert_with(|| ConfigValue::Table(Table::new()));
            if entry.as_table().is_none() {
                *entry = ConfigValue::Table(Table::new());
            }
            table = match entry.as_table_mut() {
                Some(next) => next,
                None => return,
            };
        }
        table.insert((*last).to_string(), value);
    }
}
