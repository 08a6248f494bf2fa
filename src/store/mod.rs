//! Layered configuration store
//!
//! Holds the environment, file and defaults layers and answers reads from the
//! highest-precedence layer that has the key. Writes go to every writable
//! layer, so an explicit `set` always wins over what that layer held before.

pub mod env;
pub mod layer;
pub mod value;

pub use env::Environment;
pub use layer::{Layer, SourceKind};
pub use value::{ConfigValue, Table};

use config::{File, FileFormat, Source};
use log::debug;
use std::ops::{Deref, DerefMut};
use std::path::Path;

use crate::error::ConfigError;

#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    // Highest read precedence first.
    layers: Vec<Layer>,
}

impl ConfigStore {
    /// Store with only the environment layer registered.
    pub fn new(env: &Environment) -> Self {
        let mut store = Self::default();
        store.insert_layer(env.to_layer());
        store
    }

    /// Register `path` as the file layer. A missing file yields an empty
    /// layer; a file that exists but cannot be parsed is an error.
    pub fn load_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let source = match path.extension() {
            Some(_) => File::from(path),
            None => File::new(&path.to_string_lossy(), FileFormat::Json),
        }
        .required(false);

        let collected = source.collect().map_err(|source| ConfigError::File {
            path: path.to_path_buf(),
            source,
        })?;

        let mut values = Table::new();
        for (key, value) in collected {
            let value = value
                .try_deserialize::<ConfigValue>()
                .map_err(|source| ConfigError::File {
                    path: path.to_path_buf(),
                    source,
                })?;
            values.insert(key, value);
        }

        debug!(
            "Loaded {} top-level keys from {}",
            values.len(),
            path.display()
        );
        self.load_table(values);
        Ok(())
    }

    /// Register an in-memory table as the file layer.
    pub fn load_table(&mut self, values: Table) {
        self.insert_layer(Layer::new(SourceKind::File, values, false));
    }

    /// Register the read-only defaults layer, replacing any previous one.
    pub fn defaults(&mut self, values: Table) {
        self.insert_layer(Layer::new(SourceKind::Defaults, values, true));
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.layers.iter().find_map(|layer| layer.get(key))
    }

    /// String value of `key`, or `None` when absent or not a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ConfigValue::as_str)
    }

    /// Loose truthiness of `key`; absent keys are falsy.
    pub fn is_truthy(&self, key: &str) -> bool {
        self.get(key).is_some_and(ConfigValue::is_truthy)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Write `value` into every writable layer.
    pub fn set(&mut self, key: &str, value: impl Into<ConfigValue>) {
        let value = value.into();
        for layer in self.layers.iter_mut().filter(|l| !l.is_read_only()) {
            layer.set(key, value.clone());
        }
    }

    pub fn layer(&self, kind: SourceKind) -> Option<&Layer> {
        self.layers.iter().find(|l| l.kind() == kind)
    }

    /// Run `f` with the `kind` layer writable. The previous permission is
    /// restored on every exit path, unwinding included.
    pub fn with_writable_source<R>(
        &mut self,
        kind: SourceKind,
        f: impl FnOnce(&mut ConfigStore) -> R,
    ) -> R {
        let mut guard = WritableSource::acquire(self, kind);
        f(&mut *guard)
    }

    fn insert_layer(&mut self, layer: Layer) {
        self.layers.retain(|l| l.kind() != layer.kind());
        let position = self
            .layers
            .iter()
            .position(|l| l.kind() < layer.kind())
            .unwrap_or(self.layers.len());
        self.layers.insert(position, layer);
    }

    fn set_read_only(&mut self, kind: SourceKind, read_only: bool) -> Option<bool> {
        let layer = self.layers.iter_mut().find(|l| l.kind() == kind)?;
        let previous = layer.is_read_only();
        layer.set_read_only(read_only);
        Some(previous)
    }
}

/// Scoped unlock of one layer.
struct WritableSource<'a> {
    store: &'a mut ConfigStore,
    kind: SourceKind,
    previous: Option<bool>,
}

impl<'a> WritableSource<'a> {
    fn acquire(store: &'a mut ConfigStore, kind: SourceKind) -> Self {
        let previous = store.set_read_only(kind, false);
        Self {
            store,
            kind,
            previous,
        }
    }
}

impl Deref for WritableSource<'_> {
    type Target = ConfigStore;

    fn deref(&self) -> &ConfigStore {
        self.store
    }
}

impl DerefMut for WritableSource<'_> {
    fn deref_mut(&mut self) -> &mut ConfigStore {
        self.store
    }
}

impl Drop for WritableSource<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous {
            self.store.set_read_only(self.kind, previous);
        }
    }
}
