//! `PreferenceStore` implementations.

use comparator_core::error::Result;
use comparator_core::preference::PreferenceStore;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::RwLock;

use crate::paths::ComparatorPaths;
use crate::storage::AtomicTomlFile;

/// On-disk layout of `preferences.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct PreferenceFile {
    #[serde(default)]
    values: BTreeMap<String, String>,
}

/// Preferences persisted in a TOML file.
pub struct TomlPreferenceStore {
    file: AtomicTomlFile<PreferenceFile>,
}

impl TomlPreferenceStore {
    /// Store backed by the platform preferences file.
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(ComparatorPaths::new().preferences_file()?))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            file: AtomicTomlFile::new(path),
        }
    }
}

impl PreferenceStore for TomlPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let file = self.file.load()?;
        Ok(file.and_then(|f| f.values.get(key).cloned()))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.file.update(|f| {
            f.values.insert(key.to_string(), value.to_string());
        })?;
        Ok(())
    }
}

/// Non-persistent store for embedders without a writable profile.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.read().unwrap_or_else(|e| e.into_inner());
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
