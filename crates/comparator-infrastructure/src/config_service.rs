//! Configuration service.
//!
//! Loads `ComparatorConfig` from `config.toml` lazily and caches it.

use comparator_core::config::ComparatorConfig;
use comparator_core::error::Result;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::paths::ComparatorPaths;
use crate::storage::AtomicTomlFile;

/// Loads and caches the comparator configuration.
///
/// A missing file is created with defaults. An unreadable or malformed file
/// is logged and replaced by defaults in memory only, so a typo never
/// prevents the comparator from opening.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    config: Arc<RwLock<Option<ComparatorConfig>>>,
}

impl ConfigService {
    /// Service for the platform config file.
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(ComparatorPaths::new().config_file()?))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the configuration, loading it on first access.
    pub fn get_config(&self) -> ComparatorConfig {
        {
            let cached = self.config.read().unwrap_or_else(|e| e.into_inner());
            if let Some(config) = cached.as_ref() {
                return config.clone();
            }
        }

        let loaded = self.load();
        let mut cache = self.config.write().unwrap_or_else(|e| e.into_inner());
        *cache = Some(loaded.clone());
        loaded
    }

    /// Forces a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut cache = self.config.write().unwrap_or_else(|e| e.into_inner());
        *cache = None;
    }

    fn load(&self) -> ComparatorConfig {
        let file = AtomicTomlFile::<ComparatorConfig>::new(&self.path);
        match file.load() {
            Ok(Some(config)) => {
                tracing::debug!("[ConfigService] Loaded {}", self.path.display());
                config
            }
            Ok(None) => {
                let config = ComparatorConfig::default();
                if let Err(e) = file.save(&config) {
                    tracing::warn!(
                        "[ConfigService] Failed to write default config to {}: {}",
                        self.path.display(),
                        e
                    );
                } else {
                    tracing::info!("[ConfigService] Wrote default config to {}", self.path.display());
                }
                config
            }
            Err(e) => {
                tracing::warn!(
                    "[ConfigService] Ignoring unreadable {}: {}",
                    self.path.display(),
                    e
                );
                ComparatorConfig::default()
            }
        }
    }
}
