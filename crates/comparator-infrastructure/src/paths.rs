//! Platform paths for comparator files.
//!
//! ```text
//! ~/.config/booru-comparator/     # dirs::config_dir() on Linux
//! ├── config.toml                 # ComparatorConfig
//! └── preferences.toml            # Persisted UI preferences (last mode)
//! ```

use std::path::PathBuf;

const APP_DIR: &str = "booru-comparator";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// The platform has no per-user configuration directory.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find the user configuration directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for comparator_core::ComparatorError {
    fn from(e: PathError) -> Self {
        comparator_core::ComparatorError::config(e.to_string())
    }
}

/// Resolves where the comparator keeps its files.
///
/// `with_root` pins every path under a fixed directory, which tests use
/// together with `tempfile::TempDir`.
#[derive(Debug, Clone, Default)]
pub struct ComparatorPaths {
    root: Option<PathBuf>,
}

impl ComparatorPaths {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.root {
            Some(root) => Ok(root.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(PathError::ConfigDirNotFound),
        }
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    pub fn preferences_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("preferences.toml"))
    }
}
