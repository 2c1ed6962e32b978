//! Crash-safe TOML files.
//!
//! Writes go to a hidden sibling temp file, are fsynced and then renamed over
//! the target. Read-modify-write cycles hold an exclusive `fs2` lock on a
//! sibling lock file so two panels saving preferences at once do not lose
//! each other's keys.

use comparator_core::error::ComparatorError;
use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Errors raised by `AtomicTomlFile`.
#[derive(Debug)]
pub enum TomlFileError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Serialize(toml::ser::Error),
    Lock(String),
    /// The path has no parent directory or no file name.
    InvalidPath(PathBuf),
}

impl std::fmt::Display for TomlFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TomlFileError::Io(e) => write!(f, "I/O error: {}", e),
            TomlFileError::Parse(e) => write!(f, "TOML parse error: {}", e),
            TomlFileError::Serialize(e) => write!(f, "TOML serialization error: {}", e),
            TomlFileError::Lock(e) => write!(f, "Lock error: {}", e),
            TomlFileError::InvalidPath(p) => write!(f, "Invalid file path: {}", p.display()),
        }
    }
}

impl std::error::Error for TomlFileError {}

impl From<std::io::Error> for TomlFileError {
    fn from(e: std::io::Error) -> Self {
        TomlFileError::Io(e)
    }
}

impl From<toml::de::Error> for TomlFileError {
    fn from(e: toml::de::Error) -> Self {
        TomlFileError::Parse(e)
    }
}

impl From<toml::ser::Error> for TomlFileError {
    fn from(e: toml::ser::Error) -> Self {
        TomlFileError::Serialize(e)
    }
}

impl From<TomlFileError> for ComparatorError {
    fn from(e: TomlFileError) -> Self {
        ComparatorError::persistence(e.to_string())
    }
}

/// Typed handle to a TOML file on disk.
#[derive(Debug, Clone)]
pub struct AtomicTomlFile<T> {
    path: PathBuf,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> AtomicTomlFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _phantom: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when the file is missing or blank.
    pub fn load(&self) -> Result<Option<T>, TomlFileError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(toml::from_str(&content)?))
    }

    /// Replaces the file contents atomically.
    pub fn save(&self, data: &T) -> Result<(), TomlFileError> {
        let parent = self.parent()?;
        fs::create_dir_all(parent)?;

        let body = toml::to_string_pretty(data)?;
        let tmp_path = self.sibling(".tmp")?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(body.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// Locked read-modify-write. A missing file starts from `T::default()`.
    pub fn update<R, F>(&self, f: F) -> Result<R, TomlFileError>
    where
        T: Default,
        F: FnOnce(&mut T) -> R,
    {
        let _lock = FileLock::acquire(&self.sibling(".lock")?)?;
        let mut data = self.load()?.unwrap_or_default();
        let result = f(&mut data);
        self.save(&data)?;
        Ok(result)
    }

    fn parent(&self) -> Result<&Path, TomlFileError> {
        self.path
            .parent()
            .ok_or_else(|| TomlFileError::InvalidPath(self.path.clone()))
    }

    /// Hidden sibling such as `.preferences.toml.tmp`.
    fn sibling(&self, suffix: &str) -> Result<PathBuf, TomlFileError> {
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| TomlFileError::InvalidPath(self.path.clone()))?;
        Ok(self
            .parent()?
            .join(format!(".{}{}", file_name.to_string_lossy(), suffix)))
    }
}

/// Exclusive advisory lock, released (and its file removed) on drop.
struct FileLock {
    // The lock is held for as long as this handle stays open.
    _file: File,
    path: PathBuf,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self, TomlFileError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        use fs2::FileExt;
        file.lock_exclusive()
            .map_err(|e| TomlFileError::Lock(format!("{}: {}", path.display(), e)))?;

        Ok(FileLock {
            _file: file,
            path: path.to_path_buf(),
        })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}
