//! File storage primitives.

mod atomic_toml;

pub use atomic_toml::{AtomicTomlFile, TomlFileError};
