//! Concrete collaborators for the comparator: HTTP backends, site adapters,
//! file-backed preferences and configuration.

pub mod adapter;
pub mod asset_probe;
pub mod backend;
pub mod config_service;
pub mod http;
pub mod paths;
pub mod preference_store;
pub mod storage;

pub use adapter::{DanbooruAdapter, MoebooruAdapter, SiteRegistry};
pub use asset_probe::HttpAssetProbe;
pub use config_service::ConfigService;
pub use paths::ComparatorPaths;
pub use preference_store::{MemoryPreferenceStore, TomlPreferenceStore};
