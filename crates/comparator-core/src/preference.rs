//! Persisted user preferences.

use crate::error::Result;
use crate::mode::ComparisonMode;

/// Key under which the last chosen mode is stored.
pub const MODE_KEY: &str = "comparator.mode";

/// Best-effort key/value store.
///
/// Callers treat every failure as "no value" / "not saved".
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Reads the persisted mode, falling back to side-by-side.
pub fn load_mode(store: &dyn PreferenceStore) -> ComparisonMode {
    match store.get(MODE_KEY) {
        Ok(value) => ComparisonMode::from_persisted(value.as_deref()),
        Err(e) => {
            tracing::warn!("[PreferenceStore] Failed to read saved mode: {}", e);
            ComparisonMode::default()
        }
    }
}

/// Persists the mode; failures are logged and swallowed.
pub fn save_mode(store: &dyn PreferenceStore, mode: ComparisonMode) {
    if let Err(e) = store.set(MODE_KEY, &mode.to_string()) {
        tracing::warn!("[PreferenceStore] Failed to save mode: {}", e);
    }
}
