//! User preference store
//!
//! A plain key → string map with get/set, mirroring what the dashboard
//! persists between sessions: the selected website, log-table paging and
//! sort settings, and the theme flag. The file-backed store is the
//! production implementation; the in-memory store backs tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use anyhow::Context;
use tracing::warn;

/// Preference key for the last selected website id
pub const PREF_SELECTED_WEBSITE: &str = "selectedWebsite";

/// Preference key for the log browser page size
pub const PREF_LOGS_PAGE_SIZE: &str = "logsPageSize";

/// Preference key for the log browser sort field
pub const PREF_LOGS_SORT_FIELD: &str = "logsSortField";

/// Preference key for the log browser sort order
pub const PREF_LOGS_SORT_ORDER: &str = "logsSortOrder";

/// Preference key for the dark-mode flag
pub const PREF_DARK_MODE: &str = "darkMode";

pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str);

    /// Get a preference, falling back to `default` when absent
    fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }
}

/// JSON-file-backed preference store
///
/// The whole map is rewritten on every set. Write failures are logged and
/// the in-memory value is kept, so a read-only disk degrades to
/// session-only preferences rather than an error.
pub struct FilePreferenceStore {
    path: PathBuf,
    values: RwLock<HashMap<String, String>>,
}

impl FilePreferenceStore {
    /// Open the store, loading any existing preference file.
    ///
    /// A missing file is a fresh store; an unparsable file is discarded
    /// with a warning since every preference has a sane default.
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();

        let values = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<HashMap<String, String>>(&contents) {
                Ok(map) => map,
                Err(e) => {
                    warn!("Discarding unparsable preference file {}: {}", path.display(), e);
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read preference file {}", path.display()))
            }
        };

        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    fn persist(&self, values: &HashMap<String, String>) {
        let json = match serde_json::to_string_pretty(values) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize preferences: {}", e);
                return;
            }
        };

        if let Err(e) = std::fs::write(&self.path, json) {
            warn!("Failed to write preference file {}: {}", self.path.display(), e);
        }
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .ok()
            .and_then(|values| values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) {
        let Ok(mut values) = self.values.write() else {
            warn!("Preference store lock poisoned, dropping set of '{}'", key);
            return;
        };
        values.insert(key.to_string(), value.to_string());
        self.persist(&values);
    }
}

/// In-memory preference store for tests and ephemeral sessions
#[derive(Default)]
pub struct MemoryPreferenceStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .ok()
            .and_then(|values| values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut values) = self.values.write() {
            values.insert(key.to_string(), value.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryPreferenceStore::new();
        assert_eq!(store.get(PREF_SELECTED_WEBSITE), None);
        assert_eq!(store.get_or(PREF_LOGS_PAGE_SIZE, "100"), "100");

        store.set(PREF_SELECTED_WEBSITE, "site-a");
        assert_eq!(store.get(PREF_SELECTED_WEBSITE).as_deref(), Some("site-a"));
    }

    #[test]
    fn file_store_roundtrip() {
        let dir = std::env::temp_dir().join(format!("vantage-prefs-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("prefs.json");

        {
            let store = FilePreferenceStore::open(&path).unwrap();
            store.set(PREF_DARK_MODE, "true");
            store.set(PREF_LOGS_SORT_FIELD, "timestamp");
        }

        let reopened = FilePreferenceStore::open(&path).unwrap();
        assert_eq!(reopened.get(PREF_DARK_MODE).as_deref(), Some("true"));
        assert_eq!(reopened.get(PREF_LOGS_SORT_FIELD).as_deref(), Some("timestamp"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn unparsable_file_is_discarded() {
        let dir = std::env::temp_dir().join(format!("vantage-prefs-bad-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("prefs.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FilePreferenceStore::open(&path).unwrap();
        assert_eq!(store.get(PREF_DARK_MODE), None);

        std::fs::remove_dir_all(&dir).ok();
    }
}
