//! Persisted tour state.
//!
//! A tour reads and writes its state (`current_step`, `end`, and anything a
//! caller stores) through the [`StateStore`] trait. Three backends exist,
//! selected once through [`Persistence`] when the tour is built:
//! - [`CookieStore`]: a cookie jar file, one session cookie per key
//! - [`LocalStore`]: an origin-scoped key/value file
//! - [`MemoryStore`]: a process-wide map, gone when the process exits
//!
//! All three share the same contract: `get` returns `None` for absent keys
//! and `set(key, None)` removes the key. I/O failures are logged and never
//! reach the tour.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::StorageSettings;
use crate::error::StoreError;

mod cookie;
mod local;
mod memory;

pub use cookie::{CookieStore, COOKIE_JAR_FILE};
pub use local::LocalStore;
pub use memory::MemoryStore;

/// Key/value storage for tour state.
///
/// Keys arrive already namespaced (`<tour>_<key>`).
pub trait StateStore: Send + Sync {
    /// Short backend label used in log fields
    fn kind(&self) -> &'static str;

    /// Read a value, `None` if absent
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value; `None` removes the key
    fn set(&self, key: &str, value: Option<&str>);
}

/// Which backend a tour persists its state in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Persistence {
    #[default]
    Cookie,
    LocalStorage,
    Memory,
}

impl Persistence {
    pub fn all() -> &'static [Persistence] {
        &[
            Persistence::Cookie,
            Persistence::LocalStorage,
            Persistence::Memory,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Persistence::Cookie => "Cookie",
            Persistence::LocalStorage => "LocalStorage",
            Persistence::Memory => "Memory",
        }
    }

    /// Whether state outlives the current process
    pub fn is_durable(&self) -> bool {
        !matches!(self, Persistence::Memory)
    }
}

impl fmt::Display for Persistence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Persistence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Persistence::all()
            .iter()
            .copied()
            .find(|p| p.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!("unknown persistence '{s}' (expected Cookie, LocalStorage or Memory)")
            })
    }
}

/// Open the backend for `persistence` at the locations in `storage`.
///
/// `tour_name` scopes the in-memory database; durable backends are shared by
/// every tour and rely on key namespacing instead.
pub fn open(
    persistence: Persistence,
    tour_name: &str,
    storage: &StorageSettings,
) -> Box<dyn StateStore> {
    let data_path = storage.data_path();
    tracing::debug!(
        tour = %tour_name,
        persistence = %persistence,
        data_path = %data_path.display(),
        "Opening state store"
    );

    match persistence {
        Persistence::Cookie => Box::new(CookieStore::in_dir(&data_path)),
        Persistence::LocalStorage => Box::new(LocalStore::in_dir(&data_path, &storage.origin)),
        Persistence::Memory => Box::new(MemoryStore::new(tour_name)),
    }
}

/// Read a JSON document, falling back to the default when the file is missing
fn read_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T, StoreError> {
    if !path.exists() {
        return Ok(T::default());
    }

    let contents = fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if contents.trim().is_empty() {
        return Ok(T::default());
    }

    serde_json::from_str(&contents).map_err(|source| StoreError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a JSON document, creating parent directories as needed
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StoreError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let contents = serde_json::to_string_pretty(value)?;
    fs::write(path, contents).map_err(|source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage_in(temp_dir: &TempDir) -> StorageSettings {
        StorageSettings {
            data_dir: Some(temp_dir.path().to_string_lossy().to_string()),
            ..StorageSettings::default()
        }
    }

    #[test]
    fn test_persistence_default_is_cookie() {
        assert_eq!(Persistence::default(), Persistence::Cookie);
    }

    #[test]
    fn test_persistence_parses_labels_case_insensitively() {
        assert_eq!("Cookie".parse::<Persistence>(), Ok(Persistence::Cookie));
        assert_eq!(
            "localstorage".parse::<Persistence>(),
            Ok(Persistence::LocalStorage)
        );
        assert_eq!("MEMORY".parse::<Persistence>(), Ok(Persistence::Memory));
        assert!("redis".parse::<Persistence>().is_err());
    }

    #[test]
    fn test_persistence_durability() {
        assert!(Persistence::Cookie.is_durable());
        assert!(Persistence::LocalStorage.is_durable());
        assert!(!Persistence::Memory.is_durable());
    }

    #[test]
    fn test_open_selects_backend() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage_in(&temp_dir);

        assert_eq!(open(Persistence::Cookie, "t", &storage).kind(), "cookie");
        assert_eq!(
            open(Persistence::LocalStorage, "t", &storage).kind(),
            "local"
        );
        assert_eq!(open(Persistence::Memory, "t", &storage).kind(), "memory");
    }

    #[test]
    fn test_every_backend_round_trips_and_misses() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage_in(&temp_dir);

        for persistence in Persistence::all() {
            let store = open(*persistence, "store_contract", &storage);
            store.set("store_contract_test", Some("yes"));
            assert_eq!(
                store.get("store_contract_test").as_deref(),
                Some("yes"),
                "{persistence} should return what was set"
            );
            assert_eq!(
                store.get("store_contract__heyhey_"),
                None,
                "{persistence} should miss unknown keys"
            );

            store.set("store_contract_test", None);
            assert_eq!(store.get("store_contract_test"), None);
        }
    }

    #[test]
    fn test_read_json_missing_file_is_default() {
        let temp_dir = TempDir::new().unwrap();
        let map: std::collections::BTreeMap<String, String> =
            read_json(&temp_dir.path().join("absent.json")).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_read_json_reports_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();

        let result: Result<std::collections::BTreeMap<String, String>, _> = read_json(&path);
        assert!(matches!(result, Err(StoreError::Corrupt { .. })));
    }
}
