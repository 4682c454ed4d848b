//! Process-wide in-memory backend.
//!
//! Every tour name gets its own database in a global map. Databases are
//! created on first use and never torn down: a long-running process that
//! creates many uniquely named Memory tours keeps all of their state until
//! it exits.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use once_cell::sync::Lazy;

use super::StateStore;

type Database = HashMap<String, String>;

static DATABASES: Lazy<Mutex<HashMap<String, Database>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

fn databases() -> MutexGuard<'static, HashMap<String, Database>> {
    DATABASES.lock().unwrap_or_else(PoisonError::into_inner)
}

/// State store living in the process-wide map
#[derive(Debug, Clone)]
pub struct MemoryStore {
    db: String,
}

impl MemoryStore {
    pub fn new(tour_name: &str) -> Self {
        Self {
            db: format!("__db_{tour_name}__"),
        }
    }

    /// Name of the backing database
    pub fn db_name(&self) -> &str {
        &self.db
    }

    /// Copy of everything stored for this tour
    pub fn snapshot(&self) -> HashMap<String, String> {
        databases().get(&self.db).cloned().unwrap_or_default()
    }
}

impl StateStore for MemoryStore {
    fn kind(&self) -> &'static str {
        "memory"
    }

    fn get(&self, key: &str) -> Option<String> {
        databases()
            .get(&self.db)
            .and_then(|db| db.get(key))
            .cloned()
    }

    fn set(&self, key: &str, value: Option<&str>) {
        let mut databases = databases();
        let db = databases.entry(self.db.clone()).or_default();
        match value {
            Some(value) => {
                db.insert(key.to_string(), value.to_string());
            }
            None => {
                db.remove(key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_state_lands_in_tour_database() {
        let store = MemoryStore::new("memory_db_test");
        store.set("memory_db_test_test", Some("yes"));

        assert_eq!(store.db_name(), "__db_memory_db_test__");
        assert_eq!(
            store.snapshot().get("memory_db_test_test").map(String::as_str),
            Some("yes")
        );
    }

    #[test]
    fn test_handles_with_same_name_share_state() {
        let first = MemoryStore::new("memory_shared_test");
        let second = MemoryStore::new("memory_shared_test");

        first.set("memory_shared_test_current_step", Some("3"));
        assert_eq!(
            second.get("memory_shared_test_current_step").as_deref(),
            Some("3")
        );
    }

    #[test]
    fn test_tours_do_not_see_each_other() {
        let a = MemoryStore::new("memory_iso_a");
        let b = MemoryStore::new("memory_iso_b");

        a.set("key", Some("a"));
        assert_eq!(b.get("key"), None);
    }

    #[test]
    fn test_none_removes_key() {
        let store = MemoryStore::new("memory_remove_test");
        store.set("k", Some("v"));
        store.set("k", None);
        assert_eq!(store.get("k"), None);
    }
}
