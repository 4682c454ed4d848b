//! Origin-scoped local storage backend.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::{read_json, write_json, StateStore};
use crate::error::StoreError;

/// Directory holding one storage file per origin
const LOCAL_STORAGE_DIR: &str = "local_storage";

/// State store backed by a JSON key/value file for a single origin
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Storage file for `origin` inside `dir`
    pub fn in_dir(dir: &Path, origin: &str) -> Self {
        Self::new(
            dir.join(LOCAL_STORAGE_DIR)
                .join(format!("{}.json", origin_file_stem(origin))),
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        read_json(&self.path)
    }

    pub fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.remove(key))
    }

    pub fn set_item(&self, key: &str, value: Option<&str>) -> Result<(), StoreError> {
        let mut items = self.load()?;
        match value {
            Some(value) => {
                items.insert(key.to_string(), value.to_string());
            }
            None => {
                items.remove(key);
            }
        }
        write_json(&self.path, &items)
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.load()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

/// Turn an origin like `https://example.com:8080` into a safe file stem
fn origin_file_stem(origin: &str) -> String {
    let stem: String = origin
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        "default".to_string()
    } else {
        stem
    }
}

impl StateStore for LocalStore {
    fn kind(&self) -> &'static str {
        "local"
    }

    fn get(&self, key: &str) -> Option<String> {
        match self.get_item(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to read local storage");
                None
            }
        }
    }

    fn set(&self, key: &str, value: Option<&str>) {
        if let Err(e) = self.set_item(key, value) {
            tracing::warn!(key = %key, error = %e, "Failed to write local storage");
        }
    }
}
