//! Cookie jar backend.
//!
//! Each key is one session cookie in a JSON jar file. Session cookies carry
//! no expiry; they live until the jar is cleared.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{read_json, write_json, StateStore};
use crate::error::StoreError;

/// File name of the jar inside the data directory
pub const COOKIE_JAR_FILE: &str = "cookies.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Cookie {
    name: String,
    value: String,
    set_at: DateTime<Utc>,
}

/// State store backed by a cookie jar file
#[derive(Debug, Clone)]
pub struct CookieStore {
    jar_path: PathBuf,
}

impl CookieStore {
    pub fn new(jar_path: impl Into<PathBuf>) -> Self {
        Self {
            jar_path: jar_path.into(),
        }
    }

    /// Jar at the standard file name inside `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(COOKIE_JAR_FILE))
    }

    pub fn jar_path(&self) -> &Path {
        &self.jar_path
    }

    fn load(&self) -> Result<Vec<Cookie>, StoreError> {
        read_json(&self.jar_path)
    }

    /// Read a cookie value
    pub fn cookie(&self, name: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .load()?
            .into_iter()
            .find(|c| c.name == name)
            .map(|c| c.value))
    }

    /// Set a cookie, or remove it when `value` is `None`
    pub fn set_cookie(&self, name: &str, value: Option<&str>) -> Result<(), StoreError> {
        let mut jar = self.load()?;
        jar.retain(|c| c.name != name);

        if let Some(value) = value {
            jar.push(Cookie {
                name: name.to_string(),
                value: value.to_string(),
                set_at: Utc::now(),
            });
        }

        write_json(&self.jar_path, &jar)
    }

    /// Names of all cookies in the jar
    pub fn names(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.load()?.into_iter().map(|c| c.name).collect())
    }
}

impl StateStore for CookieStore {
    fn kind(&self) -> &'static str {
        "cookie"
    }

    fn get(&self, key: &str) -> Option<String> {
        match self.cookie(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to read cookie");
                None
            }
        }
    }

    fn set(&self, key: &str, value: Option<&str>) {
        if let Err(e) = self.set_cookie(key, value) {
            tracing::warn!(key = %key, error = %e, "Failed to write cookie");
        }
    }
}
