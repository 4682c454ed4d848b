//! Error types for the edges of the tour engine.
//!
//! The tour controller itself never fails: missing steps are no-ops and
//! unreadable state is treated as absent. These errors only surface from the
//! durable stores and from loading page descriptions.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the file-backed state stores
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to read state file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write state file '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("state file '{path}' is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors raised while loading a page description
#[derive(Error, Debug)]
pub enum PageError {
    #[error("failed to read page file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid page description: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("element '{0}' is declared more than once")]
    DuplicateElement(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_names_the_file() {
        let err = StoreError::Read {
            path: PathBuf::from("/tmp/cookies.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/cookies.json"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_page_error_duplicate_element_message() {
        let err = PageError::DuplicateElement("#sidebar".to_string());
        assert_eq!(
            err.to_string(),
            "element '#sidebar' is declared more than once"
        );
    }
}
