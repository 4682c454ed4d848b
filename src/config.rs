use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::store::Persistence;
use crate::tour::DEFAULT_TOUR_NAME;

/// Settings loaded from config files and the environment.
///
/// Hooks cannot live in a file, so these settings only cover the
/// serializable part of a tour's `Configuration`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub tour: TourSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TourSettings {
    /// Namespace for persisted state keys
    #[serde(default = "default_tour_name")]
    pub name: String,
    #[serde(default)]
    pub persistence: Persistence,
    /// Arrow keys move between steps and Esc ends the tour
    #[serde(default = "default_keyboard")]
    pub keyboard: bool,
}

fn default_tour_name() -> String {
    DEFAULT_TOUR_NAME.to_string()
}

fn default_keyboard() -> bool {
    true
}

impl Default for TourSettings {
    fn default() -> Self {
        Self {
            name: default_tour_name(),
            persistence: Persistence::default(),
            keyboard: default_keyboard(),
        }
    }
}

/// Where durable state stores keep their files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Data directory (default: platform data dir + `/tourguide`)
    #[serde(default)]
    pub data_dir: Option<String>,
    /// Origin scoping the local storage backend
    #[serde(default = "default_origin")]
    pub origin: String,
}

fn default_origin() -> String {
    "localhost".to_string()
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: None,
            origin: default_origin(),
        }
    }
}

impl StorageSettings {
    /// Absolute path to the data directory
    pub fn data_path(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) => {
                let path = PathBuf::from(dir);
                if path.is_absolute() {
                    path
                } else {
                    std::env::current_dir().unwrap_or_default().join(path)
                }
            }
            None => dirs::data_dir()
                .map(|d| d.join("tourguide"))
                .unwrap_or_else(|| PathBuf::from(".tourguide")),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to log to file while a tour owns the terminal
    #[serde(default = "default_log_to_file")]
    pub to_file: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_to_file() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            to_file: default_log_to_file(),
        }
    }
}

impl Settings {
    /// Path to the user-wide config file
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("tourguide").join("config.toml"))
    }

    /// Load settings from embedded defaults, the user config, an explicit
    /// file and `TOURGUIDE__*` environment variables, in that order.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let defaults = Settings::default();
        let defaults_json =
            serde_json::to_string(&defaults).context("Failed to serialize default settings")?;

        let mut builder = config::Config::builder().add_source(config::File::from_str(
            &defaults_json,
            config::FileFormat::Json,
        ));

        if let Some(user_config) = Self::user_config_path() {
            if user_config.exists() {
                builder = builder.add_source(config::File::from(user_config));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }

        // TOURGUIDE__TOUR__NAME=onboarding, TOURGUIDE__STORAGE__ORIGIN=...
        builder = builder.add_source(
            config::Environment::with_prefix("TOURGUIDE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder.build().context("Failed to load configuration")?;
        settings
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Write settings as TOML
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let toml_str =
            toml::to_string_pretty(self).context("Failed to serialize settings to TOML")?;
        std::fs::write(path, toml_str).context("Failed to write config file")?;

        Ok(())
    }

    /// Get absolute path to logs directory
    pub fn logs_path(&self) -> PathBuf {
        self.storage.data_path().join("logs")
    }
}
