//! Application configuration.
//!
//! Stored as TOML at `<config dir>/config.toml` (XDG on Linux). Every key is
//! optional:
//!
//! ```toml
//! catalog_url = "https://dummyjson.com/products"
//! products_field = "products"
//! request_timeout_secs = 30
//! title_boost = 2.0
//! description_boost = 1.0
//! log_dir = "/var/log/product-finder"
//! ```
//!
//! Command-line flags and `PRODUCT_FINDER_*` environment variables take
//! precedence over the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{DEFAULT_CATALOG_URL, DEFAULT_PRODUCTS_FIELD};
use crate::finder::LoadSettings;
use crate::search::tantivy::FieldBoosts;

/// Errors that can occur when loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Catalog location: an http(s) URL, a `file://` URL, or a plain path.
    pub catalog_url: String,

    /// Name of the top-level JSON field holding the product array.
    pub products_field: String,

    /// Request timeout for HTTP catalogs. Unset means wait indefinitely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,

    pub title_boost: f32,
    pub description_boost: f32,

    /// Where the TUI writes its log file. Defaults to the platform data dir.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            products_field: DEFAULT_PRODUCTS_FIELD.to_string(),
            request_timeout_secs: None,
            title_boost: 1.0,
            description_boost: 1.0,
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Load from `path`, or from the default location when `None`.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn config_path() -> Result<PathBuf, ConfigError> {
        project_dirs()
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or(ConfigError::NoConfigDir)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.catalog_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "catalog_url cannot be empty".into(),
            ));
        }
        if self.products_field.trim().is_empty() {
            return Err(ConfigError::Validation(
                "products_field cannot be empty".into(),
            ));
        }
        if self.request_timeout_secs == Some(0) {
            return Err(ConfigError::Validation(
                "request_timeout_secs must be positive".into(),
            ));
        }
        for (name, boost) in [
            ("title_boost", self.title_boost),
            ("description_boost", self.description_boost),
        ] {
            if !boost.is_finite() || boost <= 0.0 {
                return Err(ConfigError::Validation(format!(
                    "{name} must be a positive number"
                )));
            }
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn load_settings(&self) -> LoadSettings {
        LoadSettings {
            products_field: self.products_field.clone(),
            boosts: FieldBoosts {
                title: self.title_boost,
                description: self.description_boost,
            },
        }
    }

    pub fn log_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.log_dir {
            Some(dir) => Ok(dir.clone()),
            None => project_dirs()
                .map(|dirs| dirs.data_dir().join("logs"))
                .ok_or(ConfigError::NoConfigDir),
        }
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "product-finder", "product-finder")
}
