//! # Store Configuration
//!
//! Runtime knobs for the store, the refresh timer and the search debouncer.
//!
//! Values are resolved in this order (later sources override earlier ones):
//! 1. **Built-in defaults** - [`StoreConfig::default`]
//! 2. **TOML file** - [`StoreConfig::load`] or [`StoreConfig::from_toml_str`]
//! 3. **Environment** - `PRODUCT_STORE_REFRESH_SECS`, `PRODUCT_STORE_DEBOUNCE_MS`
//!
//! ```toml
//! refresh_interval_secs = 60
//! search_debounce_ms = 300
//! channel_buffer = 32
//! searchable_fields = ["title", "brand"]
//! ```

use crate::model::SearchField;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const REFRESH_SECS_VAR: &str = "PRODUCT_STORE_REFRESH_SECS";
pub const DEBOUNCE_MS_VAR: &str = "PRODUCT_STORE_DEBOUNCE_MS";

/// Errors raised while loading or validating a [`StoreConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Seconds between automatic reloads.
    pub refresh_interval_secs: u64,
    /// Quiet period before a typed query is searched.
    pub search_debounce_ms: u64,
    /// Capacity of the store's request channel.
    pub channel_buffer: usize,
    /// Fields the local filtered view matches on.
    pub searchable_fields: Vec<SearchField>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 60,
            search_debounce_ms: 300,
            channel_buffer: 32,
            searchable_fields: vec![SearchField::Title],
        }
    }
}

impl StoreConfig {
    /// Parses and validates a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: StoreConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a TOML file, applies environment overrides and validates the result.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: StoreConfig = toml::from_str(&content)?;
        config.with_env_overrides()
    }

    /// Applies `PRODUCT_STORE_*` environment variables on top of `self`.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(value) = lookup(REFRESH_SECS_VAR) {
            self.refresh_interval_secs = parse_var(REFRESH_SECS_VAR, &value)?;
        }
        if let Some(value) = lookup(DEBOUNCE_MS_VAR) {
            self.search_debounce_ms = parse_var(DEBOUNCE_MS_VAR, &value)?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.refresh_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "refresh_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.search_debounce_ms == 0 {
            return Err(ConfigError::Invalid(
                "search_debounce_ms must be greater than zero".to_string(),
            ));
        }
        if self.channel_buffer == 0 {
            return Err(ConfigError::Invalid(
                "channel_buffer must be greater than zero".to_string(),
            ));
        }
        if self.searchable_fields.is_empty() {
            return Err(ConfigError::Invalid(
                "searchable_fields must name at least one field".to_string(),
            ));
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

fn parse_var(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        })
}
